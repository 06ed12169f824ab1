//! Application state: the question store plus startup seeding.
//!
//! This module owns:
//!   - the in-memory question store
//!   - loading the optional TOML bank and folding it into the store
//!
//! Seeding happens once, before the router is built; the taxonomy registry is
//! compiled-in and needs no loading step.

use tracing::{error, info, instrument};

use crate::config::load_bank_config_from_env;
use crate::domain::{Question, QuestionType};
use crate::store::QuestionStore;

#[derive(Clone)]
pub struct AppState {
    pub store: QuestionStore,
}

impl AppState {
    /// Build state from env: load the optional bank, seed the store, log the
    /// startup inventory.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let mut seeded: Vec<Question> = Vec::new();
        if let Some(cfg) = load_bank_config_from_env() {
            for qc in cfg.questions {
                match qc.into_question() {
                    Ok(q) => seeded.push(q),
                    Err(e) => {
                        error!(target: "question", error = %e, "Skipping bank entry");
                    }
                }
            }
        }

        // Inventory summary by type.
        let (mut truth, mut balance, mut mini_game) = (0usize, 0usize, 0usize);
        for q in &seeded {
            match q.details.question_type() {
                QuestionType::Truth => truth += 1,
                QuestionType::Balance => balance += 1,
                QuestionType::MiniGame => mini_game += 1,
            }
        }
        info!(target: "question", truth, balance, mini_game, "Startup question inventory");

        Self { store: QuestionStore::with_questions(seeded) }
    }
}
