//! Optional TOML seed bank: pre-populates the question store at startup.
//!
//! Pointed at by `BANK_CONFIG_PATH`. Any parsing/IO error is logged and the
//! bank is skipped; a bad file must never keep the server from starting.

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{Question, QuestionDetails, QuestionType};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct BankConfig {
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Question entry accepted in TOML configuration. Only the fields matching
/// the declared type are read; the rest are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub q_id: String,
  #[serde(rename = "type")]
  pub qtype: QuestionType,
  pub content: String,
  #[serde(default)]
  pub code_names: Vec<String>,
  #[serde(default)]
  pub is_published: bool,

  // truth
  #[serde(default)]
  pub answers: Option<String>,
  #[serde(default)]
  pub keyword: Option<Vec<String>>,
  // balance
  #[serde(default)]
  pub choice_a: Option<String>,
  #[serde(default)]
  pub choice_b: Option<String>,
  // mini-game
  #[serde(default)]
  pub game_code: Option<String>,
  #[serde(default)]
  pub difficulty: Option<u8>,
  #[serde(default)]
  pub config: Option<String>,
}

impl QuestionCfg {
  /// Build a full record from the config entry. Entries need non-empty
  /// content; everything else defaults.
  pub fn into_question(self) -> Result<Question, String> {
    if self.content.trim().is_empty() {
      return Err(format!("bank entry {}: missing content", self.q_id));
    }
    let details = match self.qtype {
      QuestionType::Truth => QuestionDetails::Truth {
        answers: self.answers.unwrap_or_default(),
        keyword: self.keyword.unwrap_or_default(),
      },
      QuestionType::Balance => QuestionDetails::Balance {
        choice_a: self.choice_a.unwrap_or_default(),
        choice_b: self.choice_b.unwrap_or_default(),
      },
      QuestionType::MiniGame => QuestionDetails::MiniGame {
        game_code: self.game_code.unwrap_or_default(),
        difficulty: self.difficulty.unwrap_or(1),
        config: self.config.unwrap_or_default(),
      },
    };
    let now = Utc::now();
    Ok(Question {
      q_id: self.q_id,
      element_id: Uuid::new_v4().to_string(),
      content: self.content,
      code_names: self.code_names,
      created_at: now,
      updated_at: now,
      is_published: self.is_published,
      details,
    })
  }
}

/// Attempt to load `BankConfig` from BANK_CONFIG_PATH. On any parsing/IO
/// error, returns None.
pub fn load_bank_config_from_env() -> Option<BankConfig> {
  let path = std::env::var("BANK_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<BankConfig>(&s) {
      Ok(cfg) => {
        info!(target: "quizbank_backend", %path, entries = cfg.questions.len(), "Loaded question bank (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quizbank_backend", %path, error = %e, "Failed to parse TOML bank");
        None
      }
    },
    Err(e) => {
      error!(target: "quizbank_backend", %path, error = %e, "Failed to read TOML bank file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bank_entries_build_typed_records() {
    let cfg: BankConfig = toml::from_str(
      r#"
        [[questions]]
        q_id = "B25-00001"
        type = "B"
        content = "Mountains or beach?"
        code_names = ["M-F-Lo-Sw-L1"]
        choice_a = "Mountains"
        choice_b = "Beach"
      "#,
    )
    .expect("parse");
    let q = cfg.questions[0].clone().into_question().expect("build");
    assert_eq!(q.q_id, "B25-00001");
    match q.details {
      QuestionDetails::Balance { choice_a, choice_b } => {
        assert_eq!(choice_a, "Mountains");
        assert_eq!(choice_b, "Beach");
      }
      other => panic!("wrong variant: {other:?}"),
    }
  }

  #[test]
  fn entries_without_content_are_rejected() {
    let cfg: BankConfig = toml::from_str(
      r#"
        [[questions]]
        q_id = "T25-00001"
        type = "T"
        content = "  "
      "#,
    )
    .expect("parse");
    assert!(cfg.questions[0].clone().into_question().is_err());
  }
}
