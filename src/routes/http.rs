//! HTTP endpoint handlers. These are thin wrappers that forward to the store
//! and the targeting core; each handler is instrumented and logs basic result
//! info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  response::IntoResponse,
  Json,
};
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::Question;
use crate::ids;
use crate::protocol::*;
use crate::state::AppState;
use crate::targeting::{reconcile, regenerate, Reconciled};
use crate::taxonomy::{GENDER_PAIRS, INTIMACY_LEVELS, RELATIONS};
use crate::util::trunc_for_log;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info")]
pub async fn http_taxonomy() -> impl IntoResponse {
  Json(TaxonomyOut { gender_pairs: GENDER_PAIRS, relations: RELATIONS, levels: INTIMACY_LEVELS })
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_list_questions(
  State(state): State<Arc<AppState>>,
  Query(q): Query<QuestionListQuery>,
) -> impl IntoResponse {
  let filter = q.into_filter();
  let (questions, total) = state.store.query(&filter).await;
  info!(target: "question", total, page_len = questions.len(), "HTTP question list served");
  Json(QuestionListOut { questions, total })
}

#[instrument(level = "info", skip(state), fields(%q_id))]
pub async fn http_get_question(
  State(state): State<Arc<AppState>>,
  Path(q_id): Path<String>,
) -> impl IntoResponse {
  let question = state.store.get(&q_id).await;
  info!(target: "question", %q_id, found = question.is_some(), "HTTP question fetched");
  Json(question)
}

#[instrument(level = "info", skip(state, body), fields(q_id = %body.q_id, create = body.create))]
pub async fn http_save_question(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SaveQuestionIn>,
) -> impl IntoResponse {
  debug!(target: "question", content = %trunc_for_log(&body.content, 120), "Saving question");

  let code_names: Vec<String> = body
    .code_names
    .iter()
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
    .collect();

  let now = Utc::now();
  let q_id = body.q_id.clone();
  let question = Question {
    q_id: q_id.clone(),
    element_id: Uuid::new_v4().to_string(),
    content: body.content,
    code_names,
    created_at: now,
    updated_at: now,
    is_published: body.is_published,
    details: body.details,
  };

  if body.create {
    match state.store.insert_new(question).await {
      Ok(()) => {
        info!(target: "question", %q_id, "HTTP question created");
        Json(SaveQuestionOut { ok: true, q_id, message: None })
      }
      Err(e) => {
        info!(target: "question", %q_id, error = %e, "HTTP create rejected");
        Json(SaveQuestionOut { ok: false, q_id, message: Some(e) })
      }
    }
  } else {
    state.store.upsert(question).await;
    info!(target: "question", %q_id, "HTTP question saved");
    Json(SaveQuestionOut { ok: true, q_id, message: None })
  }
}

#[instrument(level = "info", skip(state), fields(%q_id))]
pub async fn http_toggle_published(
  State(state): State<Arc<AppState>>,
  Path(q_id): Path<String>,
) -> impl IntoResponse {
  match state.store.toggle_published(&q_id).await {
    Some(is_published) => {
      info!(target: "question", %q_id, is_published, "HTTP publish flag toggled");
      Json(PublishToggleOut { ok: true, q_id, is_published })
    }
    None => Json(PublishToggleOut { ok: false, q_id, is_published: false }),
  }
}

#[instrument(level = "info", skip(state), fields(qtype = ?q.qtype))]
pub async fn http_next_id(
  State(state): State<Arc<AppState>>,
  Query(q): Query<NextIdQuery>,
) -> impl IntoResponse {
  let year = ids::current_year2();
  let prefix = ids::id_prefix(q.qtype, year);
  let latest = state.store.latest_id_with_prefix(&prefix).await;
  let q_id = ids::next_question_id(q.qtype, year, latest.as_deref());
  info!(target: "question", %q_id, latest = latest.as_deref().unwrap_or("-"), "HTTP next id suggested");
  Json(NextIdOut { q_id })
}

#[instrument(level = "info", skip(state))]
pub async fn http_recent(
  State(state): State<Arc<AppState>>,
  Query(q): Query<RecentQuery>,
) -> impl IntoResponse {
  let questions = state.store.recent(q.limit.unwrap_or(5)).await;
  Json(questions)
}

#[instrument(level = "info", skip(state))]
pub async fn http_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let stats = state.store.stats().await;
  info!(target: "question", total = stats.total, "HTTP dashboard stats served");
  Json(stats)
}

/// Authoring-mode generation. The sub-relation pruning invariant is applied
/// to the incoming selection before expansion, so a selection whose relations
/// changed client-side can never smuggle in orphaned sub-relations.
#[instrument(level = "info", skip(body))]
pub async fn http_generate_codes(Json(body): Json<GenerateCodesIn>) -> impl IntoResponse {
  let mut selection = body.selection;
  selection.prune_stale_subs();
  let codes = regenerate(&Reconciled { selection, unmanaged: body.unmanaged });
  info!(target: "question", count = codes.len(), "HTTP codes generated");
  Json(GenerateCodesOut { codes })
}

#[instrument(level = "info", skip(body), fields(count = body.codes.len()))]
pub async fn http_reconcile_codes(Json(body): Json<ReconcileCodesIn>) -> impl IntoResponse {
  let reconciled = reconcile(&body.codes);
  info!(
    target: "question",
    managed = body.codes.len() - reconciled.unmanaged.len(),
    unmanaged = reconciled.unmanaged.len(),
    "HTTP codes reconciled"
  );
  Json(reconciled)
}
