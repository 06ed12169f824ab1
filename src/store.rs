//! In-memory question store, the backend's only stateful collaborator.
//!
//! Records live in a map keyed by question ID behind an RwLock. Offers
//! fetch-by-id, filtered/sorted/paginated listing, upsert, create with
//! duplicate-ID rejection, publish toggling, and dashboard aggregates.
//! Nothing here deletes a record; archival is a flag, not a removal.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::domain::{DashboardStats, Question, QuestionFilter, QuestionType, SortKey};
use crate::targeting::{build_code_filter, CodeFilter};
use crate::util::contains_ci;

#[derive(Clone, Default)]
pub struct QuestionStore {
    by_id: Arc<RwLock<HashMap<String, Question>>>,
}

impl QuestionStore {
    /// Build a store pre-populated with seed records. Later duplicates of the
    /// same ID are skipped, first one wins.
    pub fn with_questions(questions: Vec<Question>) -> Self {
        let mut map = HashMap::new();
        for q in questions {
            if map.contains_key(&q.q_id) {
                warn!(target: "question", q_id = %q.q_id, "Duplicate seed question id; keeping the first");
                continue;
            }
            map.insert(q.q_id.clone(), q);
        }
        Self { by_id: Arc::new(RwLock::new(map)) }
    }

    /// Read-only access to a question by id.
    #[instrument(level = "debug", skip(self), fields(%q_id))]
    pub async fn get(&self, q_id: &str) -> Option<Question> {
        let by_id = self.by_id.read().await;
        by_id.get(q_id).cloned()
    }

    /// Insert a brand-new question, rejecting an already-used ID. The ID
    /// allocator only hands out suggestions; a raced suggestion fails here
    /// instead of silently overwriting the other author's record.
    #[instrument(level = "debug", skip(self, q), fields(q_id = %q.q_id))]
    pub async fn insert_new(&self, q: Question) -> Result<(), String> {
        let mut by_id = self.by_id.write().await;
        if by_id.contains_key(&q.q_id) {
            return Err(format!("question id already in use: {}", q.q_id));
        }
        by_id.insert(q.q_id.clone(), q);
        Ok(())
    }

    /// Upsert by ID, last write wins. The incoming code list replaces the
    /// stored one wholesale; `created_at` and `element_id` of an existing
    /// record are preserved.
    #[instrument(level = "debug", skip(self, q), fields(q_id = %q.q_id))]
    pub async fn upsert(&self, mut q: Question) {
        let mut by_id = self.by_id.write().await;
        if let Some(existing) = by_id.get(&q.q_id) {
            q.created_at = existing.created_at;
            q.element_id = existing.element_id.clone();
        }
        by_id.insert(q.q_id.clone(), q);
    }

    /// Flip the publish/draft flag. Returns the new value, or `None` for an
    /// unknown id.
    #[instrument(level = "info", skip(self), fields(%q_id))]
    pub async fn toggle_published(&self, q_id: &str) -> Option<bool> {
        let mut by_id = self.by_id.write().await;
        let q = by_id.get_mut(q_id)?;
        q.is_published = !q.is_published;
        q.updated_at = Utc::now();
        Some(q.is_published)
    }

    /// Greatest stored ID with the given prefix, feeding the ID allocator.
    /// Lexicographic max is numeric max while sequences stay zero-padded.
    pub async fn latest_id_with_prefix(&self, prefix: &str) -> Option<String> {
        let by_id = self.by_id.read().await;
        by_id.keys().filter(|id| id.starts_with(prefix)).max().cloned()
    }

    /// Filtered, sorted, paginated listing. Returns the page plus the total
    /// match count before pagination.
    ///
    /// An impossible code-filter combination short-circuits to an empty page,
    /// never to an unfiltered query.
    #[instrument(level = "debug", skip(self, filter))]
    pub async fn query(&self, filter: &QuestionFilter) -> (Vec<Question>, usize) {
        let code_set: Option<HashSet<String>> = match build_code_filter(&filter.codes) {
            CodeFilter::NotApplied => None,
            CodeFilter::Codes(codes) => Some(codes.into_iter().collect()),
            CodeFilter::Impossible => {
                info!(target: "question", "Impossible code filter combination; serving empty page");
                return (Vec::new(), 0);
            }
        };

        let by_id = self.by_id.read().await;
        let mut matches: Vec<&Question> = by_id
            .values()
            .filter(|q| match filter.qtype {
                Some(t) => q.details.question_type() == t,
                None => true,
            })
            .filter(|q| match &filter.search {
                Some(needle) => contains_ci(&q.content, needle) || contains_ci(&q.q_id, needle),
                None => true,
            })
            .filter(|q| match &code_set {
                Some(set) => q.code_names.iter().any(|c| set.contains(c)),
                None => true,
            })
            .collect();

        match filter.sort {
            SortKey::CreatedDesc => matches.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortKey::CreatedAsc => matches.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortKey::UpdatedDesc => matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
            SortKey::UpdatedAsc => matches.sort_by(|a, b| a.updated_at.cmp(&b.updated_at)),
            SortKey::QIdDesc => matches.sort_by(|a, b| b.q_id.cmp(&a.q_id)),
            SortKey::QIdAsc => matches.sort_by(|a, b| a.q_id.cmp(&b.q_id)),
        }

        let total = matches.len();
        let page = matches
            .into_iter()
            .skip(filter.skip)
            .take(filter.limit)
            .cloned()
            .collect();
        (page, total)
    }

    /// Most recently updated questions, for the dashboard side panel.
    pub async fn recent(&self, limit: usize) -> Vec<Question> {
        let by_id = self.by_id.read().await;
        let mut all: Vec<&Question> = by_id.values().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all.into_iter().take(limit).cloned().collect()
    }

    /// Dashboard aggregates: totals per type and creations in the last week.
    #[instrument(level = "debug", skip(self))]
    pub async fn stats(&self) -> DashboardStats {
        let week_ago = Utc::now() - Duration::days(7);
        let by_id = self.by_id.read().await;
        let mut stats = DashboardStats { total: by_id.len(), ..Default::default() };
        for q in by_id.values() {
            match q.details.question_type() {
                QuestionType::Balance => stats.balance += 1,
                QuestionType::Truth => stats.truth += 1,
                QuestionType::MiniGame => stats.mini_game += 1,
            }
            if q.created_at > week_ago {
                stats.new_this_week += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestionDetails;
    use crate::targeting::CodeCriteria;

    fn truth(q_id: &str, content: &str, codes: &[&str]) -> Question {
        let now = Utc::now();
        Question {
            q_id: q_id.to_string(),
            element_id: format!("el-{q_id}"),
            content: content.to_string(),
            code_names: codes.iter().map(|c| c.to_string()).collect(),
            created_at: now,
            updated_at: now,
            is_published: false,
            details: QuestionDetails::Truth { answers: String::new(), keyword: Vec::new() },
        }
    }

    fn list_filter(codes: CodeCriteria) -> QuestionFilter {
        QuestionFilter { limit: 50, codes, ..Default::default() }
    }

    #[tokio::test]
    async fn code_overlap_filter_matches_intersecting_lists() {
        let store = QuestionStore::with_questions(vec![
            truth("T25-00001", "sibling talk", &["F-F-Fa-Si-L1"]),
            truth("T25-00002", "lover talk", &["M-F-Lo-Sw-L3"]),
            truth("T25-00003", "legacy only", &["old-code"]),
        ]);

        let criteria = CodeCriteria { relation: Some("Fa".into()), ..Default::default() };
        let (page, total) = store.query(&list_filter(criteria)).await;
        assert_eq!(total, 1);
        assert_eq!(page[0].q_id, "T25-00001");
    }

    #[tokio::test]
    async fn impossible_criteria_serve_an_empty_page() {
        let store = QuestionStore::with_questions(vec![truth("T25-00001", "a", &["F-F-Fa-Si-L1"])]);
        let criteria = CodeCriteria {
            relation: Some("B".into()),
            sub: Some("Br".into()),
            ..Default::default()
        };
        let (page, total) = store.query(&list_filter(criteria)).await;
        assert!(page.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn search_matches_content_and_id_case_insensitively() {
        let store = QuestionStore::with_questions(vec![
            truth("T25-00001", "Morning routines", &[]),
            truth("T25-00002", "evening habits", &[]),
        ]);
        let filter = QuestionFilter {
            search: Some("MORNING".into()),
            limit: 50,
            ..Default::default()
        };
        let (page, total) = store.query(&filter).await;
        assert_eq!(total, 1);
        assert_eq!(page[0].q_id, "T25-00001");

        let by_id = QuestionFilter { search: Some("t25-0000".into()), limit: 50, ..Default::default() };
        let (_, total) = store.query(&by_id).await;
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn pagination_reports_the_total_before_slicing() {
        let seeds = (1..=7).map(|i| truth(&format!("T25-{i:05}"), "q", &[])).collect();
        let store = QuestionStore::with_questions(seeds);
        let filter = QuestionFilter { limit: 3, skip: 6, sort: SortKey::QIdAsc, ..Default::default() };
        let (page, total) = store.query(&filter).await;
        assert_eq!(total, 7);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].q_id, "T25-00007");
    }

    #[tokio::test]
    async fn insert_new_rejects_a_taken_id() {
        let store = QuestionStore::default();
        store.insert_new(truth("T25-00001", "first", &[])).await.expect("first insert");
        let err = store.insert_new(truth("T25-00001", "raced", &[])).await;
        assert!(err.is_err());

        // The original record is untouched.
        let kept = store.get("T25-00001").await.expect("kept");
        assert_eq!(kept.content, "first");
    }

    #[tokio::test]
    async fn upsert_preserves_creation_metadata() {
        let store = QuestionStore::default();
        let original = truth("T25-00001", "first", &[]);
        let created_at = original.created_at;
        let element_id = original.element_id.clone();
        store.insert_new(original).await.expect("insert");

        let mut edited = truth("T25-00001", "edited", &["M-F-Lo-Sw-L1"]);
        edited.element_id = "el-new".into();
        store.upsert(edited).await;

        let stored = store.get("T25-00001").await.expect("stored");
        assert_eq!(stored.content, "edited");
        assert_eq!(stored.created_at, created_at);
        assert_eq!(stored.element_id, element_id);
    }

    #[tokio::test]
    async fn latest_id_respects_the_prefix() {
        let store = QuestionStore::with_questions(vec![
            truth("T25-00002", "a", &[]),
            truth("T25-00010", "b", &[]),
            truth("B25-00042", "c", &[]),
        ]);
        assert_eq!(store.latest_id_with_prefix("T25-").await.as_deref(), Some("T25-00010"));
        assert_eq!(store.latest_id_with_prefix("M25-").await, None);
    }

    #[tokio::test]
    async fn toggle_flips_and_reports_the_flag() {
        let store = QuestionStore::with_questions(vec![truth("T25-00001", "a", &[])]);
        assert_eq!(store.toggle_published("T25-00001").await, Some(true));
        assert_eq!(store.toggle_published("T25-00001").await, Some(false));
        assert_eq!(store.toggle_published("missing").await, None);
    }
}
