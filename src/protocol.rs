//! Public request/response DTOs for the HTTP API (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Question, QuestionDetails, QuestionFilter, QuestionType, SortKey};
use crate::targeting::{CodeCriteria, Selection};
use crate::taxonomy::{GenderPairDef, RelationDef};

/// Page size when the list query does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Query params for the list endpoint; the four targeting criteria ride
/// alongside the standard list controls.
#[derive(Debug, Deserialize)]
pub struct QuestionListQuery {
    #[serde(rename = "type")]
    pub qtype: Option<QuestionType>,
    pub q: Option<String>,
    pub sort: Option<SortKey>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
    pub gender: Option<String>,
    pub relation: Option<String>,
    pub sub: Option<String>,
    pub level: Option<String>,
}

impl QuestionListQuery {
    pub fn into_filter(self) -> QuestionFilter {
        QuestionFilter {
            qtype: self.qtype,
            search: none_if_blank(self.q),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            skip: self.skip.unwrap_or(0),
            sort: self.sort.unwrap_or_default(),
            codes: CodeCriteria {
                gender: none_if_blank(self.gender),
                relation: none_if_blank(self.relation),
                sub: none_if_blank(self.sub),
                level: none_if_blank(self.level),
            },
        }
    }
}

/// Treat an omitted or blank query param as absent.
fn none_if_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

#[derive(Serialize)]
pub struct QuestionListOut {
    pub questions: Vec<Question>,
    pub total: usize,
}

/// Save payload. The code list replaces the stored one wholesale on every
/// save; entries are trimmed and blank lines dropped before storage.
#[derive(Debug, Deserialize)]
pub struct SaveQuestionIn {
    /// True for the create flow: the store rejects an ID already in use
    /// instead of overwriting (the allocator's output is only a suggestion).
    #[serde(default)]
    pub create: bool,
    pub q_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub code_names: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

#[derive(Serialize)]
pub struct SaveQuestionOut {
    pub ok: bool,
    pub q_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextIdQuery {
    #[serde(rename = "type")]
    pub qtype: QuestionType,
}

#[derive(Serialize)]
pub struct NextIdOut {
    pub q_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// Authoring-mode generation input: the current selection plus any unmanaged
/// codes carried over from the stored list, which are preserved up front.
#[derive(Debug, Deserialize)]
pub struct GenerateCodesIn {
    #[serde(flatten)]
    pub selection: Selection,
    #[serde(default)]
    pub unmanaged: Vec<String>,
}

#[derive(Serialize)]
pub struct GenerateCodesOut {
    pub codes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReconcileCodesIn {
    pub codes: Vec<String>,
}

#[derive(Serialize)]
pub struct PublishToggleOut {
    pub ok: bool,
    pub q_id: String,
    pub is_published: bool,
}

/// The full static registry, served once to the SPA for rendering pickers.
#[derive(Serialize)]
pub struct TaxonomyOut {
    pub gender_pairs: &'static [GenderPairDef],
    pub relations: &'static [RelationDef],
    pub levels: &'static [&'static str],
}
