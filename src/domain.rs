//! Domain models: question kinds, the question record with its tagged
//! type-specific payload, list filters, and dashboard aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::targeting::CodeCriteria;

/// Discriminant for the three question kinds, serialized as the single letter
/// used in stored records and ID prefixes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuestionType {
  #[serde(rename = "T")]
  Truth,
  #[serde(rename = "B")]
  Balance,
  #[serde(rename = "M")]
  MiniGame,
}

impl QuestionType {
  pub fn letter(self) -> char {
    match self {
      QuestionType::Truth => 'T',
      QuestionType::Balance => 'B',
      QuestionType::MiniGame => 'M',
    }
  }
}

/// Type-specific question payload, tagged by the same letter as
/// [`QuestionType`]. Reading or writing a variant's fields is always an
/// exhaustive match, never a loose field access.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum QuestionDetails {
  #[serde(rename = "T")]
  Truth {
    #[serde(default)]
    answers: String,
    #[serde(default)]
    keyword: Vec<String>,
  },
  #[serde(rename = "B")]
  Balance {
    #[serde(default)]
    choice_a: String,
    #[serde(default)]
    choice_b: String,
  },
  #[serde(rename = "M")]
  MiniGame {
    #[serde(default)]
    game_code: String,
    #[serde(default = "default_difficulty")]
    difficulty: u8,
    /// Opaque JSON blob owned by the game team; stored as-is.
    #[serde(default)]
    config: String,
  },
}

fn default_difficulty() -> u8 {
  1
}

impl QuestionDetails {
  pub fn question_type(&self) -> QuestionType {
    match self {
      QuestionDetails::Truth { .. } => QuestionType::Truth,
      QuestionDetails::Balance { .. } => QuestionType::Balance,
      QuestionDetails::MiniGame { .. } => QuestionType::MiniGame,
    }
  }
}

/// A persisted catalog entry.
///
/// `code_names` is wholly replaced on every save; individual entries may be
/// unmanaged strings and are kept exactly as stored. Records are never
/// structurally deleted here; `is_published` toggles visibility instead.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
  pub q_id: String,
  /// Internal record id, minted once on first insert.
  pub element_id: String,
  pub content: String,
  #[serde(default)]
  pub code_names: Vec<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(default)]
  pub is_published: bool,
  #[serde(flatten)]
  pub details: QuestionDetails,
}

/// Sort keys accepted by the list endpoint.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
  #[default]
  CreatedDesc,
  CreatedAsc,
  UpdatedDesc,
  UpdatedAsc,
  QIdDesc,
  QIdAsc,
}

/// List-query parameters after protocol-level defaulting.
#[derive(Clone, Debug, Default)]
pub struct QuestionFilter {
  pub qtype: Option<QuestionType>,
  pub search: Option<String>,
  pub limit: usize,
  pub skip: usize,
  pub sort: SortKey,
  pub codes: CodeCriteria,
}

/// Aggregates for the dashboard landing page.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
  pub total: usize,
  pub balance: usize,
  pub truth: usize,
  pub mini_game: usize,
  pub new_this_week: usize,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn question_serializes_flat_with_a_type_tag() {
    let q = Question {
      q_id: "B25-00007".into(),
      element_id: "el-1".into(),
      content: "Coffee or tea?".into(),
      code_names: vec!["M-F-Lo-Sw-L1".into()],
      created_at: Utc::now(),
      updated_at: Utc::now(),
      is_published: true,
      details: QuestionDetails::Balance { choice_a: "Coffee".into(), choice_b: "Tea".into() },
    };
    let value = serde_json::to_value(&q).expect("serialize");
    assert_eq!(value["type"], "B");
    assert_eq!(value["choice_a"], "Coffee");
    assert_eq!(value["q_id"], "B25-00007");
  }

  #[test]
  fn details_deserialize_by_tag_with_defaults() {
    let d: QuestionDetails =
      serde_json::from_str(r#"{"type":"M","game_code":"tap_race"}"#).expect("parse");
    match &d {
      QuestionDetails::MiniGame { game_code, difficulty, config } => {
        assert_eq!(game_code, "tap_race");
        assert_eq!(*difficulty, 1);
        assert!(config.is_empty());
      }
      other => panic!("wrong variant: {other:?}"),
    }
    assert_eq!(d.question_type(), QuestionType::MiniGame);

    let t: QuestionDetails = serde_json::from_str(r#"{"type":"T"}"#).expect("parse");
    assert_eq!(t.question_type(), QuestionType::Truth);
  }
}
