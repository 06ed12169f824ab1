//! Human-assigned sequential question IDs: `{type letter}{2-digit year}-{5-digit seq}`,
//! e.g. `T25-00042`.

use chrono::Datelike;

use crate::domain::QuestionType;

/// Current year, two digits, for building ID prefixes.
pub fn current_year2() -> u32 {
  chrono::Utc::now().year() as u32 % 100
}

/// Prefix shared by every ID of one type in one year, e.g. `T25-`.
pub fn id_prefix(qtype: QuestionType, year2: u32) -> String {
  format!("{}{:02}-", qtype.letter(), year2 % 100)
}

/// Suggest the next ID after `latest`, the lexicographically greatest stored
/// ID carrying the matching prefix. Lexicographic max equals numeric max only
/// while the 5-digit zero padding holds, which this function preserves.
///
/// Any unparseable input falls back to the first sequence; this never fails.
/// The result is a suggestion only: two concurrent creates can be handed the
/// same ID, and the store rejects the second on insert.
pub fn next_question_id(qtype: QuestionType, year2: u32, latest: Option<&str>) -> String {
  let prefix = id_prefix(qtype, year2);
  let seq = latest
    .and_then(|id| id.strip_prefix(&prefix))
    .and_then(|rest| rest.parse::<u32>().ok())
    .map(|n| n + 1)
    .unwrap_or(1);
  format!("{prefix}{seq:05}")
}
