//! Small utility helpers used across modules.

/// Case-insensitive substring test, for the free-text list search.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", cut, s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn contains_ci_ignores_case() {
    assert!(contains_ci("Morning Routines", "routine"));
    assert!(!contains_ci("Morning", "evening"));
  }

  #[test]
  fn trunc_keeps_short_strings_and_counts_bytes() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let long = "x".repeat(20);
    assert!(trunc_for_log(&long, 5).starts_with("xxxxx…"));
  }
}
