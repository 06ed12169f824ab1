//! Targeting-code generation and reconciliation.
//!
//! A targeting code names one (gender pair, relation, sub-relation, intimacy
//! level) tuple a question is shown for, as five dash-joined tokens, e.g.
//! `M-F-Lo-Sw-L3` (the gender pair carries the first dash). Questions store a
//! flat list of these strings. This module:
//! 1) expands per-axis selections into the full set of valid codes,
//! 2) recovers selections from an arbitrary stored code list, carrying codes
//!    that no longer fit the taxonomy through as opaque "unmanaged" strings,
//! 3) translates partial list-filter criteria into a code set for overlap
//!    queries against the store.
//!
//! Everything here is pure and synchronous; the only input besides arguments
//! is the static registry in [`crate::taxonomy`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::taxonomy::{
  find_level, find_pair, find_relation, find_sub, GENDER_PAIRS, INTIMACY_LEVELS, RELATIONS,
};

/// One decoded code. Fields borrow from the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedCode {
  pub pair: &'static str,
  pub relation: &'static str,
  pub sub: &'static str,
  pub level: &'static str,
}

/// Decode one stored code string.
///
/// `None` means the code is *unmanaged*: wrong token count, a field the
/// registry does not know, or a gender pair the sub-relation excludes.
/// Unmanaged codes are never an error and never dropped; callers keep them
/// verbatim so old data survives taxonomy changes.
pub fn parse_code(code: &str) -> Option<ParsedCode> {
  let parts: Vec<&str> = code.split('-').collect();
  if parts.len() != 5 {
    return None;
  }
  // Tokens 0-1 reassemble into the gender pair value.
  let pair = find_pair(&format!("{}-{}", parts[0], parts[1]))?;
  let relation = find_relation(parts[2])?;
  let (_, sub) = find_sub(parts[3])?;
  let level = find_level(parts[4])?;
  if !sub.allows_pair(pair.value) {
    return None;
  }
  Some(ParsedCode { pair: pair.value, relation: relation.key, sub: sub.value, level })
}

/// Canonical five-token wire form. Callers format already-validated tuples;
/// there is no re-validation here.
pub fn format_code(pair: &str, relation: &str, sub: &str, level: &str) -> String {
  format!("{pair}-{relation}-{sub}-{level}")
}

/// Per-axis chosen values, as they arrive from the authoring UI or come back
/// out of [`reconcile`]. Order of the inner lists does not matter; generation
/// always walks the registry in declaration order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
  #[serde(default)]
  pub pairs: Vec<String>,
  #[serde(default)]
  pub relations: Vec<String>,
  #[serde(default)]
  pub subs: Vec<String>,
  #[serde(default)]
  pub levels: Vec<String>,
}

impl Selection {
  /// Drop any selected sub-relation that is not a child of at least one
  /// selected relation. Standing invariant: this runs after every mutation of
  /// `relations`. [`reconcile`] applies it before returning, and the
  /// authoring endpoints apply it to incoming selections before generating.
  pub fn prune_stale_subs(&mut self) {
    self.subs.retain(|s| {
      self
        .relations
        .iter()
        .filter_map(|r| find_relation(r))
        .any(|def| def.subs.iter().any(|d| d.value == *s))
    });
  }

  fn axis_on(chosen: &[String], value: &str, wildcard: bool) -> bool {
    if chosen.is_empty() {
      wildcard
    } else {
      chosen.iter().any(|c| c == value)
    }
  }
}

/// What an empty axis means during generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyAxis {
  /// Authoring: no codes until every axis has at least one explicit choice.
  Nothing,
  /// Filtering: an empty axis matches every registry value.
  Wildcard,
}

/// Expand a selection into the constrained cartesian product of valid codes.
///
/// Walks GenderPair x Relation x SubRelation x IntimacyLevel in registry
/// declaration order, keeping a combination only when the sub-relation belongs
/// to the iterated relation and its valid-pairs constraint (if any) admits the
/// iterated pair. Because iteration follows the registry rather than the
/// selection lists, overlapping or duplicated selections cannot duplicate
/// output, and the order is stable: pair-major, then relation, sub, level.
pub fn generate(selection: &Selection, empty_axis: EmptyAxis) -> Vec<String> {
  let wildcard = empty_axis == EmptyAxis::Wildcard;
  let mut codes = Vec::new();
  for pair in GENDER_PAIRS {
    if !Selection::axis_on(&selection.pairs, pair.value, wildcard) {
      continue;
    }
    for relation in RELATIONS {
      if !Selection::axis_on(&selection.relations, relation.key, wildcard) {
        continue;
      }
      for sub in relation.subs {
        if !Selection::axis_on(&selection.subs, sub.value, wildcard) {
          continue;
        }
        if !sub.allows_pair(pair.value) {
          continue;
        }
        for level in INTIMACY_LEVELS {
          if !Selection::axis_on(&selection.levels, level, wildcard) {
            continue;
          }
          codes.push(format_code(pair.value, relation.key, sub.value, level));
        }
      }
    }
  }
  codes
}

/// Selections recovered from a stored code list, plus the codes that no longer
/// fit the taxonomy.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Reconciled {
  #[serde(flatten)]
  pub selection: Selection,
  pub unmanaged: Vec<String>,
}

/// Best-effort inverse of [`generate`]: recover the distinct per-axis values
/// behind an arbitrary stored code list.
///
/// Valid codes contribute their four fields to the selection; everything else
/// lands in `unmanaged` verbatim, in input order, duplicates intact (the final
/// regeneration step deduplicates the total list, not this intermediate one).
/// Feeding the recovered selection back into [`generate`] may produce a
/// superset of the input, since the cartesian product fills in combinations
/// the original list never held. Only `unmanaged` round-trips exactly.
pub fn reconcile(codes: &[String]) -> Reconciled {
  let mut out = Reconciled::default();
  for code in codes {
    match parse_code(code) {
      Some(parsed) => {
        push_unique(&mut out.selection.pairs, parsed.pair);
        push_unique(&mut out.selection.relations, parsed.relation);
        push_unique(&mut out.selection.subs, parsed.sub);
        push_unique(&mut out.selection.levels, parsed.level);
      }
      None => out.unmanaged.push(code.clone()),
    }
  }
  out.selection.prune_stale_subs();
  out
}

/// Full code list for a question under edit: unmanaged codes first, then the
/// authoring-mode expansion of the selection, deduplicated by string value.
pub fn regenerate(reconciled: &Reconciled) -> Vec<String> {
  let mut seen = HashSet::new();
  let mut out = Vec::new();
  let generated = generate(&reconciled.selection, EmptyAxis::Nothing);
  for code in reconciled.unmanaged.iter().cloned().chain(generated) {
    if seen.insert(code.clone()) {
      out.push(code);
    }
  }
  out
}

fn push_unique(list: &mut Vec<String>, value: &str) {
  if !list.iter().any(|v| v == value) {
    list.push(value.to_string());
  }
}

/// Partial list-filter criteria. Each present axis pins exactly one value;
/// absent axes are wildcards.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CodeCriteria {
  pub gender: Option<String>,
  pub relation: Option<String>,
  pub sub: Option<String>,
  pub level: Option<String>,
}

impl CodeCriteria {
  pub fn is_empty(&self) -> bool {
    self.gender.is_none() && self.relation.is_none() && self.sub.is_none() && self.level.is_none()
  }
}

/// Outcome of translating [`CodeCriteria`] into a storage-side predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodeFilter {
  /// No criterion present; the caller skips code filtering entirely.
  NotApplied,
  /// Match questions whose stored code list intersects this set.
  Codes(Vec<String>),
  /// The combination can match nothing; the caller returns an empty page,
  /// never an unfiltered one.
  Impossible,
}

/// Build the overlap predicate for the question list query.
///
/// A pinned sub-relation whose owner is not the pinned relation (or that the
/// registry does not know) is caught explicitly before expansion. Any other
/// pinned combination that expands to nothing (an unknown value, or a gender
/// pair every surviving sub-relation excludes) is impossible as well.
pub fn build_code_filter(criteria: &CodeCriteria) -> CodeFilter {
  if criteria.is_empty() {
    return CodeFilter::NotApplied;
  }

  if let Some(sub) = &criteria.sub {
    match find_sub(sub) {
      None => return CodeFilter::Impossible,
      Some((owner, _)) => {
        if let Some(relation) = &criteria.relation {
          if owner.key != *relation {
            return CodeFilter::Impossible;
          }
        }
      }
    }
  }

  let selection = Selection {
    pairs: criteria.gender.iter().cloned().collect(),
    relations: criteria.relation.iter().cloned().collect(),
    subs: criteria.sub.iter().cloned().collect(),
    levels: criteria.level.iter().cloned().collect(),
  };
  let codes = generate(&selection, EmptyAxis::Wildcard);
  if codes.is_empty() {
    CodeFilter::Impossible
  } else {
    CodeFilter::Codes(codes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sel(pairs: &[&str], relations: &[&str], subs: &[&str], levels: &[&str]) -> Selection {
    Selection {
      pairs: pairs.iter().map(|s| s.to_string()).collect(),
      relations: relations.iter().map(|s| s.to_string()).collect(),
      subs: subs.iter().map(|s| s.to_string()).collect(),
      levels: levels.iter().map(|s| s.to_string()).collect(),
    }
  }

  #[test]
  fn parse_accepts_canonical_codes() {
    let parsed = parse_code("M-F-Lo-Sw-L3").expect("valid code");
    assert_eq!(parsed.pair, "M-F");
    assert_eq!(parsed.relation, "Lo");
    assert_eq!(parsed.sub, "Sw");
    assert_eq!(parsed.level, "L3");
  }

  #[test]
  fn parse_rejects_malformed_and_unknown_codes() {
    assert!(parse_code("").is_none());
    assert!(parse_code("M-F-Lo-Sw").is_none()); // four tokens
    assert!(parse_code("M-F-Lo-Sw-L3-extra").is_none()); // six tokens
    assert!(parse_code("M-X-Lo-Sw-L3").is_none()); // unknown pair
    assert!(parse_code("M-F-Zz-Sw-L3").is_none()); // unknown relation
    assert!(parse_code("M-F-Lo-Qq-L3").is_none()); // unknown sub
    assert!(parse_code("M-F-Lo-Sw-L9").is_none()); // unknown level
    assert!(parse_code("M-M-Lo-Sw-L3").is_none()); // Sw excludes M-M
  }

  #[test]
  fn generation_round_trips_a_single_value_selection() {
    let selection = sel(&["M-F"], &["Lo"], &["Sw"], &["L3"]);
    let codes = generate(&selection, EmptyAxis::Nothing);
    assert_eq!(codes, vec!["M-F-Lo-Sw-L3".to_string()]);

    let back = reconcile(&codes);
    assert_eq!(back.selection, selection);
    assert!(back.unmanaged.is_empty());
  }

  #[test]
  fn authoring_mode_needs_every_axis() {
    let selection = sel(&["M-F"], &["Lo"], &["Sw"], &[]);
    assert!(generate(&selection, EmptyAxis::Nothing).is_empty());
  }

  #[test]
  fn gender_pair_constraint_is_enforced() {
    let blocked = sel(&["M-M"], &["Fa"], &["Si"], &["L1"]);
    assert!(generate(&blocked, EmptyAxis::Nothing).is_empty());

    let allowed = sel(&["F-F"], &["Fa"], &["Si"], &["L1"]);
    assert_eq!(generate(&allowed, EmptyAxis::Nothing), vec!["F-F-Fa-Si-L1".to_string()]);
  }

  #[test]
  fn overlapping_selections_never_duplicate_codes() {
    let selection = sel(&["M-F", "M-F"], &["Lo", "Lo"], &["Sw", "Sw"], &["L1", "L1", "L2"]);
    let codes = generate(&selection, EmptyAxis::Nothing);
    assert_eq!(codes, vec!["M-F-Lo-Sw-L1".to_string(), "M-F-Lo-Sw-L2".to_string()]);
  }

  #[test]
  fn generation_order_is_pair_major_registry_order() {
    let selection = sel(&["F-M", "M-F"], &["Lo"], &["Sw"], &["L2", "L1"]);
    let codes = generate(&selection, EmptyAxis::Nothing);
    // M-F is declared before F-M, L1 before L2, regardless of selection order.
    assert_eq!(
      codes,
      vec!["M-F-Lo-Sw-L1", "M-F-Lo-Sw-L2", "F-M-Lo-Sw-L1", "F-M-Lo-Sw-L2"]
    );
  }

  #[test]
  fn unmanaged_codes_survive_reconcile_and_regeneration() {
    let stored = vec![
      "M-F-Lo-Sw-L3".to_string(),
      "legacy-code".to_string(),
      "M-M-Lo-Sw-L3".to_string(), // excluded pair, also unmanaged
      "legacy-code".to_string(),  // duplicate preserved in the intermediate list
    ];
    let back = reconcile(&stored);
    assert_eq!(back.unmanaged, vec!["legacy-code", "M-M-Lo-Sw-L3", "legacy-code"]);

    let full = regenerate(&back);
    assert_eq!(full, vec!["legacy-code", "M-M-Lo-Sw-L3", "M-F-Lo-Sw-L3"]);
  }

  #[test]
  fn reconcile_widens_to_the_full_product() {
    // Two codes sharing no axis values: the recovered selection regenerates
    // their full 2x2x2 cross (restricted by valid pairs), a superset.
    let stored = vec!["M-F-Lo-Sw-L1".to_string(), "F-M-Lo-Gw-L2".to_string()];
    let back = reconcile(&stored);
    let full = regenerate(&back);
    assert_eq!(full.len(), 8);
    for code in &stored {
      assert!(full.contains(code));
    }
  }

  #[test]
  fn stale_subs_are_pruned_when_relations_change() {
    let mut selection = sel(&["M-F"], &["Fa"], &["Si", "Co"], &["L1"]);
    selection.relations = vec!["Lo".to_string()];
    selection.prune_stale_subs();
    assert!(selection.subs.is_empty());
  }

  #[test]
  fn empty_criteria_do_not_apply() {
    assert_eq!(build_code_filter(&CodeCriteria::default()), CodeFilter::NotApplied);
  }

  #[test]
  fn mismatched_relation_and_sub_is_impossible() {
    let criteria = CodeCriteria {
      relation: Some("B".to_string()),
      sub: Some("Br".to_string()), // Br belongs to Fa
      ..Default::default()
    };
    assert_eq!(build_code_filter(&criteria), CodeFilter::Impossible);
  }

  #[test]
  fn excluded_gender_and_sub_is_impossible() {
    let criteria = CodeCriteria {
      gender: Some("M-M".to_string()),
      sub: Some("Si".to_string()),
      ..Default::default()
    };
    assert_eq!(build_code_filter(&criteria), CodeFilter::Impossible);
  }

  #[test]
  fn sub_alone_expands_all_pairs_and_levels() {
    let criteria = CodeCriteria { sub: Some("Ar".to_string()), ..Default::default() };
    match build_code_filter(&criteria) {
      CodeFilter::Codes(codes) => {
        // Ar has no pair constraint: 4 pairs x 5 levels under Friend only.
        assert_eq!(codes.len(), 20);
        assert!(codes.iter().all(|c| c.contains("-B-Ar-")));
      }
      other => panic!("expected codes, got {other:?}"),
    }
  }

  #[test]
  fn relation_alone_expands_its_subs_with_constraints() {
    let criteria = CodeCriteria { relation: Some("Lo".to_string()), ..Default::default() };
    match build_code_filter(&criteria) {
      CodeFilter::Codes(codes) => {
        // Lover subs only admit mixed pairs: Sw+Gw over {M-F, F-M}, Hw over
        // M-F, Pw over F-M = 6 pair-sub combos x 5 levels.
        assert_eq!(codes.len(), 30);
        assert!(codes.iter().all(|c| parse_code(c).is_some()));
      }
      other => panic!("expected codes, got {other:?}"),
    }
  }

  #[test]
  fn unknown_pinned_values_are_impossible() {
    let criteria = CodeCriteria { gender: Some("X-X".to_string()), ..Default::default() };
    assert_eq!(build_code_filter(&criteria), CodeFilter::Impossible);
  }
}
