//! Static targeting taxonomy: gender pairs, the relation -> sub-relation tree,
//! and the ordered intimacy levels.
//!
//! Loaded once, process-wide, never mutated at runtime. The `value`/`key`
//! fields are wire data: stored codes reference them verbatim, so renaming one
//! silently orphans every code already persisted with it. The tables are
//! serialized as-is to the admin SPA, which renders pickers from the labels.

use serde::Serialize;

/// Ordered pair "initiator gender - target gender".
#[derive(Serialize)]
pub struct GenderPairDef {
  pub value: &'static str,
  pub label: &'static str,
}

/// A specific situational context within a relation.
#[derive(Serialize)]
pub struct SubRelationDef {
  pub value: &'static str,
  pub label: &'static str,
  /// Gender pairs this sub-relation is semantically valid for.
  /// `None` means valid for every pair.
  pub valid_pairs: Option<&'static [&'static str]>,
}

/// Top-level relationship category and its sub-relations.
#[derive(Serialize)]
pub struct RelationDef {
  pub key: &'static str,
  pub label: &'static str,
  pub subs: &'static [SubRelationDef],
}

macro_rules! sub {
  ($value:expr, $label:expr) => {
    SubRelationDef { value: $value, label: $label, valid_pairs: None }
  };
  ($value:expr, $label:expr, $pairs:expr) => {
    SubRelationDef { value: $value, label: $label, valid_pairs: Some($pairs) }
  };
}

pub const GENDER_PAIRS: &[GenderPairDef] = &[
  GenderPairDef { value: "M-M", label: "Male-Male" },
  GenderPairDef { value: "F-F", label: "Female-Female" },
  GenderPairDef { value: "M-F", label: "Male-Female" },
  GenderPairDef { value: "F-M", label: "Female-Male" },
];

/// Sub-relation values must stay unique across the whole tree; they are used
/// as a flat lookup key (see [`find_sub`]).
pub const RELATIONS: &[RelationDef] = &[
  RelationDef {
    key: "B",
    label: "Friend (B)",
    subs: &[
      sub!("Ar", "Area/Hometown (Ar)"),
      sub!("Sc", "School (Sc)"),
      sub!("Or", "Work/Org (Or)"),
      sub!("Dc", "Daily/Social (Dc)"),
    ],
  },
  RelationDef {
    key: "Fa",
    label: "Family (Fa)",
    subs: &[
      sub!("Br", "Brother (Br)", &["M-M", "F-M"]), // target male
      sub!("Si", "Sister (Si)", &["F-F", "M-F"]), // target female
      sub!("Bs", "Brother-Sister (Bs)", &["M-F"]),
      sub!("Sb", "Sister-Brother (Sb)", &["F-M"]),
      sub!("Co", "Cousin (Co)"),
      sub!("Fs", "Father-Son (Fs)", &["M-M"]),
      sub!("Fd", "Father-Daughter (Fd)", &["M-F"]),
      sub!("Ms", "Mother-Son (Ms)", &["F-M"]),
      sub!("Md", "Mother-Daughter (Md)", &["F-F"]),
      sub!("Gp", "Grandparent (Gp)"),
    ],
  },
  RelationDef {
    key: "Lo",
    label: "Lover (Lo)",
    subs: &[
      sub!("Sw", "Sweet/Lover (Sw)", &["M-F", "F-M"]),
      sub!("Gw", "Girlfriend (Gw)", &["M-F", "F-M"]),
      sub!("Hw", "Husband-Wife (Hw)", &["M-F"]),
      sub!("Pw", "Partner-Wife (Pw)", &["F-M"]),
    ],
  },
];

pub const INTIMACY_LEVELS: &[&str] = &["L1", "L2", "L3", "L4", "L5"];

impl SubRelationDef {
  /// Whether this sub-relation may be combined with the given gender pair.
  pub fn allows_pair(&self, pair: &str) -> bool {
    match self.valid_pairs {
      Some(pairs) => pairs.contains(&pair),
      None => true,
    }
  }
}

pub fn find_pair(value: &str) -> Option<&'static GenderPairDef> {
  GENDER_PAIRS.iter().find(|p| p.value == value)
}

pub fn find_relation(key: &str) -> Option<&'static RelationDef> {
  RELATIONS.iter().find(|r| r.key == key)
}

/// Flat sub-relation lookup; returns the owning relation alongside the def.
pub fn find_sub(value: &str) -> Option<(&'static RelationDef, &'static SubRelationDef)> {
  RELATIONS
    .iter()
    .find_map(|r| r.subs.iter().find(|s| s.value == value).map(|s| (r, s)))
}

pub fn find_level(value: &str) -> Option<&'static str> {
  INTIMACY_LEVELS.iter().copied().find(|l| *l == value)
}
