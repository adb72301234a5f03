//! The categories a fresh store starts out with.

use std::collections::HashSet;

pub const DEFAULT_CATEGORIES: &[&str] = &["PERSON", "PLACE", "ANIMAL", "COMPUTER", "OTHER"];

pub fn default_categories() -> HashSet<String> {
    DEFAULT_CATEGORIES.iter().map(|c| (*c).to_owned()).collect()
}
