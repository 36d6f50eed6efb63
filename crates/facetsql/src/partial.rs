//! Field tags for sparse updates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of fields a write request intends to modify.
///
/// Tags are the logical field names of the record (`"Price"`), with dotted
/// paths for fields of embedded records (`"Brand.ID"`). A field missing from
/// the set is left untouched even if its in-memory value is zero or empty.
///
/// Serializes as a plain list: `["Name", "Price"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialSet(BTreeSet<String>);

impl PartialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>) -> &mut Self {
        self.0.insert(tag.into());
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PartialSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
