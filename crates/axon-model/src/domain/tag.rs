use std::{convert::TryFrom, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::constants::SLOT_SEPARATOR;
use crate::error::ModelError;

/// Base tag identifying a pool of interchangeable node slots for one build kind.
///
/// Invariants enforced at construction:
/// - non-empty;
/// - never contains the slot separator (the separator is what delimits the
///   numeric suffix of a slot label, so a tag containing it would make slot
///   labels ambiguous).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct Tag(String);

impl Tag {
    /// Create a tag from a string-like value, validating the invariants.
    pub fn new(s: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(s.into())
    }

    /// Returns the tag as `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Tag {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for Tag {
    type Error = ModelError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.is_empty() {
            return Err(ModelError::EmptyTag);
        }
        if s.contains(SLOT_SEPARATOR) {
            return Err(ModelError::TagContainsSeparator(s, SLOT_SEPARATOR));
        }
        Ok(Tag(s))
    }
}

impl From<Tag> for String {
    fn from(t: Tag) -> Self {
        t.0
    }
}
