use std::fmt;

use crate::domain::constants::{SLOT_INDEX_WIDTH, SLOT_SEPARATOR, TEMPLATE_SEPARATOR};
use crate::domain::tag::Tag;

/// A parsed slot label: base tag plus numeric slot index.
///
/// Slot labels identify one reusable or newly created node slot and render
/// as `base + separator + zero-padded index` (`linux-000`). Classification
/// of an arbitrary display name is a pure function: a name either parses
/// into a `SlotLabel` or it is not a slot label at all — there is no
/// heuristic middle ground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLabel {
    base: String,
    index: u32,
}

impl SlotLabel {
    /// Render the slot label for `index` under `tag`.
    pub fn mint(tag: &Tag, index: u32) -> String {
        format!("{tag}{SLOT_SEPARATOR}{index:0width$}", width = SLOT_INDEX_WIDTH)
    }

    /// Classify a display name.
    ///
    /// Returns `Some` when the name has the shape `base-separator-digits`
    /// with a non-empty base and an all-numeric suffix, `None` otherwise.
    /// The base may itself contain further separators (`ci-linux-003`
    /// parses with base `ci-linux`).
    pub fn parse(name: &str) -> Option<Self> {
        let (base, suffix) = name.rsplit_once(SLOT_SEPARATOR)?;
        if base.is_empty() || suffix.is_empty() {
            return None;
        }
        if !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            base: base.to_string(),
            index: suffix.parse().ok()?,
        })
    }

    /// Base tag portion of the label.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Numeric slot index.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{:0width$}",
            self.base,
            SLOT_SEPARATOR,
            self.index,
            width = SLOT_INDEX_WIDTH
        )
    }
}

/// Template prefix of a display name: the substring before the first
/// template separator, or the whole name when none is present.
///
/// `linux__large-000` resolves to the `linux` template.
pub fn template_prefix(name: &str) -> &str {
    match name.split_once(TEMPLATE_SEPARATOR) {
        Some((prefix, _)) => prefix,
        None => name,
    }
}
