//! Common model-level constants.
//!
//! Well-known string tokens used across the label and provisioning layers.
//! Keeping them here avoids scattering magic strings throughout the codebase.

/// Separator between a base tag and the numeric slot suffix.
///
/// A display name like `linux-000` is the slot label for index 0 under the
/// base tag `linux`. Base tags themselves must never contain this token.
pub const SLOT_SEPARATOR: &str = "-";

/// Separator between a template prefix and the rest of a display name.
///
/// Template lookup for a label strips everything from the first occurrence
/// of this token onward, so `linux__large-000` resolves to the `linux`
/// template.
pub const TEMPLATE_SEPARATOR: &str = "__";

/// Zero-padding width of the numeric slot suffix.
pub const SLOT_INDEX_WIDTH: usize = 3;

/// Environment variable carrying a node's 1-based position within the
/// slot ordering of the build that claimed it.
pub const MATRIX_ENV_VAR: &str = "MATRIX_EXEC_ID";
