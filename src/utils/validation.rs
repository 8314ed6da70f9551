//! Input validation and name normalization

use crate::utils::error::{RbacError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of entity names (user ids, role names, set names, …)
pub const MAX_NAME_LEN: usize = 40;

/// Maximum length of free-text descriptions
pub const MAX_DESCRIPTION_LEN: usize = 180;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\x00-\x1f\x7f]+$").expect("Invalid name regex"));

/// Case-fold a name into its lookup key.
///
/// Role names, permission keys, policy names and user ids are unique
/// case-insensitively; every map in the engine is keyed by this form.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-insensitive name comparison
pub fn same_name(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Validate an entity name
pub fn validate_name(field: &str, value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RbacError::validation(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(RbacError::validation(format!(
            "{} '{}' exceeds {} characters",
            field, trimmed, MAX_NAME_LEN
        )));
    }
    if !NAME_PATTERN.is_match(trimmed) {
        return Err(RbacError::validation(format!(
            "{} contains control characters",
            field
        )));
    }
    Ok(())
}

/// Validate an optional description
pub fn validate_description(value: Option<&str>) -> Result<()> {
    match value {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LEN => Err(RbacError::validation(
            format!("description exceeds {} characters", MAX_DESCRIPTION_LEN),
        )),
        _ => Ok(()),
    }
}

/// Validate the tenant/partition identifier threaded through every call
pub fn validate_context_id(context_id: &str) -> Result<()> {
    validate_name("context id", context_id)
}
