//! Validation helpers for the entity model
//!
//! Title rules and the string-to-enum parsing shared by `Task`, `Note`
//! and the command line.

use crate::error::{Error, Result};

/// Maximum title length, in characters
pub const MAX_TITLE_LEN: usize = 100;

/// Validate a task or note title
///
/// # Arguments
/// * `title` - Title to check
///
/// # Returns
/// `Ok(())` when the title is non-empty and at most [`MAX_TITLE_LEN`] characters
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("title cannot be empty"));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(Error::validation(format!(
            "title cannot be longer than {} characters (got {})",
            MAX_TITLE_LEN, len
        )));
    }
    Ok(())
}

/// Match `value` against a fixed set of names
///
/// Returns the index of the matching name, or a validation error listing
/// the valid options.
pub(crate) fn parse_enum(what: &str, value: &str, options: &[&str]) -> Result<usize> {
    let value = value.trim();
    options.iter().position(|o| *o == value).ok_or_else(|| {
        Error::validation(format!(
            "invalid {} '{}'. Valid options are: {}",
            what,
            value,
            options.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title_accepts_boundaries() {
        assert!(validate_title("a").is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
    }

    #[test]
    fn test_validate_title_rejects_empty_and_long() {
        assert!(validate_title("").unwrap_err().is_validation());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_title_counts_characters_not_bytes() {
        // 100 Cyrillic letters are 200 bytes but still a valid title
        let title = "ж".repeat(MAX_TITLE_LEN);
        assert!(validate_title(&title).is_ok());
    }

    #[test]
    fn test_parse_enum() {
        let options = ["low", "medium", "high"];
        assert_eq!(parse_enum("priority", "medium", &options).unwrap(), 1);
        assert_eq!(parse_enum("priority", " high ", &options).unwrap(), 2);
        let err = parse_enum("priority", "urgent", &options).unwrap_err();
        assert!(err.to_string().contains("low, medium, high"));
    }
}
