//! Shared validation utilities for identifiers and user-entered text.
//!
//! Identifiers follow [`IdentifierRules`]; task text and category names are
//! checked by [`TextRules`]. Both are plain functions over `&str` so the same
//! rules apply in the repositories, the application layer and the CLI.

use crate::error::InvalidArgument;

/// Validation rules for string identifiers
#[derive(Debug, Clone, Copy)]
pub struct IdentifierRules {
    /// Maximum allowed length in characters
    pub max_length: usize,
    /// Whether to allow underscores in the identifier
    pub allow_underscores: bool,
}

impl IdentifierRules {
    /// Rules for task and category identifiers
    ///
    /// - Max length: 64 characters
    /// - Allows: alphanumeric, `-`, `_`
    /// - No whitespace anywhere
    pub const RECORD_ID: Self = Self {
        max_length: 64,
        allow_underscores: true,
    };

    /// Validate a string against these rules
    pub fn validate(&self, input: &str) -> Result<String, ValidationError> {
        if input.is_empty() {
            return Err(ValidationError::Empty);
        }

        if input.trim().is_empty() {
            return Err(ValidationError::WhitespaceOnly);
        }

        if input.chars().count() > self.max_length {
            return Err(ValidationError::TooLong {
                length: input.chars().count(),
                max: self.max_length,
            });
        }

        for ch in input.chars() {
            let is_valid =
                ch.is_ascii_alphanumeric() || ch == '-' || (ch == '_' && self.allow_underscores);

            if !is_valid {
                return Err(ValidationError::InvalidChar {
                    char: ch,
                    input: input.to_string(),
                });
            }
        }

        Ok(input.to_string())
    }
}

/// Errors that can occur during identifier validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Identifier is empty
    #[error("Identifier cannot be empty")]
    Empty,
    /// Identifier contains only whitespace
    #[error("Identifier cannot be whitespace-only")]
    WhitespaceOnly,
    /// Identifier exceeds maximum allowed length
    #[error("Identifier too long: {length} characters (max {max})")]
    TooLong { length: usize, max: usize },
    /// Identifier contains an invalid character
    #[error("Identifier '{input}' contains invalid character '{char}'")]
    InvalidChar { char: char, input: String },
}

/// Rules for free text entered by the user.
#[derive(Debug, Clone, Copy)]
pub struct TextRules;

impl TextRules {
    /// Upper bound on task text, counted in characters.
    pub const MAX_TASK_TEXT: usize = 100;

    /// Reject task text that is empty after trimming.
    ///
    /// This is the only check the repositories apply; length limits are a
    /// front-end concern (see [`TextRules::task_text`]).
    pub fn require_text(text: &str) -> Result<(), InvalidArgument> {
        if text.trim().is_empty() {
            return Err(InvalidArgument::EmptyText);
        }
        Ok(())
    }

    /// Full front-end check: trims, rejects empty and over-long text.
    pub fn task_text(text: &str) -> Result<String, InvalidArgument> {
        let trimmed = text.trim();
        Self::require_text(trimmed)?;

        let len = trimmed.chars().count();
        if len > Self::MAX_TASK_TEXT {
            return Err(InvalidArgument::TextTooLong {
                len,
                max: Self::MAX_TASK_TEXT,
            });
        }

        Ok(trimmed.to_string())
    }

    /// Trim a category name and reject it if nothing is left.
    pub fn category_name(name: &str) -> Result<String, InvalidArgument> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(InvalidArgument::EmptyName);
        }
        Ok(trimmed.to_string())
    }

    /// Key used for case-insensitive comparisons of names and task text.
    pub fn fold(value: &str) -> String {
        value.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_rules() {
        let rules = IdentifierRules::RECORD_ID;

        assert!(rules.validate("01022025-a1b2c").is_ok());
        assert!(rules.validate("task_1").is_ok());
        assert!(rules.validate("General").is_ok());

        assert!(matches!(rules.validate(""), Err(ValidationError::Empty)));
        assert!(matches!(
            rules.validate("   "),
            Err(ValidationError::WhitespaceOnly)
        ));
        assert!(matches!(
            rules.validate("has space"),
            Err(ValidationError::InvalidChar { char: ' ', .. })
        ));
        assert!(matches!(
            rules.validate("../etc"),
            Err(ValidationError::InvalidChar { char: '.', .. })
        ));

        let long_id = "a".repeat(65);
        assert!(matches!(
            rules.validate(&long_id),
            Err(ValidationError::TooLong { length: 65, max: 64 })
        ));
    }

    #[test]
    fn test_task_text() {
        assert_eq!(TextRules::task_text("  Buy milk ").unwrap(), "Buy milk");
        assert_eq!(TextRules::task_text("   "), Err(InvalidArgument::EmptyText));

        let exactly_max = "x".repeat(100);
        assert!(TextRules::task_text(&exactly_max).is_ok());

        let too_long = "x".repeat(101);
        assert_eq!(
            TextRules::task_text(&too_long),
            Err(InvalidArgument::TextTooLong { len: 101, max: 100 })
        );
    }

    #[test]
    fn test_require_text_ignores_length() {
        let long = "y".repeat(500);
        assert!(TextRules::require_text(&long).is_ok());
        assert_eq!(
            TextRules::require_text("\t\n"),
            Err(InvalidArgument::EmptyText)
        );
    }

    #[test]
    fn test_category_name() {
        assert_eq!(TextRules::category_name(" Work ").unwrap(), "Work");
        assert_eq!(TextRules::category_name(""), Err(InvalidArgument::EmptyName));
        assert_eq!(TextRules::fold("  WoRk "), "work");
    }
}
