//! Validation error types

use std::fmt;

#[derive(Debug, Clone)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., email)
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Body or form could not be parsed at all
    Malformed(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::Malformed(reason) => write!(f, "invalid payload: {}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trimmed value, or `Empty` when nothing is left.
pub fn non_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_owned())
}

pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "username",
            max: 50,
        };
        assert_eq!(
            err.to_string(),
            "username exceeds maximum length of 50 characters"
        );
    }

    #[test]
    fn non_empty_trims() {
        assert_eq!(non_empty("name", "  Parachutes ").unwrap(), "Parachutes");
        assert!(matches!(
            non_empty("name", "   ").unwrap_err(),
            ValidationError::Empty { field: "name" }
        ));
    }

    #[test]
    fn max_len_counts_chars() {
        assert!(max_len("username", "ééé", 3).is_ok());
        assert!(max_len("username", "éééé", 3).is_err());
    }
}
