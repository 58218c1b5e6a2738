//! Export target email validation

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

const MAX_EMAIL_LEN: usize = 254;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex")
});

/// Validated email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// ```
    /// use openmusic_server::models::EmailAddress;
    ///
    /// assert!(EmailAddress::new("listener@example.com").is_ok());
    /// assert!(EmailAddress::new("not-an-email").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty {
                field: "targetEmail",
            });
        }
        if s.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "targetEmail",
                max: MAX_EMAIL_LEN,
            });
        }
        if !EMAIL_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "targetEmail",
                reason: "must be a valid email address",
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_addresses() {
        assert!(EmailAddress::new("a@b.co").is_ok());
        assert!(EmailAddress::new("first.last+tag@mail.example.org").is_ok());
        assert_eq!(EmailAddress::new("  a@b.co ").unwrap().as_str(), "a@b.co");
    }

    #[test]
    fn rejects_invalid() {
        assert!(matches!(
            EmailAddress::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            EmailAddress::new("missing-at.example.com").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            EmailAddress::new("two@@example.com").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            EmailAddress::new("a b@example.com").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
    }
}
