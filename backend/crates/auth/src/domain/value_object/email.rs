//! Email Value Object
//!
//! Emails are stored and compared lower-cased, so lookups are
//! case-insensitive regardless of the column collation.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Maximum local part length (per RFC 5321)
const LOCAL_PART_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Email cannot be empty")]
    Empty,

    #[error("Email must be at most 254 characters")]
    TooLong,

    #[error("Invalid email format")]
    InvalidFormat,
}

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    pub fn new(email: impl AsRef<str>) -> Result<Self, EmailError> {
        let email = email.as_ref().trim().to_lowercase();

        if email.is_empty() {
            return Err(EmailError::Empty);
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(EmailError::TooLong);
        }

        if !is_valid_format(&email) {
            return Err(EmailError::InvalidFormat);
        }

        Ok(Self(email))
    }

    /// Rows written before lower-casing was enforced are folded on read
    pub fn from_db(email: impl AsRef<str>) -> Self {
        Self(email.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_format(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > LOCAL_PART_MAX_LENGTH {
        return false;
    }
    if local.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    // Rejects a second '@' too
    if domain.is_empty()
        || !domain.contains('.')
        || !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }

    domain
        .split('.')
        .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("ana@example.com").is_ok());
        assert!(Email::new("user.name@clinica.com.mx").is_ok());
        assert!(Email::new("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert_eq!(Email::new(""), Err(EmailError::Empty));
        assert_eq!(Email::new("   "), Err(EmailError::Empty));
        assert_eq!(Email::new("userexample.com"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("user@"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("@example.com"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("user@@example.com"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("user@example"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("user@example..com"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("us er@example.com"), Err(EmailError::InvalidFormat));
    }

    #[test]
    fn test_email_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(Email::new(long), Err(EmailError::TooLong));
    }

    #[test]
    fn test_email_case_normalization() {
        let email = Email::new("  Ana@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "ana@example.com");
        assert_eq!(Email::from_db("Ana@Example.com"), email);
    }
}
