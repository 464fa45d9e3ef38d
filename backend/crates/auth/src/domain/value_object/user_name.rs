//! User Name Value Object
//!
//! The login name (`usuario` column). Staff usually pick something like
//! `dra.lopez` or `becario_07`; Spanish letters are allowed.
//!
//! ## Rules
//! - NFKC normalised and trimmed; case is preserved for display
//! - Comparison uses the lower-cased canonical form
//! - 3 to 50 characters, letters, digits and `_ . -` only
//! - Must start and end with a letter or digit
//! - No `@`, so a login identifier is never ambiguous with an email

use serde::Serialize;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 3;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 50;

/// Allowed special characters in user name
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

/// Names that would be confusing in logs or route paths
const RESERVED_WORDS: &[&str] = &["root", "system", "null", "undefined", "anonymous", "me"];

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    Empty,
    TooShort { length: usize, min: usize },
    TooLong { length: usize, max: usize },
    InvalidCharacter { char: char, position: usize },
    InvalidEdge { char: char },
    Reserved { word: String },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "User name cannot be empty"),
            Self::TooShort { length, min } => {
                write!(f, "User name is too short ({length} chars, minimum {min})")
            }
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => write!(
                f,
                "Invalid character '{char}' at position {position}. Only letters, digits, _, . and - are allowed"
            ),
            Self::InvalidEdge { char } => write!(
                f,
                "User name cannot start or end with '{char}'"
            ),
            Self::Reserved { word } => write!(f, "'{word}' is a reserved user name"),
        }
    }
}

impl std::error::Error for UserNameError {}

/// Validated user name
///
/// # Storage
/// - `original`: trimmed, NFKC normalized, preserves case
/// - `canonical`: lower-cased form for comparisons
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct UserName {
    original: String,
    canonical: String,
}

impl UserName {
    /// Create a new UserName from raw input
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let original = Self::normalize(input.as_ref());
        let canonical = original.to_lowercase();
        Self::validate(&canonical)?;
        Ok(Self {
            original,
            canonical,
        })
    }

    /// Create from a stored row without validation
    ///
    /// Rows written by the previous backend do not follow the current rules
    /// and must still load.
    pub fn from_db(original: &str) -> Self {
        Self {
            original: original.to_string(),
            canonical: original.to_lowercase(),
        }
    }

    /// Name typed at login, only normalised and trimmed
    ///
    /// Registration rules do not apply: a stored name that predates them
    /// must still match. `None` when nothing is left after trimming.
    pub fn for_lookup(input: impl AsRef<str>) -> Option<Self> {
        let original = Self::normalize(input.as_ref());
        if original.is_empty() {
            return None;
        }
        let canonical = original.to_lowercase();
        Some(Self {
            original,
            canonical,
        })
    }

    /// Name as entered (case preserved)
    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Lower-cased form
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    fn normalize(input: &str) -> String {
        input.nfkc().collect::<String>().trim().to_string()
    }

    fn validate(canonical: &str) -> Result<(), UserNameError> {
        let length = canonical.chars().count();
        if length == 0 {
            return Err(UserNameError::Empty);
        }
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::TooShort {
                length,
                min: USER_NAME_MIN_LENGTH,
            });
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        for (position, ch) in canonical.chars().enumerate() {
            if !(ch.is_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&ch)) {
                return Err(UserNameError::InvalidCharacter { char: ch, position });
            }
        }

        let edges = [canonical.chars().next(), canonical.chars().next_back()];
        if let Some(ch) = edges.into_iter().flatten().find(|c| !c.is_alphanumeric()) {
            return Err(UserNameError::InvalidEdge { char: ch });
        }

        if RESERVED_WORDS.contains(&canonical) {
            return Err(UserNameError::Reserved {
                word: canonical.to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.original).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.original
    }
}
