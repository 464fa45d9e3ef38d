//! Password Hashing and Verification
//!
//! NIST SP 800-63B compliant password handling with:
//! - Argon2id hashing with a configurable work factor
//! - Verification of legacy bcrypt hashes
//! - Zeroization of sensitive data
//! - Constant-time comparison (delegated to `argon2` / `bcrypt`)
//!
//! ## Security Features
//! - Memory-hard hashing prevents GPU/ASIC attacks
//! - Zeroization prevents memory inspection attacks
//! - Pepper support for additional security layer
//! - A decoy hash lets callers spend the same CPU time on unknown accounts

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{random_bytes, to_base64_url};

// ============================================================================
// Constants (NIST SP 800-63B compliant)
// ============================================================================

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Prefixes used by bcrypt implementations (bcryptjs writes `$2a$` / `$2b$`)
const BCRYPT_PREFIXES: &[&str] = &["$2a$", "$2b$", "$2x$", "$2y$"];

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Work factor parameters rejected by Argon2
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),
}

// ============================================================================
// Hashing parameters
// ============================================================================

/// Argon2id work factor
///
/// Defaults follow the OWASP recommendation (m=19456 KiB, t=2, p=1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashingParams {
    /// Cheapest parameters Argon2 accepts. Tests only.
    pub const fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: 1,
            parallelism: 1,
        }
    }

    /// Check the parameters and build the Argon2 context
    pub fn argon2(&self) -> Result<Argon2<'static>, PasswordHashError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password with policy validation
    ///
    /// Used when a password is *chosen* (registration). Validates against
    /// NIST SP 800-63B requirements:
    /// - Minimum 8 characters
    /// - Maximum 128 characters
    /// - No control characters
    /// - Not empty/whitespace only
    ///
    /// Unicode is normalized using NFKC before validation.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized = Self::normalize(raw);

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // NIST: count Unicode code points, not bytes
        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(&normalized) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(Self(normalized))
    }

    /// Create a password that is only going to be *compared* (login)
    ///
    /// No policy is applied: a policy failure must look exactly like a
    /// wrong password to the caller.
    pub fn for_verification(raw: String) -> Self {
        Self(Self::normalize(raw))
    }

    fn normalize(mut raw: String) -> String {
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        normalized
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Vec<u8> {
        let mut bytes = self.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        bytes
    }

    /// Hash the password using Argon2id
    ///
    /// ## Arguments
    /// * `params` - Work factor
    /// * `pepper` - Optional application-wide secret
    ///
    /// ## Returns
    /// PHC-formatted hash string wrapped in `HashedPassword`
    pub fn hash(
        &self,
        params: &HashingParams,
        pepper: Option<&[u8]>,
    ) -> Result<HashedPassword, PasswordHashError> {
        let mut password_bytes = self.peppered(pepper);

        // 128-bit random salt
        let salt = SaltString::generate(&mut OsRng);

        let result = params
            .argon2()?
            .hash_password(&password_bytes, &salt)
            .map(|hash| HashedPassword {
                hash: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));

        password_bytes.zeroize();
        result
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Stored password hash
///
/// Either an Argon2id PHC string (written by this service) or a bcrypt hash
/// (written by the previous backend). The string is opaque to callers.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Wrap a stored hash without parsing it
    ///
    /// A malformed value is not an error here: [`verify`](Self::verify)
    /// fails closed on it, so a corrupt row behaves like a wrong password.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    /// Decoy hash of a random secret
    ///
    /// Verifying against it costs the same as verifying against a real
    /// hash with the same params, and never succeeds.
    pub fn decoy(params: &HashingParams) -> Result<Self, PasswordHashError> {
        ClearTextPassword::for_verification(to_base64_url(&random_bytes(32))).hash(params, None)
    }

    /// Get the stored string
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Whether this is a bcrypt hash from the previous backend
    pub fn is_legacy(&self) -> bool {
        BCRYPT_PREFIXES.iter().any(|p| self.hash.starts_with(p))
    }

    /// Verify a password against this hash
    ///
    /// Comparison is constant-time inside `argon2` / `bcrypt`. Any parse
    /// failure returns `false`.
    ///
    /// ## Arguments
    /// * `password` - The clear text password to verify
    /// * `pepper` - Must match the pepper used during hashing (ignored for
    ///   legacy bcrypt hashes, which were never peppered)
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        if self.is_legacy() {
            return match bcrypt::verify(password.as_bytes(), &self.hash) {
                Ok(valid) => valid,
                Err(e) => {
                    tracing::warn!(error = %e, "Stored bcrypt hash could not be parsed");
                    false
                }
            };
        }

        let parsed_hash = match PasswordHash::new(&self.hash) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                return false;
            }
        };

        let mut password_bytes = password.peppered(pepper);

        // Parameters are read from the PHC string itself
        let valid = Argon2::default()
            .verify_password(&password_bytes, &parsed_hash)
            .is_ok();

        password_bytes.zeroize();
        valid
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check for common weak patterns
fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    // All the same character (e.g. "aaaaaaaa")
    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];

    if KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "contrasena",
        "contraseña",
        "12345678",
        "123456789",
        "1234567890",
        "abcdefgh",
        "letmein",
        "welcome",
        "admin123",
        "iloveyou",
        "bienvenido",
        "football",
        "futbol123",
        "trustno1",
    ];

    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Whole string is an ascending or descending run of digits
fn is_sequential_numbers(s: &str) -> bool {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() < 4 {
        return false;
    }

    let is_ascending = digits
        .windows(2)
        .all(|w| w[1] == (w[0] + 1) % 10);
    let is_descending = digits
        .windows(2)
        .all(|w| w[0] == (w[1] + 1) % 10);

    is_ascending || is_descending
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CHEAP: HashingParams = HashingParams::minimal();

    #[test]
    fn test_password_too_short() {
        let result = ClearTextPassword::new("short".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::TooShort { .. })));
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a1".repeat(MAX_PASSWORD_LENGTH);
        let result = ClearTextPassword::new(long_password);
        assert!(matches!(result, Err(PasswordPolicyError::TooLong { .. })));
    }

    #[test]
    fn test_password_whitespace_only() {
        let result = ClearTextPassword::new("        ".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_control_character() {
        let result = ClearTextPassword::new("Secreta\u{0007}123".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::InvalidCharacter)));
    }

    #[test]
    fn test_password_common_pattern() {
        for weak in ["password123", "qwertyuiop", "12345678", "aaaaaaaaaa", "98765432"] {
            let result = ClearTextPassword::new(weak.to_string());
            assert!(
                matches!(result, Err(PasswordPolicyError::CommonPattern)),
                "{weak} should be rejected"
            );
        }
    }

    #[test]
    fn test_valid_passwords() {
        assert!(ClearTextPassword::new("Secreta123".to_string()).is_ok());
        assert!(ClearTextPassword::new("MySecure#Pass2024!".to_string()).is_ok());
        assert!(ClearTextPassword::new("contraseña segura".to_string()).is_ok());
    }

    #[test]
    fn test_for_verification_skips_policy() {
        let password = ClearTextPassword::for_verification("wrong".to_string());
        assert_eq!(password.as_bytes(), b"wrong");
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new("Secreta123".to_string()).unwrap();
        let hashed = password.hash(&CHEAP, None).unwrap();
        assert!(hashed.as_str().starts_with("$argon2id$"));

        assert!(hashed.verify(&password, None));

        let wrong = ClearTextPassword::for_verification("Secreta124".to_string());
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_hash_is_salted() {
        let password = ClearTextPassword::new("Secreta123".to_string()).unwrap();
        let a = password.hash(&CHEAP, None).unwrap();
        let b = password.hash(&CHEAP, None).unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_hash_with_pepper() {
        let password = ClearTextPassword::new("TestPassword123!".to_string()).unwrap();
        let pepper = b"my_secret_pepper";
        let hashed = password.hash(&CHEAP, Some(pepper)).unwrap();

        assert!(hashed.verify(&password, Some(pepper)));
        assert!(!hashed.verify(&password, None));
        assert!(!hashed.verify(&password, Some(b"wrong_pepper")));
    }

    #[test]
    fn test_params_are_embedded_in_hash() {
        let params = HashingParams {
            memory_kib: 4096,
            iterations: 3,
            parallelism: 1,
        };
        let password = ClearTextPassword::new("Secreta123".to_string()).unwrap();
        let hashed = password.hash(&params, None).unwrap();

        assert!(hashed.as_str().contains("m=4096,t=3,p=1"));
        // Verification reads the params from the hash, not from defaults
        assert!(hashed.verify(&password, None));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = HashingParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            params.argon2(),
            Err(PasswordHashError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_malformed_hash_fails_closed() {
        let password = ClearTextPassword::for_verification("Secreta123".to_string());
        assert!(!HashedPassword::from_stored("not_a_valid_hash").verify(&password, None));
        assert!(!HashedPassword::from_stored("").verify(&password, None));
        assert!(!HashedPassword::from_stored("$2b$10$short").verify(&password, None));
    }

    #[test]
    fn test_legacy_bcrypt_hash() {
        let stored = bcrypt::hash("Secreta123", 4).unwrap();
        let hashed = HashedPassword::from_stored(stored);
        assert!(hashed.is_legacy());

        let right = ClearTextPassword::for_verification("Secreta123".to_string());
        let wrong = ClearTextPassword::for_verification("wrong".to_string());
        assert!(hashed.verify(&right, Some(b"pepper is ignored")));
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_decoy_never_matches() {
        let decoy = HashedPassword::decoy(&CHEAP).unwrap();
        assert!(decoy.as_str().starts_with("$argon2id$"));
        assert!(!decoy.is_legacy());

        let guess = ClearTextPassword::for_verification(String::new());
        assert!(!decoy.verify(&guess, None));

        // Each decoy hashes its own random secret
        assert_ne!(decoy.as_str(), HashedPassword::decoy(&CHEAP).unwrap().as_str());
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::for_verification("secret".to_string());
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));

        let hashed = HashedPassword::from_stored("$argon2id$v=19$m=8,t=1,p=1$abc$def");
        assert!(!format!("{:?}", hashed).contains("argon2id"));
    }
}
