//! User Password Value Object
//!
//! Domain wrapper around `platform::password`. Hashing and verification are
//! CPU-bound, so the async entry points move them onto the blocking pool.
//!
//! ## Usage
//! ```rust,ignore
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//! use platform::password::HashingParams;
//!
//! let raw = RawPassword::new("Secreta123".to_string())?;
//! let hashed = UserPassword::hash(raw, HashingParams::default(), None).await?;
//!
//! let attempt = RawPassword::for_login("Secreta123".to_string());
//! assert!(hashed.verify_blocking(attempt, None).await?);
//! ```

use platform::password::{
    ClearTextPassword, HashedPassword, HashingParams, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Password as typed by the user. Zeroized on drop.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Password being chosen at registration; the policy applies
    pub fn new(raw: String) -> AuthResult<Self> {
        ClearTextPassword::new(raw)
            .map(Self)
            .map_err(|e| AuthError::Validation(policy_message(&e)))
    }

    /// Password submitted at login; no policy, only normalisation
    pub fn for_login(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }
}

fn policy_message(err: &PasswordPolicyError) -> String {
    match err {
        PasswordPolicyError::EmptyOrWhitespace => "Password cannot be empty".to_string(),
        PasswordPolicyError::InvalidCharacter => "Password contains invalid characters".to_string(),
        other => other.to_string(),
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Stored password hash (`usuarios.contrasena`)
///
/// Never serialized; `Debug` prints a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash on the blocking pool
    pub async fn hash(
        raw: RawPassword,
        params: HashingParams,
        pepper: Option<Vec<u8>>,
    ) -> AuthResult<Self> {
        let hashed = tokio::task::spawn_blocking(move || raw.0.hash(&params, pepper.as_deref()))
            .await?
            .map_err(hash_error)?;
        Ok(Self(hashed))
    }

    /// Hash of a random secret, used when the account does not exist
    pub fn decoy(params: &HashingParams) -> AuthResult<Self> {
        HashedPassword::decoy(params).map(Self).map_err(hash_error)
    }

    /// Wrap the stored column value
    pub fn from_stored(stored: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored(stored))
    }

    /// Column value for storage
    pub fn as_stored(&self) -> &str {
        self.0.as_str()
    }

    /// Hash written by the previous backend (bcrypt)
    pub fn is_legacy(&self) -> bool {
        self.0.is_legacy()
    }

    /// Synchronous verification; prefer [`verify_blocking`](Self::verify_blocking)
    /// from async code
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(&raw.0, pepper)
    }

    /// Verify on the blocking pool
    ///
    /// If the calling future is dropped the computation still runs to the
    /// end and its result is discarded.
    pub async fn verify_blocking(
        &self,
        raw: RawPassword,
        pepper: Option<Vec<u8>>,
    ) -> AuthResult<bool> {
        let hash = self.clone();
        let valid =
            tokio::task::spawn_blocking(move || hash.verify(&raw, pepper.as_deref())).await?;
        Ok(valid)
    }
}

fn hash_error(err: PasswordHashError) -> AuthError {
    AuthError::Internal(err.to_string())
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_errors_become_validation() {
        let err = RawPassword::new("short".to_string()).unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref m) if m.contains("at least 8")));

        let err = RawPassword::new("   ".to_string()).unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "Password cannot be empty"));
    }

    #[test]
    fn test_login_password_has_no_policy() {
        let _ = RawPassword::for_login("x".to_string());
    }

    #[tokio::test]
    async fn test_hash_then_verify_blocking() {
        let raw = RawPassword::new("Secreta123".to_string()).unwrap();
        let hashed = UserPassword::hash(raw, HashingParams::minimal(), Some(b"p".to_vec()))
            .await
            .unwrap();

        let good = RawPassword::for_login("Secreta123".to_string());
        assert!(hashed.verify_blocking(good, Some(b"p".to_vec())).await.unwrap());

        let bad = RawPassword::for_login("wrong".to_string());
        assert!(!hashed.verify_blocking(bad, Some(b"p".to_vec())).await.unwrap());
    }

    #[test]
    fn test_debug_redacted() {
        let stored = UserPassword::from_stored("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA");
        assert!(!format!("{stored:?}").contains("argon2id"));
        assert!(!stored.is_legacy());
        assert!(format!("{:?}", RawPassword::for_login("hunter22".into())).contains("REDACTED"));
    }
}
