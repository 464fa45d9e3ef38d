//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer.

use kernel::id::UserId;
use uuid::Uuid;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::AuthResult;

/// Credential store (`usuarios` table)
#[trait_variant::make(CredentialStore: Send)]
pub trait LocalCredentialStore {
    /// Find user by email (already lower-cased)
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Find user by login name (case-insensitive)
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>>;

    /// Users ordered by id, at most `limit`
    async fn list(&self, limit: u32) -> AuthResult<Vec<User>>;

    /// Whether the login name or the email is already taken
    async fn exists(&self, user_name: &UserName, email: &Email) -> AuthResult<bool>;

    /// Insert and return the assigned id
    ///
    /// A unique-index violation must surface as
    /// [`AuthError::AlreadyRegistered`](crate::error::AuthError::AlreadyRegistered).
    async fn insert(&self, user: &NewUser) -> AuthResult<UserId>;
}

/// Revoked token ids, kept until the token would have expired anyway
///
/// Synchronous: the gate decision is made without awaiting.
pub trait TokenDenylist: Send + Sync {
    /// Revoke `jti` until `expires_at` (unix seconds)
    fn revoke(&self, jti: Uuid, expires_at: i64);

    fn is_revoked(&self, jti: &Uuid) -> bool;

    /// Drop entries whose token expired before `now`; returns how many
    fn prune(&self, now: i64) -> usize;
}
