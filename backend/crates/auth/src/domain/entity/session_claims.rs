//! Session Claims
//!
//! The verified content of a token. Lives in request extensions for the
//! duration of a gated request; never persisted.

use kernel::id::{ReferenceId, UserId};
use uuid::Uuid;

use crate::domain::value_object::user_role::UserRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: UserId,
    pub role: UserRole,
    pub reference_id: Option<ReferenceId>,
    /// Unix seconds
    pub issued_at: i64,
    /// Unix seconds; the token is still valid at exactly this second
    pub expires_at: i64,
    /// Token id, used by the revocation set
    pub jti: Uuid,
}

impl SessionClaims {
    #[inline]
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at
    }

    #[inline]
    pub fn has_role(&self, allowed: &[UserRole]) -> bool {
        allowed.contains(&self.role)
    }
}
