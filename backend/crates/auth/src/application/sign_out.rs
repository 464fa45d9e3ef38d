//! Sign Out Use Case
//!
//! Revokes the presented token for the rest of its lifetime. Without a valid
//! token there is nothing to revoke; the caller still clears the cookie.

use std::sync::Arc;

use crate::application::check_session::CheckSessionUseCase;
use crate::domain::entity::session_claims::SessionClaims;
use crate::domain::repository::TokenDenylist;

/// Sign out use case
pub struct SignOutUseCase {
    check: CheckSessionUseCase,
    denylist: Arc<dyn TokenDenylist>,
}

impl SignOutUseCase {
    pub fn new(check: CheckSessionUseCase, denylist: Arc<dyn TokenDenylist>) -> Self {
        Self { check, denylist }
    }

    /// Returns the revoked claims, if the token was valid
    pub fn execute(&self, token: Option<&str>) -> Option<SessionClaims> {
        let claims = self.check.execute(token?).ok()?;
        self.denylist.revoke(claims.jti, claims.expires_at);

        tracing::info!(
            user_id = %claims.user_id,
            jti = %claims.jti,
            "User signed out"
        );
        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::token::{ClaimsInput, TokenError, TokenService};
    use crate::domain::value_object::user_role::UserRole;
    use crate::infra::denylist::InMemoryTokenDenylist;
    use kernel::id::UserId;
    use std::time::Duration;

    #[test]
    fn test_sign_out_revokes() {
        let tokens = Arc::new(TokenService::new(b"k", Duration::from_secs(60), "clinic-api"));
        let denylist = Arc::new(InMemoryTokenDenylist::new());
        let check = CheckSessionUseCase::new(tokens.clone(), denylist.clone());
        let use_case = SignOutUseCase::new(check.clone(), denylist.clone());

        let issued = tokens
            .issue(&ClaimsInput {
                user_id: UserId::from_raw(1),
                role: UserRole::Admin,
                reference_id: None,
            })
            .unwrap();

        assert!(use_case.execute(Some(&issued.token)).is_some());
        assert_eq!(check.execute(&issued.token), Err(TokenError::Revoked));
        // Second sign out finds nothing valid
        assert!(use_case.execute(Some(&issued.token)).is_none());
        assert!(use_case.execute(None).is_none());
        assert!(use_case.execute(Some("garbage")).is_none());
        assert_eq!(denylist.len(), 1);
    }
}
