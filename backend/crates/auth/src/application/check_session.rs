//! Check Session Use Case
//!
//! Turns a presented token into verified claims. Pure CPU work: signature,
//! issuer, expiry, then the revocation set. No database access.

use std::sync::Arc;

use crate::application::token::{TokenError, TokenService, now_secs};
use crate::domain::entity::session_claims::SessionClaims;
use crate::domain::repository::TokenDenylist;

/// Check session use case
#[derive(Clone)]
pub struct CheckSessionUseCase {
    tokens: Arc<TokenService>,
    denylist: Arc<dyn TokenDenylist>,
}

impl CheckSessionUseCase {
    pub fn new(tokens: Arc<TokenService>, denylist: Arc<dyn TokenDenylist>) -> Self {
        Self { tokens, denylist }
    }

    /// Verify against the current time
    pub fn execute(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.execute_at(token, now_secs())
    }

    pub fn execute_at(&self, token: &str, now: i64) -> Result<SessionClaims, TokenError> {
        let claims = self.tokens.verify_at(token, now)?;

        if self.denylist.is_revoked(&claims.jti) {
            return Err(TokenError::Revoked);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::token::ClaimsInput;
    use crate::domain::value_object::user_role::UserRole;
    use crate::infra::denylist::InMemoryTokenDenylist;
    use kernel::id::UserId;
    use std::time::Duration;

    fn setup() -> (CheckSessionUseCase, Arc<TokenService>, Arc<InMemoryTokenDenylist>) {
        let tokens = Arc::new(TokenService::new(b"secret", Duration::from_secs(60), "clinic-api"));
        let denylist = Arc::new(InMemoryTokenDenylist::new());
        let use_case = CheckSessionUseCase::new(tokens.clone(), denylist.clone());
        (use_case, tokens, denylist)
    }

    fn input() -> ClaimsInput {
        ClaimsInput {
            user_id: UserId::from_raw(3),
            role: UserRole::Coordinador,
            reference_id: None,
        }
    }

    #[test]
    fn test_valid_then_revoked() {
        let (use_case, tokens, denylist) = setup();
        let issued = tokens.issue(&input()).unwrap();

        assert_eq!(use_case.execute(&issued.token), Ok(issued.claims.clone()));

        denylist.revoke(issued.claims.jti, issued.claims.expires_at);
        assert_eq!(use_case.execute(&issued.token), Err(TokenError::Revoked));
    }

    #[test]
    fn test_expired_reported_before_revocation() {
        let (use_case, tokens, _) = setup();
        let issued = tokens.issue_at(&input(), 1_000).unwrap();
        assert_eq!(
            use_case.execute_at(&issued.token, 1_061),
            Err(TokenError::Expired)
        );
    }
}
