//! Token Issuer / Verifier
//!
//! Session tokens are HS256 JWTs. Expiry is checked here against an explicit
//! clock instead of inside `jsonwebtoken`, so the boundary is exact and
//! testable: a token verified at `exp` is accepted, at `exp + 1` rejected.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use kernel::id::{ReferenceId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::{session_claims::SessionClaims, user::User};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Why a token was refused. Logged only; clients always see "Invalid token".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token issuer is not accepted")]
    WrongIssuer,
    #[error("token has expired")]
    Expired,
    #[error("token has been revoked")]
    Revoked,
}

/// What goes into a new token
#[derive(Debug, Clone)]
pub struct ClaimsInput {
    pub user_id: UserId,
    pub role: UserRole,
    pub reference_id: Option<ReferenceId>,
}

impl From<&User> for ClaimsInput {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            reference_id: user.reference_id,
        }
    }
}

/// A freshly signed token and its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// JWT payload as it travels
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference_id: Option<i64>,
    iat: i64,
    exp: i64,
    jti: Uuid,
    iss: String,
}

/// Signs and verifies session tokens
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
    issuer: String,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
            issuer,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl, config.issuer.clone())
    }

    /// Issue a token valid from now
    pub fn issue(&self, input: &ClaimsInput) -> AuthResult<IssuedToken> {
        self.issue_at(input, now_secs())
    }

    /// Issue a token as if the current time were `now` (unix seconds)
    pub fn issue_at(&self, input: &ClaimsInput, now: i64) -> AuthResult<IssuedToken> {
        let claims = SessionClaims {
            user_id: input.user_id,
            role: input.role,
            reference_id: input.reference_id,
            issued_at: now,
            expires_at: now.saturating_add(self.ttl_secs),
            jti: Uuid::new_v4(),
        };

        let wire = WireClaims {
            sub: claims.user_id.to_string(),
            role: claims.role,
            reference_id: claims.reference_id.map(|id| id.get()),
            iat: claims.issued_at,
            exp: claims.expires_at,
            jti: claims.jti,
            iss: self.issuer.clone(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {e}")))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify against the current time
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, now_secs())
    }

    /// Verify as if the current time were `now` (unix seconds)
    pub fn verify_at(&self, token: &str, now: i64) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidIssuer => TokenError::WrongIssuer,
                _ => TokenError::Malformed,
            })?;

        let wire = data.claims;
        let user_id = wire
            .sub
            .parse::<i64>()
            .map(UserId::from_raw)
            .map_err(|_| TokenError::Malformed)?;

        let claims = SessionClaims {
            user_id,
            role: wire.role,
            reference_id: wire.reference_id.map(ReferenceId::from_raw),
            issued_at: wire.iat,
            expires_at: wire.exp,
            jti: wire.jti,
        };

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Current unix time in seconds
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
