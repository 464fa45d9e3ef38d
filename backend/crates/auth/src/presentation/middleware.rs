//! Auth Middleware
//!
//! The gate in front of protected routes. The decision itself is
//! [`evaluate_gate`], a synchronous function over the request headers; the
//! middleware only turns it into a response or request extension.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::CheckSessionUseCase;
use crate::domain::entity::session_claims::SessionClaims;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};
use crate::presentation::handlers::AuthAppState;

/// Outcome of looking at a request's credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Neither the cookie nor a bearer header carried a token
    NoToken,
    /// A token was presented and refused
    Invalid,
    Valid(SessionClaims),
}

/// Token presented by the client: the cookie first, then the bearer header
pub fn presented_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    platform::cookie::extract_cookie(headers, cookie_name)
        .or_else(|| platform::cookie::extract_bearer_token(headers))
}

pub fn evaluate_gate(
    headers: &HeaderMap,
    cookie_name: &str,
    check: &CheckSessionUseCase,
) -> GateDecision {
    let Some(token) = presented_token(headers, cookie_name) else {
        return GateDecision::NoToken;
    };

    match check.execute(&token) {
        Ok(claims) => GateDecision::Valid(claims),
        Err(reason) => {
            tracing::debug!(reason = %reason, "Token refused");
            GateDecision::Invalid
        }
    }
}

/// Middleware that requires a valid token
///
/// On success the verified [`SessionClaims`] are available to handlers via
/// [`CurrentUser`].
pub async fn require_auth<S>(
    State(state): State<AuthAppState<S>>,
    mut req: Request,
    next: Next,
) -> Response
where
    S: CredentialStore + Sync + 'static,
{
    let decision = evaluate_gate(
        req.headers(),
        &state.config.cookie_name,
        &state.check_session(),
    );

    match decision {
        GateDecision::NoToken => AuthError::NoToken.into_response(),
        GateDecision::Invalid => AuthError::InvalidToken.into_response(),
        GateDecision::Valid(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
    }
}

/// Claims of the authenticated caller
///
/// Only usable behind [`require_auth`]; elsewhere it rejects with
/// "No token provided".
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionClaims);

impl CurrentUser {
    /// Role gate. Reads the role from the verified claims only.
    pub fn require_role(&self, allowed: &[UserRole]) -> AuthResult<()> {
        if self.0.has_role(allowed) {
            Ok(())
        } else {
            tracing::debug!(user_id = %self.0.user_id, role = %self.0.role, "Role refused");
            Err(AuthError::RoleForbidden)
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::NoToken)
    }
}
