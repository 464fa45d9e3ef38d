//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::id::UserId;
use std::sync::Arc;

use platform::cookie::{delete_cookie_header, set_cookie_header};

use crate::application::config::AuthConfig;
use crate::application::{
    CheckSessionUseCase, ProfileUseCase, SignInUseCase, SignOutUseCase, SignUpUseCase,
    TokenService,
};
use crate::domain::repository::{CredentialStore, TokenDenylist};
use crate::domain::value_object::user_password::UserPassword;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginRequest, LoginResponse, MeResponse, MessageResponse, RegisterRequest, RegisterResponse,
    UserResponse,
};
use crate::presentation::extract::{ClientIp, JsonBody};
use crate::presentation::middleware::{CurrentUser, presented_token};

/// Shared state for auth handlers
pub struct AuthAppState<S>
where
    S: CredentialStore + Sync + 'static,
{
    pub store: Arc<S>,
    pub config: Arc<AuthConfig>,
    pub tokens: Arc<TokenService>,
    pub denylist: Arc<dyn TokenDenylist>,
    /// Hash verified when the identifier matches no user
    pub decoy: Arc<UserPassword>,
}

// Derive would require `S: Clone`
impl<S> Clone for AuthAppState<S>
where
    S: CredentialStore + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            tokens: self.tokens.clone(),
            denylist: self.denylist.clone(),
            decoy: self.decoy.clone(),
        }
    }
}

impl<S> AuthAppState<S>
where
    S: CredentialStore + Sync + 'static,
{
    /// Fails if the hashing parameters are unusable, so a bad configuration
    /// is caught at startup rather than on the first login.
    pub fn new(
        store: S,
        config: AuthConfig,
        denylist: Arc<dyn TokenDenylist>,
    ) -> AuthResult<Self> {
        let decoy = UserPassword::decoy(&config.hashing)?;
        let tokens = TokenService::from_config(&config);

        Ok(Self {
            store: Arc::new(store),
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            denylist,
            decoy: Arc::new(decoy),
        })
    }

    pub fn check_session(&self) -> CheckSessionUseCase {
        CheckSessionUseCase::new(self.tokens.clone(), self.denylist.clone())
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /auth/login
pub async fn login<S>(
    State(state): State<AuthAppState<S>>,
    ClientIp(client_ip): ClientIp,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AuthResult<Response>
where
    S: CredentialStore + Sync + 'static,
{
    let input = req.into_input()?;

    let use_case = SignInUseCase::new(
        state.store.clone(),
        state.config.clone(),
        state.tokens.clone(),
        state.decoy.clone(),
    );

    let output = match use_case.execute(input).await {
        Ok(output) => output,
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::info!(client_ip = %client_ip, "Login refused");
            }
            return Err(e);
        }
    };

    tracing::info!(
        user_id = %output.user.id,
        role = %output.user.role,
        client_ip = %client_ip,
        "Login succeeded"
    );

    let cookie = set_cookie_header(&state.config.cookie_config(), &output.token.token)
        .ok_or_else(|| AuthError::Internal("Token is not a valid cookie value".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful",
            token: output.token.token,
            user: UserResponse::from(&output.user),
        }),
    )
        .into_response())
}

// ============================================================================
// Register
// ============================================================================

/// POST /auth/register
pub async fn register<S>(
    State(state): State<AuthAppState<S>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<RegisterResponse>)>
where
    S: CredentialStore + Sync + 'static,
{
    let input = req.into_input()?;

    let use_case = SignUpUseCase::new(state.store.clone(), state.config.clone());
    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered",
            id: output.id,
        }),
    ))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /auth/logout
///
/// Always succeeds and always clears the cookie.
pub async fn logout<S>(State(state): State<AuthAppState<S>>, headers: HeaderMap) -> Response
where
    S: CredentialStore + Sync + 'static,
{
    let token = presented_token(&headers, &state.config.cookie_name);

    let use_case = SignOutUseCase::new(state.check_session(), state.denylist.clone());
    if use_case.execute(token.as_deref()).is_none() {
        tracing::debug!("Logout without a valid token");
    }

    let mut response = Json(MessageResponse {
        message: "Logged out",
    })
    .into_response();

    if let Some(cookie) = delete_cookie_header(&state.config.cookie_config()) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }

    response
}

// ============================================================================
// Profile (behind the gate)
// ============================================================================

/// GET /auth/me
pub async fn me<S>(
    State(state): State<AuthAppState<S>>,
    CurrentUser(claims): CurrentUser,
) -> AuthResult<Json<MeResponse>>
where
    S: CredentialStore + Sync + 'static,
{
    let user = ProfileUseCase::new(state.store.clone())
        .get(claims.user_id)
        .await?;

    Ok(Json(MeResponse {
        message: "Authenticated user",
        user: UserResponse::from(&user),
    }))
}

/// GET /users
pub async fn list_users<S>(
    State(state): State<AuthAppState<S>>,
    current: CurrentUser,
) -> AuthResult<Json<Vec<UserResponse>>>
where
    S: CredentialStore + Sync + 'static,
{
    current.require_role(UserRole::DIRECTORY_READERS)?;

    let users = ProfileUseCase::new(state.store.clone()).list().await?;

    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /users/{id}
pub async fn get_user<S>(
    State(state): State<AuthAppState<S>>,
    _current: CurrentUser,
    Path(raw_id): Path<String>,
) -> AuthResult<Json<UserResponse>>
where
    S: CredentialStore + Sync + 'static,
{
    let id = parse_user_id(&raw_id)?;

    let user = ProfileUseCase::new(state.store.clone()).get(id).await?;

    Ok(Json(UserResponse::from(&user)))
}

fn parse_user_id(raw: &str) -> AuthResult<UserId> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .map(UserId::from_raw)
        .ok_or_else(|| AuthError::Validation("Invalid user id".to_string()))
}
