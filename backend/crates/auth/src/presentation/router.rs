//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::repository::CredentialStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_auth;

/// Create the auth router for any credential store
///
/// `/auth/login`, `/auth/register` and `/auth/logout` are public; every other
/// route passes through [`require_auth`] first.
pub fn auth_router<S>(state: AuthAppState<S>) -> Router
where
    S: CredentialStore + Sync + 'static,
{
    let protected = Router::new()
        .route("/auth/me", get(handlers::me::<S>))
        .route("/users", get(handlers::list_users::<S>))
        .route("/users/{id}", get(handlers::get_user::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<S>,
        ));

    Router::new()
        .route("/auth/login", post(handlers::login::<S>))
        .route("/auth/register", post(handlers::register::<S>))
        .route("/auth/logout", post(handlers::logout::<S>))
        .merge(protected)
        .with_state(state)
}
