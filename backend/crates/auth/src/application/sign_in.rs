//! Sign In Use Case
//!
//! Authenticates a user by user name or email and issues a session token.
//!
//! Unknown accounts and wrong passwords take the same path: one lookup, one
//! hash verification (against a decoy when there is no row), one error.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::{ClaimsInput, IssuedToken, TokenService};
use crate::domain::entity::user::User;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    login_identifier::LoginIdentifier,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    /// User name or email
    pub identifier: String,
    /// Password
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub token: IssuedToken,
    pub user: User,
}

/// Sign in use case
pub struct SignInUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
    tokens: Arc<TokenService>,
    decoy: Arc<UserPassword>,
}

impl<S> SignInUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(
        store: Arc<S>,
        config: Arc<AuthConfig>,
        tokens: Arc<TokenService>,
        decoy: Arc<UserPassword>,
    ) -> Self {
        Self {
            store,
            config,
            tokens,
            decoy,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let password = RawPassword::for_login(input.password);

        let found = match LoginIdentifier::parse(&input.identifier) {
            Some(LoginIdentifier::Email(email)) => self.store.find_by_email(&email).await,
            Some(LoginIdentifier::UserName(name)) => self.store.find_by_user_name(&name).await,
            None => Ok(None),
        };

        let user = match found {
            Ok(user) => user,
            // Answered exactly like an unknown account
            Err(AuthError::UnreadableRow(reason)) => {
                tracing::error!(reason = %reason, "Stored user row cannot sign in");
                None
            }
            Err(e) => return Err(e),
        };

        let pepper = self.config.password_pepper.clone();

        let Some(user) = user else {
            // Same work as a real Argon2id verification
            let _ = self.decoy.verify_blocking(password, pepper).await?;
            return Err(AuthError::InvalidCredentials);
        };

        // Legacy bcrypt rows ignore the pepper inside `verify`. They also run
        // at bcrypt's cost rather than the decoy's, so their failures are not
        // timed like an unknown account's.
        if !user.password.verify_blocking(password, pepper).await? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if user.password.is_legacy() {
            tracing::info!(user_id = %user.id, "User still has a legacy bcrypt hash");
        }

        let token = self.tokens.issue(&ClaimsInput::from(&user))?;

        tracing::debug!(
            user_id = %user.id,
            jti = %token.claims.jti,
            "Token issued"
        );

        Ok(SignInOutput { token, user })
    }
}
