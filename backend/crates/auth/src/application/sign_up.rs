//! Sign Up Use Case
//!
//! Registers a new credential record.

use std::sync::Arc;

use kernel::id::{ReferenceId, UserId};

use crate::application::config::AuthConfig;
use crate::domain::entity::user::NewUser;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input (fields already checked for presence)
pub struct SignUpInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub reference_id: Option<i64>,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub id: UserId,
}

/// Sign up use case
pub struct SignUpUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SignUpUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let user_name =
            UserName::new(&input.user_name).map_err(|e| AuthError::Validation(e.to_string()))?;
        let email = Email::new(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;
        let role = UserRole::from_code(&input.role)
            .ok_or_else(|| AuthError::Validation(format!("Invalid role: {}", input.role.trim())))?;
        let password = RawPassword::new(input.password)?;

        if self.store.exists(&user_name, &email).await? {
            return Err(AuthError::AlreadyRegistered);
        }

        // No connection is held while hashing
        let password = UserPassword::hash(
            password,
            self.config.hashing,
            self.config.password_pepper.clone(),
        )
        .await?;

        let new_user = NewUser {
            user_name,
            email,
            password,
            role,
            reference_id: input.reference_id.map(ReferenceId::from_raw),
        };

        let id = self.store.insert(&new_user).await?;

        tracing::info!(user_id = %id, role = %role, "User registered");

        Ok(SignUpOutput { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryCredentialStore;
    use platform::password::HashingParams;

    fn use_case() -> (SignUpUseCase<MemoryCredentialStore>, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        let config = Arc::new(AuthConfig {
            hashing: HashingParams::minimal(),
            ..AuthConfig::development()
        });
        (SignUpUseCase::new(store.clone(), config), store)
    }

    fn input(name: &str, email: &str) -> SignUpInput {
        SignUpInput {
            user_name: name.to_string(),
            email: email.to_string(),
            password: "Secreta123".to_string(),
            role: "Paciente".to_string(),
            reference_id: Some(12),
        }
    }

    #[tokio::test]
    async fn test_sign_up_stores_hashed_password() {
        let (use_case, store) = use_case();
        let out = use_case.execute(input("ana", "Ana@Example.com")).await.unwrap();

        let user = store.find_by_id(out.id).await.unwrap().unwrap();
        assert_eq!(user.email.as_str(), "ana@example.com");
        assert_eq!(user.role, UserRole::Paciente);
        assert_eq!(user.reference_id, Some(ReferenceId::from_raw(12)));
        assert!(user.password.as_stored().starts_with("$argon2id$"));
        assert!(!user.password.as_stored().contains("Secreta123"));
    }

    #[tokio::test]
    async fn test_duplicates_rejected() {
        let (use_case, _) = use_case();
        use_case.execute(input("ana", "ana@example.com")).await.unwrap();

        let same_name = use_case.execute(input("ANA", "other@example.com")).await;
        assert!(matches!(same_name, Err(AuthError::AlreadyRegistered)));

        let same_email = use_case.execute(input("other", "ANA@example.com")).await;
        assert!(matches!(same_email, Err(AuthError::AlreadyRegistered)));
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let (use_case, _) = use_case();

        let bad_email = use_case.execute(input("ana", "not-an-email")).await;
        assert!(matches!(bad_email, Err(AuthError::Validation(ref m)) if m == "Invalid email format"));

        let mut bad_role = input("ana", "ana@example.com");
        bad_role.role = "director".to_string();
        assert!(matches!(
            use_case.execute(bad_role).await,
            Err(AuthError::Validation(ref m)) if m == "Invalid role: director"
        ));

        let mut weak = input("ana", "ana@example.com");
        weak.password = "12345678".to_string();
        assert!(matches!(use_case.execute(weak).await, Err(AuthError::Validation(_))));
    }
}
