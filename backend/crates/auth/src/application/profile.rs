//! Profile Use Case
//!
//! Read-only access to credential records for authenticated callers.

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entity::user::User;
use crate::domain::repository::CredentialStore;
use crate::error::{AuthError, AuthResult};

/// Upper bound on rows returned by the user listing
pub const USER_LIST_LIMIT: u32 = 1000;

pub struct ProfileUseCase<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
}

impl<S> ProfileUseCase<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The user behind a token. The row may have been deleted since the
    /// token was issued.
    pub async fn get(&self, id: UserId) -> AuthResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn list(&self) -> AuthResult<Vec<User>> {
        self.store.list(USER_LIST_LIMIT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        email::Email, user_name::UserName, user_password::UserPassword, user_role::UserRole,
    };
    use crate::infra::memory::MemoryCredentialStore;

    fn user(id: i64) -> User {
        User {
            id: UserId::from_raw(id),
            user_name: UserName::from_db(&format!("user{id}")),
            email: Email::from_db(format!("user{id}@example.com")),
            password: UserPassword::from_stored("x"),
            role: UserRole::Paciente,
            reference_id: None,
            registered_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_and_missing() {
        let store = Arc::new(MemoryCredentialStore::new());
        store.seed(user(1));
        let use_case = ProfileUseCase::new(store);

        assert_eq!(use_case.get(UserId::from_raw(1)).await.unwrap().id.get(), 1);
        assert!(matches!(
            use_case.get(UserId::from_raw(2)).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_is_capped() {
        let store = Arc::new(MemoryCredentialStore::new());
        for id in (1..=1005).rev() {
            store.seed(user(id));
        }
        let users = ProfileUseCase::new(store).list().await.unwrap();
        assert_eq!(users.len(), USER_LIST_LIMIT as usize);
        assert_eq!(users[0].id.get(), 1);
    }
}
