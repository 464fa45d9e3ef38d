//! In-memory credential store for tests

use std::sync::Mutex;

use chrono::Utc;
use kernel::id::UserId;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<Vec<User>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row as-is, bypassing validation (legacy rows)
    pub fn seed(&self, user: User) {
        self.lock().push(user);
    }

    pub fn remove(&self, id: UserId) {
        self.lock().retain(|u| u.id != id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn find(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.lock().iter().find(|u| pred(u)).cloned()
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self.find(|u| u.email == *email))
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        Ok(self.find(|u| u.user_name.canonical() == user_name.canonical()))
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        Ok(self.find(|u| u.id == id))
    }

    async fn list(&self, limit: u32) -> AuthResult<Vec<User>> {
        let mut users = self.lock().clone();
        users.sort_by_key(|u| u.id.get());
        users.truncate(limit as usize);
        Ok(users)
    }

    async fn exists(&self, user_name: &UserName, email: &Email) -> AuthResult<bool> {
        Ok(self
            .find(|u| u.user_name.canonical() == user_name.canonical() || u.email == *email)
            .is_some())
    }

    async fn insert(&self, user: &NewUser) -> AuthResult<UserId> {
        let mut users = self.lock();
        let taken = users.iter().any(|u| {
            u.user_name.canonical() == user.user_name.canonical() || u.email == user.email
        });
        if taken {
            return Err(AuthError::AlreadyRegistered);
        }

        let next = users.iter().map(|u| u.id.get()).max().unwrap_or(0) + 1;
        let id = UserId::from_raw(next);
        users.push(user.clone().into_user(id, Utc::now()));
        Ok(id)
    }
}
