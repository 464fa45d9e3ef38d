//! User Entity
//!
//! A row of the `usuarios` table.

use chrono::{DateTime, Utc};
use kernel::id::{ReferenceId, UserId};

use crate::domain::value_object::{
    email::Email, user_name::UserName, user_password::UserPassword, user_role::UserRole,
};

/// Credential record
///
/// `password` never leaves the crate in a response; its `Debug` is redacted.
#[derive(Debug, Clone)]
pub struct User {
    /// Assigned by the database, immutable
    pub id: UserId,
    /// Login name (unique)
    pub user_name: UserName,
    /// Lower-cased email (unique)
    pub email: Email,
    pub password: UserPassword,
    pub role: UserRole,
    /// Role-specific profile row (patient, intern...), when linked
    pub reference_id: Option<ReferenceId>,
    pub registered_at: Option<DateTime<Utc>>,
}

/// User about to be inserted; the id comes back from the store
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: UserName,
    pub email: Email,
    pub password: UserPassword,
    pub role: UserRole,
    pub reference_id: Option<ReferenceId>,
}

impl NewUser {
    /// Attach the id assigned by the store
    pub fn into_user(self, id: UserId, registered_at: DateTime<Utc>) -> User {
        User {
            id,
            user_name: self.user_name,
            email: self.email,
            password: self.password,
            role: self.role,
            reference_id: self.reference_id,
            registered_at: Some(registered_at),
        }
    }
}
