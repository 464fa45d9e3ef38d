//! API DTOs (Data Transfer Objects)
//!
//! Request fields accept the names used by the clinic front ends
//! (`correo`/`contrasena`, `usuario`/`contrasena`, `email`/`password`).
//! Every field is optional at the serde level so absent fields produce the
//! "Missing required field(s)" message instead of a deserializer error.
//!
//! Request types deliberately do not implement `Debug`.

use kernel::id::{ReferenceId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::{SignInInput, SignUpInput};
use crate::domain::entity::user::User;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Trimmed, non-empty text
fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Non-empty; passwords are not trimmed
fn present_password(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

// ============================================================================
// Login
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    /// User name or email
    #[serde(default, alias = "correo", alias = "usuario", alias = "email")]
    pub identifier: Option<String>,
    #[serde(default, alias = "contrasena")]
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn into_input(self) -> AuthResult<SignInInput> {
        let mut missing = Vec::new();
        if !present(&self.identifier) {
            missing.push("identifier");
        }
        if !present_password(&self.password) {
            missing.push("password");
        }

        match (self.identifier, self.password) {
            (Some(identifier), Some(password)) if missing.is_empty() => Ok(SignInInput {
                identifier: identifier.trim().to_string(),
                password,
            }),
            _ => Err(AuthError::MissingFields(missing)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    /// Same value as the cookie, for bearer clients
    pub token: String,
    pub user: UserResponse,
}

// ============================================================================
// Register
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    /// Login name
    #[serde(default, alias = "usuario", alias = "user_name")]
    pub identifier: Option<String>,
    #[serde(default, alias = "correo")]
    pub email: Option<String>,
    #[serde(default, alias = "contrasena")]
    pub password: Option<String>,
    #[serde(default, alias = "rol")]
    pub role: Option<String>,
    #[serde(default, alias = "id_referencia")]
    pub reference_id: Option<i64>,
}

impl RegisterRequest {
    pub fn into_input(self) -> AuthResult<SignUpInput> {
        let mut missing = Vec::new();
        if !present(&self.identifier) {
            missing.push("identifier");
        }
        if !present(&self.email) {
            missing.push("email");
        }
        if !present_password(&self.password) {
            missing.push("password");
        }
        if !present(&self.role) {
            missing.push("role");
        }

        match (self.identifier, self.email, self.password, self.role) {
            (Some(user_name), Some(email), Some(password), Some(role)) if missing.is_empty() => {
                Ok(SignUpInput {
                    user_name,
                    email,
                    password,
                    role,
                    reference_id: self.reference_id,
                })
            }
            _ => Err(AuthError::MissingFields(missing)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub id: UserId,
}

// ============================================================================
// Users
// ============================================================================

/// Sanitized user. There is no password field to leak.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<ReferenceId>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.user_name.original().to_string(),
            email: user.email.as_str().to_string(),
            role: user.role,
            reference_id: user.reference_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub message: &'static str,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
