//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases, token service, configuration
//! - `infra/` - MySQL credential store and the revocation set
//! - `presentation/` - HTTP handlers, DTOs, router, auth gate
//!
//! ## Features
//! - Login by user name or email, registration, logout
//! - Stateless HS256 session tokens in an http-only cookie or bearer header
//! - Role gate over the clinic roles (coordinador, admin, psicologo,
//!   becario, paciente)
//!
//! ## Security Model
//! - New passwords hashed with Argon2id; legacy bcrypt rows still verify
//! - Unknown accounts and wrong passwords are indistinguishable, down to
//!   the hashing work done
//! - Logged-out tokens are revoked until they expire (per process)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryTokenDenylist, MySqlCredentialStore};
pub use presentation::{AuthAppState, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
