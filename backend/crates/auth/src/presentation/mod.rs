//! Presentation Layer
//!
//! HTTP handlers, DTOs, extractors, router, and the auth gate.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{CurrentUser, GateDecision, evaluate_gate, require_auth};
pub use router::auth_router;
