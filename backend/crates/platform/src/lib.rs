//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, legacy bcrypt verification)
//! - Cookie and bearer-token extraction
//! - Client identification for logs
//! - Environment configuration helpers
//! - Random token generation

pub mod client;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod password;
