//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every other crate agrees on:
//! - The unified error type, its classification and result alias
//! - Typed integer IDs for database rows
//!
//! Only things whose meaning is identical across the API belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
