//! Infrastructure Layer
//!
//! Database implementations and the process-local revocation set.

pub mod denylist;
#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use denylist::InMemoryTokenDenylist;
pub use mysql::MySqlCredentialStore;
