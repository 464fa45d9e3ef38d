//! Value Object Module

pub mod email;
pub mod login_identifier;
pub mod user_name;
pub mod user_password;
pub mod user_role;
