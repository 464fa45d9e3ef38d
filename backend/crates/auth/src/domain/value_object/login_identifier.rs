//! Login Identifier
//!
//! What the user typed in the "user or email" box.

use derive_more::Display;

use super::{email::Email, user_name::UserName};

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(Email),
    UserName(UserName),
}

impl LoginIdentifier {
    /// Anything containing `@` is read as an email, everything else as a
    /// user name. User names are only normalised, never checked against the
    /// registration rules. `None` when the text is neither; callers treat
    /// that as an unknown account.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.contains('@') {
            Email::new(raw).ok().map(Self::Email)
        } else {
            UserName::for_lookup(raw).map(Self::UserName)
        }
    }
}
