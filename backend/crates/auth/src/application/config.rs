//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::HashingParams;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Default token lifetime (1 hour)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Value of the `iss` claim
pub const DEFAULT_ISSUER: &str = "clinic-api";

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Token cookie name
    pub cookie_name: String,
    /// HS256 signing secret. Never logged.
    pub jwt_secret: Vec<u8>,
    /// Token lifetime
    pub token_ttl: Duration,
    /// Expected `iss` claim
    pub issuer: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Argon2id work factor for new hashes
    pub hashing: HashingParams,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "token".to_string(),
            jwt_secret: Vec::new(),
            token_ttl: DEFAULT_TOKEN_TTL,
            issuer: DEFAULT_ISSUER.to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            hashing: HashingParams::default(),
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a random signing secret (for development)
    ///
    /// Tokens do not survive a restart.
    pub fn with_random_secret() -> Self {
        Self {
            jwt_secret: platform::crypto::random_bytes(32),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Token lifetime in whole seconds
    pub fn token_ttl_secs(&self) -> i64 {
        i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX)
    }

    /// Cookie carrying the token; lives exactly as long as the token
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.token_ttl_secs()),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("cookie_name", &self.cookie_name)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("issuer", &self.issuer)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("hashing", &self.hashing)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
