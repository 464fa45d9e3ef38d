//! Server Configuration
//!
//! Everything the binary needs, read once at startup from the environment
//! (optionally seeded from `.env`).

use std::fmt;
use std::time::Duration;

use auth::AuthConfig;
use platform::config::{ConfigError, EnvReader};
use platform::password::HashingParams;
use sqlx::mysql::MySqlConnectOptions;

const DEFAULT_PORT: u16 = 3020;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_DB_PORT: u16 = 3306;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;

/// Shortest accepted signing secret, in bytes
const MIN_JWT_SECRET_LEN: usize = 32;

/// MySQL connection settings
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Startup connect attempts before giving up
    pub connect_attempts: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("connect_attempts", &self.connect_attempts)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Read from the process environment
    ///
    /// Debug builds fall back to a random signing secret; release builds
    /// require `JWT_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(&EnvReader::from_process_env(), cfg!(debug_assertions))
    }

    pub fn from_reader<F>(env: &EnvReader<F>, debug_build: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig {
            host: env.string_or("DB_HOST", "localhost"),
            port: env.parse_or("DB_PORT", DEFAULT_DB_PORT)?,
            user: env.required("DB_USER")?,
            password: env.optional("DB_PASSWORD").unwrap_or_default(),
            name: env.required("DB_NAME")?,
            max_connections: positive(
                "DB_MAX_CONNECTIONS",
                env.parse_or("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            )?,
            acquire_timeout: env
                .parse_or::<u64>(
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    DEFAULT_ACQUIRE_TIMEOUT.as_secs(),
                )
                .and_then(|secs| positive("DB_ACQUIRE_TIMEOUT_SECS", secs))
                .map(Duration::from_secs)?,
            connect_attempts: positive(
                "DB_CONNECT_ATTEMPTS",
                env.parse_or("DB_CONNECT_ATTEMPTS", DEFAULT_CONNECT_ATTEMPTS)?,
            )?,
        };

        let auth = auth_config(env, debug_build)?;

        let request_timeout = env
            .parse_or::<u64>(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
            )
            .and_then(|secs| positive("REQUEST_TIMEOUT_SECS", secs))
            .map(Duration::from_secs)?;

        Ok(Self {
            port: env.parse_or("PORT", DEFAULT_PORT)?,
            cors_origins: env.list_or("CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
            request_timeout,
            database,
            auth,
        })
    }
}

fn auth_config<F>(env: &EnvReader<F>, debug_build: bool) -> Result<AuthConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match env.optional("JWT_SECRET") {
        Some(secret) if secret.len() < MIN_JWT_SECRET_LEN => {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                format!("must be at least {MIN_JWT_SECRET_LEN} bytes"),
            ));
        }
        Some(secret) => AuthConfig {
            jwt_secret: secret.into_bytes(),
            ..AuthConfig::default()
        },
        None if debug_build => {
            tracing::warn!("JWT_SECRET not set; using a random secret, tokens will not survive a restart");
            AuthConfig::with_random_secret()
        }
        None => return Err(ConfigError::Missing("JWT_SECRET".to_string())),
    };

    let defaults = HashingParams::default();
    let hashing = HashingParams {
        memory_kib: env.parse_or("PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
        iterations: env.parse_or("PASSWORD_ITERATIONS", defaults.iterations)?,
        parallelism: env.parse_or("PASSWORD_PARALLELISM", defaults.parallelism)?,
    };
    hashing
        .argon2()
        .map_err(|e| ConfigError::invalid("PASSWORD_*", e.to_string()))?;

    Ok(AuthConfig {
        token_ttl: env.duration_or("JWT_EXPIRES_IN", base.token_ttl)?,
        cookie_secure: env.bool_or("COOKIE_SECURE", !debug_build)?,
        hashing,
        password_pepper: env.optional("PASSWORD_PEPPER").map(String::into_bytes),
        ..base
    })
}

fn positive<T>(key: &str, value: T) -> Result<T, ConfigError>
where
    T: PartialOrd + Default,
{
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::invalid(key, "must be greater than zero"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn reader(pairs: &[(&str, &str)]) -> EnvReader<impl Fn(&str) -> Option<String>> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvReader::new(move |key: &str| vars.get(key).cloned())
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![("DB_USER", "clinic"), ("DB_NAME", "clinica"), ("JWT_SECRET", SECRET)]
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_reader(&reader(&minimal()), false).unwrap();

        assert_eq!(config.port, 3020);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));

        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.password, "");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.acquire_timeout, Duration::from_secs(30));
        assert_eq!(config.database.connect_attempts, 5);

        assert_eq!(config.auth.jwt_secret, SECRET.as_bytes());
        assert_eq!(config.auth.token_ttl, Duration::from_secs(3600));
        assert!(config.auth.cookie_secure);
        assert_eq!(config.auth.hashing, HashingParams::default());
        assert!(config.auth.password_pepper.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut vars = minimal();
        vars.extend([
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "3307"),
            ("DB_PASSWORD", "s3cret"),
            ("DB_MAX_CONNECTIONS", "25"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "5"),
            ("DB_CONNECT_ATTEMPTS", "2"),
            ("JWT_EXPIRES_IN", "15m"),
            ("PORT", "8080"),
            ("CORS_ORIGIN", "https://a.example, https://b.example"),
            ("COOKIE_SECURE", "false"),
            ("REQUEST_TIMEOUT_SECS", "10"),
            ("PASSWORD_MEMORY_KIB", "8192"),
            ("PASSWORD_ITERATIONS", "3"),
            ("PASSWORD_PARALLELISM", "2"),
            ("PASSWORD_PEPPER", "pepper"),
        ]);
        let config = AppConfig::from_reader(&reader(&vars), false).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 3307);
        assert_eq!(config.database.max_connections, 25);
        assert_eq!(config.database.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.database.connect_attempts, 2);
        assert_eq!(config.auth.token_ttl, Duration::from_secs(900));
        assert!(!config.auth.cookie_secure);
        assert_eq!(
            config.auth.hashing,
            HashingParams {
                memory_kib: 8192,
                iterations: 3,
                parallelism: 2
            }
        );
        assert_eq!(config.auth.password_pepper.as_deref(), Some(&b"pepper"[..]));
    }

    #[test]
    fn test_jwt_secret_rules() {
        let without_secret = [("DB_USER", "u"), ("DB_NAME", "n")];

        assert_eq!(
            AppConfig::from_reader(&reader(&without_secret), false).unwrap_err(),
            ConfigError::Missing("JWT_SECRET".to_string())
        );

        let debug = AppConfig::from_reader(&reader(&without_secret), true).unwrap();
        assert_eq!(debug.auth.jwt_secret.len(), 32);
        assert!(!debug.auth.cookie_secure);

        let short = [("DB_USER", "u"), ("DB_NAME", "n"), ("JWT_SECRET", "short")];
        assert!(matches!(
            AppConfig::from_reader(&reader(&short), true),
            Err(ConfigError::Invalid { key, .. }) if key == "JWT_SECRET"
        ));
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("DB_PORT", "not-a-port"),
            ("DB_MAX_CONNECTIONS", "0"),
            ("DB_CONNECT_ATTEMPTS", "0"),
            ("JWT_EXPIRES_IN", "0"),
            ("JWT_EXPIRES_IN", "1w"),
            ("COOKIE_SECURE", "maybe"),
            ("REQUEST_TIMEOUT_SECS", "0"),
            ("PASSWORD_MEMORY_KIB", "1"),
        ];

        for (key, value) in cases {
            let mut vars = minimal();
            vars.push((key, value));
            assert!(
                matches!(
                    AppConfig::from_reader(&reader(&vars), false),
                    Err(ConfigError::Invalid { .. })
                ),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_required_database_fields() {
        let vars = [("JWT_SECRET", SECRET), ("DB_NAME", "n")];
        assert_eq!(
            AppConfig::from_reader(&reader(&vars), false).unwrap_err(),
            ConfigError::Missing("DB_USER".to_string())
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut vars = minimal();
        vars.push(("DB_PASSWORD", "hunter2-db"));
        let config = AppConfig::from_reader(&reader(&vars), false).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2-db"));
        assert!(!debug.contains(SECRET));
    }
}
