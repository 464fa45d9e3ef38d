//! Database Pool

use std::time::Duration;

use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

use crate::config::DatabaseConfig;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Connect the pool, retrying transient failures with doubling backoff
pub async fn connect(config: &DatabaseConfig) -> Result<MySqlPool, sqlx::Error> {
    let mut delay = INITIAL_BACKOFF;
    let mut attempt = 1;

    loop {
        let result = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await;

        match result {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < config.connect_attempts && is_transient(&e) => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    "Database connect failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Failures worth retrying: the server is not reachable yet or is full.
/// Bad credentials or an unknown database are not.
fn is_transient(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
        // Too many connections
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
            .is_some_and(|e| matches!(e.number(), 1040 | 1203)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(is_transient(&sqlx::Error::Io(std::io::Error::other(
            "connection refused"
        ))));
        assert!(is_transient(&sqlx::Error::PoolTimedOut));
        assert!(!is_transient(&sqlx::Error::RowNotFound));
        assert!(!is_transient(&sqlx::Error::PoolClosed));
    }
}
