//! In-memory token revocation set
//!
//! Per process and lost on restart. Every instance behind a load balancer
//! keeps its own set.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::repository::TokenDenylist;

#[derive(Debug, Default)]
pub struct InMemoryTokenDenylist {
    /// jti -> exp (unix seconds)
    entries: DashMap<Uuid, i64>,
}

impl InMemoryTokenDenylist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prune expired entries every `every` until the runtime shuts down
    pub fn spawn_pruner(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let removed = self.prune(chrono::Utc::now().timestamp());
                if removed > 0 {
                    tracing::debug!(removed, remaining = self.len(), "Pruned revoked tokens");
                }
            }
        })
    }
}

impl TokenDenylist for InMemoryTokenDenylist {
    fn revoke(&self, jti: Uuid, expires_at: i64) {
        self.entries.insert(jti, expires_at);
    }

    fn is_revoked(&self, jti: &Uuid) -> bool {
        self.entries.contains_key(jti)
    }

    fn prune(&self, now: i64) -> usize {
        let before = self.entries.len();
        // Same boundary as token expiry: still valid at exactly `exp`
        self.entries.retain(|_, exp| *exp >= now);
        before.saturating_sub(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoke_and_check() {
        let list = InMemoryTokenDenylist::new();
        let jti = Uuid::new_v4();
        assert!(!list.is_revoked(&jti));

        list.revoke(jti, 100);
        assert!(list.is_revoked(&jti));
        assert!(!list.is_revoked(&Uuid::new_v4()));
    }

    #[test]
    fn test_prune_keeps_live_entries() {
        let list = InMemoryTokenDenylist::new();
        let expired = Uuid::new_v4();
        let at_boundary = Uuid::new_v4();
        let live = Uuid::new_v4();
        list.revoke(expired, 99);
        list.revoke(at_boundary, 100);
        list.revoke(live, 500);

        assert_eq!(list.prune(100), 1);
        assert!(!list.is_revoked(&expired));
        assert!(list.is_revoked(&at_boundary));
        assert!(list.is_revoked(&live));
        assert_eq!(list.len(), 2);
    }

    #[tokio::test]
    async fn test_pruner_task_runs() {
        let list = Arc::new(InMemoryTokenDenylist::new());
        list.revoke(Uuid::new_v4(), 0);

        let handle = list.clone().spawn_pruner(Duration::from_secs(60));
        // First tick fires immediately
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(list.is_empty());
        handle.abort();
    }
}
