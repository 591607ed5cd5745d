use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::watch;

use crate::ports::SessionStore;
use crate::session::Session;

const DEFAULT_SHARDS: usize = 16;

/// Process-local session store: a fixed set of independently locked shards
/// keyed by call id. Nothing survives a restart, which is fine for calls.
pub struct InMemorySessionStore {
    shards: Vec<RwLock<HashMap<String, Session>>>,
    history_capacity: usize,
}

impl InMemorySessionStore {
    pub fn new(history_capacity: usize) -> Self {
        Self::with_shards(DEFAULT_SHARDS, history_capacity)
    }

    pub fn with_shards(shards: usize, history_capacity: usize) -> Self {
        let shards = (0..shards.max(1)).map(|_| RwLock::new(HashMap::new())).collect();
        Self { shards, history_capacity }
    }

    fn shard(&self, id: &str) -> &RwLock<HashMap<String, Session>> {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % self.shards.len();
        &self.shards[idx]
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.shard(id).read().get(id).cloned())
    }

    async fn create_if_absent(&self, id: &str) -> Result<Session> {
        let mut shard = self.shard(id).write();
        let session = shard
            .entry(id.to_string())
            .or_insert_with(|| Session::new(id, self.history_capacity));
        Ok(session.clone())
    }

    async fn put(&self, session: Session) -> Result<()> {
        self.shard(&session.id).write().insert(session.id.clone(), session);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.shard(id).write().remove(id).is_some())
    }

    async fn evict_idle(&self, max_idle: Duration) -> Result<usize> {
        let now = Utc::now();
        let mut evicted = 0;
        for shard in &self.shards {
            let mut map = shard.write();
            let before = map.len();
            map.retain(|_, s| !s.is_idle(now, max_idle));
            evicted += before - map.len();
        }
        Ok(evicted)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.shards.iter().map(|s| s.read().len()).sum())
    }
}

/// Starts a background task that evicts idle sessions every `interval`.
///
/// Returns a shutdown sender; send `true` (or drop it) to stop the task.
pub fn spawn_idle_sweeper<S>(store: Arc<S>, max_idle: Duration, interval: std::time::Duration) -> watch::Sender<bool>
where
    S: SessionStore + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match store.evict_idle(max_idle).await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(evicted = n, "evicted idle call sessions"),
                        Err(e) => tracing::warn!(error = %e, "idle session sweep failed"),
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        tracing::debug!("idle session sweeper stopped");
                        break;
                    }
                }
            }
        }
    });

    shutdown_tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DialogueState;

    #[tokio::test]
    async fn test_create_if_absent_is_stable() {
        let store = InMemorySessionStore::new(10);
        let mut first = store.create_if_absent("CA1").await.unwrap();
        first.state = DialogueState::General;
        store.put(first).await.unwrap();

        let again = store.create_if_absent("CA1").await.unwrap();
        assert_eq!(again.state, DialogueState::General);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemorySessionStore::new(10);
        store.create_if_absent("CA1").await.unwrap();
        assert!(store.delete("CA1").await.unwrap());
        assert!(!store.delete("CA1").await.unwrap());
        assert!(store.get("CA1").await.unwrap().is_none());
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_fresh_sessions() {
        let store = InMemorySessionStore::with_shards(4, 10);
        let mut stale = store.create_if_absent("stale").await.unwrap();
        stale.last_activity = Utc::now() - Duration::hours(2);
        store.put(stale).await.unwrap();
        store.create_if_absent("fresh").await.unwrap();

        let evicted = store.evict_idle(Duration::minutes(30)).await.unwrap();
        assert_eq!(evicted, 1);
        assert!(store.get("stale").await.unwrap().is_none());
        assert!(store.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sessions_spread_across_shards_stay_independent() {
        let store = Arc::new(InMemorySessionStore::with_shards(8, 10));
        let mut handles = Vec::new();
        for i in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let id = format!("CA{}", i);
                let mut s = store.create_if_absent(&id).await.unwrap();
                s.turns = i;
                store.put(s).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.len().await.unwrap(), 64);
        assert_eq!(store.get("CA42").await.unwrap().unwrap().turns, 42);
    }

    #[tokio::test]
    async fn test_sweeper_evicts_and_stops() {
        let store = Arc::new(InMemorySessionStore::new(10));
        let mut stale = store.create_if_absent("stale").await.unwrap();
        stale.last_activity = Utc::now() - Duration::hours(2);
        store.put(stale).await.unwrap();

        let shutdown = spawn_idle_sweeper(store.clone(), Duration::minutes(30), std::time::Duration::from_millis(10));
        for _ in 0..50 {
            if store.is_empty().await.unwrap() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(store.is_empty().await.unwrap());
        shutdown.send(true).unwrap();
    }
}
