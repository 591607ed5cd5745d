use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;

use crate::session::Session;

/// Per-call session storage.
///
/// Implementations must be safe under concurrent access from different call
/// ids. Same-call turns are serialised by the engine, so a plain
/// read-modify-write through `get`/`put` is enough.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Session>>;

    /// Returns the stored session, creating a fresh `Initial` one if absent.
    async fn create_if_absent(&self, id: &str) -> Result<Session>;

    async fn put(&self, session: Session) -> Result<()>;

    /// Removes the session. Returns whether something was removed; deleting a
    /// missing id is not an error.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Drops sessions idle for longer than `max_idle`. Returns how many went.
    async fn evict_idle(&self, max_idle: Duration) -> Result<usize>;

    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
