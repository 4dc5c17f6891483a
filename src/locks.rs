pub mod local_lock_manager;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use lazy_static::lazy_static;
use tracing::debug;
use crate::core::library::LibraryResult;
use crate::locks::local_lock_manager::LocalLockManager;

lazy_static! {
    static ref ITEM_LOCKS: Arc<LocalLockManager> = Arc::new(LocalLockManager::new("item"));
    static ref FEE_LOCKS: Arc<LocalLockManager> = Arc::new(LocalLockManager::new("fee"));
}

// LockGuard holds an exclusive lock until it is dropped, including drops while unwinding
pub(crate) struct LockGuard {
    key: String,
    _held: Box<dyn Send + Sync>,
}

impl LockGuard {
    pub(crate) fn new(key: &str, held: Box<dyn Send + Sync>) -> Self {
        LockGuard { key: key.to_string(), _held: held }
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        debug!("released lock {}", self.key);
    }
}

// LockManager serializes critical sections by key, locks on different keys never contend.
#[async_trait]
pub(crate) trait LockManager: Sync + Send {
    // waits up to timeout for the lock, fails with a retryable ErrLockTimeout after that
    async fn acquire(&self, key: &str, timeout: Duration) -> LibraryResult<LockGuard>;
}

// with_lock runs f while holding the lock for key
pub(crate) async fn with_lock<T, F, Fut>(locks: &dyn LockManager, key: &str, timeout: Duration, f: F) -> LibraryResult<T>
    where F: FnOnce() -> Fut, Fut: Future<Output=LibraryResult<T>> {
    let guard = locks.acquire(key, timeout).await?;
    let res = f().await;
    drop(guard);
    res
}

// process-wide locks for items, shared by every service instance
pub(crate) fn item_lock_manager() -> Arc<dyn LockManager> {
    ITEM_LOCKS.clone()
}

// process-wide locks for fees
pub(crate) fn fee_lock_manager() -> Arc<dyn LockManager> {
    FEE_LOCKS.clone()
}
