use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;
use tracing::warn;
use crate::core::library::{LibraryError, LibraryResult};
use crate::locks::{LockGuard, LockManager};

type LockTable = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

// LocalLockManager keeps one async mutex per key in process, entries are removed once no
// task holds or waits for them.
#[derive(Debug)]
pub(crate) struct LocalLockManager {
    name: String,
    locks: LockTable,
}

impl LocalLockManager {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // number of keys currently locked or waited on
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }

    fn entry(&self, key: &str) -> LibraryResult<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self.locks.lock().map_err(|_| {
            LibraryError::runtime(format!("{} lock table poisoned", self.name).as_str(), None)
        })?;
        Ok(locks.entry(key.to_string()).or_default().clone())
    }
}

// Held releases the mutex first and then prunes the table entry if nobody else references it
struct Held {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: LockTable,
}

impl Drop for Held {
    fn drop(&mut self) {
        self.guard.take();
        prune(&self.locks, self.key.as_str());
    }
}

fn prune(locks: &LockTable, key: &str) {
    if let Ok(mut locks) = locks.lock() {
        let unused = locks.get(key).map(|m| Arc::strong_count(m) == 1).unwrap_or(false);
        if unused {
            locks.remove(key);
        }
    }
}

#[async_trait]
impl LockManager for LocalLockManager {
    async fn acquire(&self, key: &str, timeout: Duration) -> LibraryResult<LockGuard> {
        let mutex = self.entry(key)?;
        match tokio::time::timeout(timeout, mutex.lock_owned()).await {
            Ok(guard) => {
                let held = Held { key: key.to_string(), guard: Some(guard), locks: self.locks.clone() };
                Ok(LockGuard::new(key, Box::new(held)))
            }
            Err(_) => {
                // the cancelled waiter dropped its reference to the mutex
                prune(&self.locks, key);
                warn!("timed out acquiring {} lock {} after {:?}", self.name, key, timeout);
                Err(LibraryError::lock_timeout(
                    format!("{} {} is locked by another operation", self.name, key).as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use crate::core::library::{LibraryError, ReasonCode};
    use crate::locks::LockManager;
    use crate::locks::local_lock_manager::LocalLockManager;

    #[tokio::test]
    async fn test_should_acquire_and_release() {
        let locks = LocalLockManager::new("item");
        let guard = locks.acquire("i1", Duration::from_millis(50)).await.expect("should lock");
        assert_eq!("i1", guard.key());
        assert_eq!(1, locks.len());
        drop(guard);
        assert_eq!(0, locks.len());
        let _guard = locks.acquire("i1", Duration::from_millis(50)).await.expect("should lock again");
    }

    #[tokio::test]
    async fn test_should_time_out_while_held() {
        let locks = LocalLockManager::new("item");
        let _guard = locks.acquire("i1", Duration::from_millis(50)).await.expect("should lock");
        let err = locks.acquire("i1", Duration::from_millis(20)).await.err().expect("should time out");
        assert!(err.retryable());
        assert!(matches!(err, LibraryError::CurrentlyUnavailable { reason_code: ReasonCode::LockTimeout, .. }));
        assert_eq!(1, locks.len());
    }

    #[tokio::test]
    async fn test_should_not_block_other_keys() {
        let locks = LocalLockManager::new("item");
        let _a = locks.acquire("a", Duration::from_millis(50)).await.expect("should lock a");
        let _b = locks.acquire("b", Duration::from_millis(50)).await.expect("should lock b");
        assert_eq!(2, locks.len());
    }
}
