use std::sync::Arc;
use async_trait::async_trait;
use tracing::debug;
use crate::core::library::LibraryResult;
use crate::core::transaction::{ChangeSet, TransactionManager};
use crate::utils::memory::MemoryStore;

#[derive(Debug)]
pub(crate) struct MemoryTransactionManager {
    store: Arc<MemoryStore>,
}

impl MemoryTransactionManager {
    pub(crate) fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TransactionManager for MemoryTransactionManager {
    async fn commit(&self, changes: &ChangeSet) -> LibraryResult<usize> {
        if changes.is_empty() {
            return Ok(0);
        }
        let size = self.store.write(changes.writes())?;
        debug!("committed {} writes in memory", size);
        Ok(size)
    }
}
