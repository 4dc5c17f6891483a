use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult, ReasonCode};
use crate::core::repository::Repository;
use crate::core::transaction::TableWrite;
use crate::utils::memory::MemoryStore;

// MemoryRepository stores entities of one table in a MemoryStore
#[derive(Debug)]
pub(crate) struct MemoryRepository<E> {
    store: Arc<MemoryStore>,
    table_name: String,
    key_name: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E> MemoryRepository<E> {
    pub(crate) fn new(store: Arc<MemoryStore>, table_name: &str, key_name: &str) -> Self {
        Self {
            store,
            table_name: table_name.to_string(),
            key_name: key_name.to_string(),
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E> Repository<E> for MemoryRepository<E>
    where E: Identifiable + Serialize + DeserializeOwned + 'static {
    async fn create(&self, entity: &E) -> LibraryResult<usize> {
        let write = TableWrite::create(self.table_name.as_str(), self.key_name.as_str(), entity)?;
        self.store.write(&[write])
    }

    async fn update(&self, entity: &E) -> LibraryResult<usize> {
        let write = TableWrite::update(self.table_name.as_str(), self.key_name.as_str(), entity, Utc::now().naive_utc())?;
        self.store.write(&[write])
    }

    async fn get(&self, id: &str) -> LibraryResult<E> {
        match self.store.get(self.table_name.as_str(), id)? {
            Some(row) => Ok(serde_json::from_value(row)?),
            None => Err(LibraryError::not_found(
                format!("{} not found for {}", self.key_name, id).as_str(), ReasonCode::RecordNotFound)),
        }
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: usize, page_size: usize) -> LibraryResult<PaginatedResult<E>> {
        let rows = self.store.scan(self.table_name.as_str(), predicate)?;
        let total = rows.len();
        let skip = page.max(1).saturating_sub(1).saturating_mul(page_size);
        let mut records = Vec::new();
        for row in rows.into_iter().skip(skip).take(page_size) {
            records.push(serde_json::from_value(row)?);
        }
        Ok(PaginatedResult::new(page.max(1), page_size, total, records))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use serde::{Deserialize, Serialize};
    use crate::core::domain::Identifiable;
    use crate::core::library::LibraryError;
    use crate::core::repository::memory_repository::MemoryRepository;
    use crate::core::repository::Repository;
    use crate::utils::memory::MemoryStore;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        sample_id: String,
        version: i64,
        owner_id: String,
    }

    impl Identifiable for Sample {
        fn id(&self) -> String {
            self.sample_id.to_string()
        }

        fn version(&self) -> i64 {
            self.version
        }
    }

    fn sample(id: &str, owner: &str) -> Sample {
        Sample { sample_id: id.to_string(), version: 0, owner_id: owner.to_string() }
    }

    #[tokio::test]
    async fn test_should_create_get_update() {
        let repo = MemoryRepository::<Sample>::new(Arc::new(MemoryStore::new()), "samples", "sample_id");
        repo.create(&sample("s1", "o1")).await.expect("should create");
        let mut loaded = repo.get("s1").await.expect("should get");
        assert_eq!(0, loaded.version);
        loaded.owner_id = "o2".to_string();
        repo.update(&loaded).await.expect("should update");
        let reloaded = repo.get("s1").await.expect("should get");
        assert_eq!(1, reloaded.version);
        assert_eq!("o2", reloaded.owner_id);
        // stale version is rejected
        assert!(matches!(repo.update(&loaded).await, Err(LibraryError::Conflict { .. })));
        assert!(matches!(repo.get("missing").await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_query_pages() {
        let repo = MemoryRepository::<Sample>::new(Arc::new(MemoryStore::new()), "samples", "sample_id");
        for i in 0..25 {
            let owner = if i % 5 == 0 { "rare" } else { "common" };
            repo.create(&sample(format!("s{}", i).as_str(), owner)).await.expect("should create");
        }
        let predicate = HashMap::from([("owner_id".to_string(), "common".to_string())]);
        let first = repo.query(&predicate, 1, 15).await.expect("should query");
        assert_eq!(15, first.records.len());
        assert_eq!(20, first.total_items);
        assert_eq!(2, first.total_pages);
        let second = repo.query(&predicate, 2, 15).await.expect("should query");
        assert_eq!(5, second.records.len());
        let all = repo.query_all(&HashMap::from([("owner_id".to_string(), "rare".to_string())])).await.expect("should query");
        assert_eq!(5, all.len());
    }
}
