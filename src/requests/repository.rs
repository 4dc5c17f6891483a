use std::collections::HashMap;
use async_trait::async_trait;
use crate::core::library::{LibraryResult, OPEN_REQUEST_PREFIX};
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::Repository;
use crate::requests::domain::model::RequestEntity;

pub(crate) const REQUESTS_TABLE: &str = "requests";
pub(crate) const REQUESTS_KEY: &str = "request_id";
pub(crate) const REQUESTS_INDEX: &str = "requests_ndx";
pub(crate) const REQUESTS_INDEX_PK: &str = "item_id";
pub(crate) const REQUESTS_INDEX_SK: &str = "request_status";

// the queue of an item is read through ItemEntity::request_ids
#[async_trait]
pub(crate) trait RequestRepository: Repository<RequestEntity> {
    async fn find_active_for_patron(&self, patron_id: &str) -> LibraryResult<Vec<RequestEntity>> {
        self.query_all(&HashMap::from([
            ("patron_id".to_string(), patron_id.to_string()),
            ("request_status:begins_with".to_string(), OPEN_REQUEST_PREFIX.to_string()),
        ])).await
    }
}

impl RequestRepository for DDBRepository<RequestEntity> {}

impl RequestRepository for MemoryRepository<RequestEntity> {}
