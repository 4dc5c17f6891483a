use std::collections::HashMap;
use async_trait::async_trait;
use crate::core::library::{LibraryError, LibraryResult, ReasonCode};
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::Repository;
use crate::items::domain::model::ItemEntity;

pub(crate) const ITEMS_TABLE: &str = "items";
pub(crate) const ITEMS_KEY: &str = "item_id";
pub(crate) const ITEMS_INDEX: &str = "items_ndx";
pub(crate) const ITEMS_INDEX_PK: &str = "barcode";
pub(crate) const ITEMS_INDEX_SK: &str = "location_id";

#[async_trait]
pub(crate) trait ItemRepository: Repository<ItemEntity> {
    async fn find_by_barcode(&self, barcode: &str) -> LibraryResult<ItemEntity> {
        let mut res = self.query_all(&HashMap::from([
            ("barcode".to_string(), barcode.to_string())])).await?;
        if res.len() > 1 {
            return Err(LibraryError::database(format!("too many items for barcode {}", barcode).as_str(), None, false));
        }
        res.pop().ok_or_else(|| LibraryError::not_found(
            format!("item not found for barcode {}", barcode).as_str(), ReasonCode::ItemNotFound))
    }
}

impl ItemRepository for DDBRepository<ItemEntity> {}

impl ItemRepository for MemoryRepository<ItemEntity> {}
