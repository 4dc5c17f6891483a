use std::collections::HashMap;
use async_trait::async_trait;
use crate::core::library::{LibraryError, LibraryResult, ReasonCode};
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;

pub(crate) const PATRONS_TABLE: &str = "patrons";
pub(crate) const PATRONS_KEY: &str = "patron_id";
pub(crate) const PATRONS_INDEX: &str = "patrons_ndx";
pub(crate) const PATRONS_INDEX_PK: &str = "barcode";
pub(crate) const PATRONS_INDEX_SK: &str = "patron_group";

#[async_trait]
pub(crate) trait PatronRepository: Repository<PatronEntity> {
    async fn find_by_barcode(&self, barcode: &str) -> LibraryResult<PatronEntity> {
        let mut res = self.query_all(&HashMap::from([
            ("barcode".to_string(), barcode.to_string())])).await?;
        if res.len() > 1 {
            return Err(LibraryError::database(format!("too many patrons for barcode {}", barcode).as_str(), None, false));
        }
        res.pop().ok_or_else(|| LibraryError::not_found(
            format!("patron not found for barcode {}", barcode).as_str(), ReasonCode::PatronNotFound))
    }
}

impl PatronRepository for DDBRepository<PatronEntity> {}

impl PatronRepository for MemoryRepository<PatronEntity> {}
