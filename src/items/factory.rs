use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::RepositoryStore;
use crate::items::domain::ItemService;
use crate::items::domain::service::ItemServiceImpl;
use crate::items::repository::{ITEMS_INDEX, ITEMS_INDEX_PK, ITEMS_INDEX_SK, ITEMS_KEY, ITEMS_TABLE, ItemRepository};
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::memory::MemoryStore;

pub(crate) async fn create_item_repository(store: RepositoryStore) -> LibraryResult<Box<dyn ItemRepository>> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await?;
            Ok(Box::new(DDBRepository::new(client, ITEMS_TABLE, ITEMS_KEY, ITEMS_INDEX, ITEMS_INDEX_PK, ITEMS_INDEX_SK)))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await?;
            let _ = create_table(&client, ITEMS_TABLE, ITEMS_KEY, ITEMS_INDEX_PK, ITEMS_INDEX_SK).await;
            Ok(Box::new(DDBRepository::new(client, ITEMS_TABLE, ITEMS_KEY, ITEMS_INDEX, ITEMS_INDEX_PK, ITEMS_INDEX_SK)))
        }
        RepositoryStore::InMemory => {
            Ok(Box::new(MemoryRepository::new(MemoryStore::shared(), ITEMS_TABLE, ITEMS_KEY)))
        }
    }
}

pub(crate) async fn create_item_service(config: &Configuration, store: RepositoryStore) -> LibraryResult<Box<dyn ItemService>> {
    let item_repo = create_item_repository(store).await?;
    Ok(Box::new(ItemServiceImpl::new(config, item_repo)))
}
