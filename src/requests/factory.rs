use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::RepositoryStore;
use crate::requests::domain::RequestService;
use crate::requests::domain::service::RequestServiceImpl;
use crate::requests::repository::{REQUESTS_INDEX, REQUESTS_INDEX_PK, REQUESTS_INDEX_SK, REQUESTS_KEY, REQUESTS_TABLE, RequestRepository};
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::memory::MemoryStore;

pub(crate) async fn create_request_repository(store: RepositoryStore) -> LibraryResult<Box<dyn RequestRepository>> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await?;
            Ok(Box::new(DDBRepository::new(client, REQUESTS_TABLE, REQUESTS_KEY, REQUESTS_INDEX, REQUESTS_INDEX_PK, REQUESTS_INDEX_SK)))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await?;
            let _ = create_table(&client, REQUESTS_TABLE, REQUESTS_KEY, REQUESTS_INDEX_PK, REQUESTS_INDEX_SK).await;
            Ok(Box::new(DDBRepository::new(client, REQUESTS_TABLE, REQUESTS_KEY, REQUESTS_INDEX, REQUESTS_INDEX_PK, REQUESTS_INDEX_SK)))
        }
        RepositoryStore::InMemory => {
            Ok(Box::new(MemoryRepository::new(MemoryStore::shared(), REQUESTS_TABLE, REQUESTS_KEY)))
        }
    }
}

pub(crate) async fn create_request_service(config: &Configuration, store: RepositoryStore) -> LibraryResult<Box<dyn RequestService>> {
    let request_repo = create_request_repository(store).await?;
    Ok(Box::new(RequestServiceImpl::new(config, request_repo)))
}
