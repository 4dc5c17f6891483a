use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::RepositoryStore;
use crate::patrons::domain::PatronService;
use crate::patrons::domain::service::PatronServiceImpl;
use crate::patrons::repository::{PATRONS_INDEX, PATRONS_INDEX_PK, PATRONS_INDEX_SK, PATRONS_KEY, PATRONS_TABLE, PatronRepository};
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::memory::MemoryStore;

pub(crate) async fn create_patron_repository(store: RepositoryStore) -> LibraryResult<Box<dyn PatronRepository>> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await?;
            Ok(Box::new(DDBRepository::new(client, PATRONS_TABLE, PATRONS_KEY, PATRONS_INDEX, PATRONS_INDEX_PK, PATRONS_INDEX_SK)))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await?;
            let _ = create_table(&client, PATRONS_TABLE, PATRONS_KEY, PATRONS_INDEX_PK, PATRONS_INDEX_SK).await;
            Ok(Box::new(DDBRepository::new(client, PATRONS_TABLE, PATRONS_KEY, PATRONS_INDEX, PATRONS_INDEX_PK, PATRONS_INDEX_SK)))
        }
        RepositoryStore::InMemory => {
            Ok(Box::new(MemoryRepository::new(MemoryStore::shared(), PATRONS_TABLE, PATRONS_KEY)))
        }
    }
}

pub(crate) async fn create_patron_service(config: &Configuration, store: RepositoryStore) -> LibraryResult<Box<dyn PatronService>> {
    let patron_repo = create_patron_repository(store).await?;
    Ok(Box::new(PatronServiceImpl::new(config, patron_repo)))
}
