use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::RepositoryStore;
use crate::loans::domain::LoanService;
use crate::loans::domain::service::LoanServiceImpl;
use crate::loans::repository::{LOANS_INDEX, LOANS_INDEX_PK, LOANS_INDEX_SK, LOANS_KEY, LOANS_TABLE, LoanRepository};
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::memory::MemoryStore;

pub(crate) async fn create_loan_repository(store: RepositoryStore) -> LibraryResult<Box<dyn LoanRepository>> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await?;
            Ok(Box::new(DDBRepository::new(client, LOANS_TABLE, LOANS_KEY, LOANS_INDEX, LOANS_INDEX_PK, LOANS_INDEX_SK)))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await?;
            let _ = create_table(&client, LOANS_TABLE, LOANS_KEY, LOANS_INDEX_PK, LOANS_INDEX_SK).await;
            Ok(Box::new(DDBRepository::new(client, LOANS_TABLE, LOANS_KEY, LOANS_INDEX, LOANS_INDEX_PK, LOANS_INDEX_SK)))
        }
        RepositoryStore::InMemory => {
            Ok(Box::new(MemoryRepository::new(MemoryStore::shared(), LOANS_TABLE, LOANS_KEY)))
        }
    }
}

pub(crate) async fn create_loan_service(config: &Configuration, store: RepositoryStore) -> LibraryResult<Box<dyn LoanService>> {
    let loan_repo = create_loan_repository(store).await?;
    Ok(Box::new(LoanServiceImpl::new(config, loan_repo)))
}
