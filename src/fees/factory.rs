use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::ddb_repository::DDBRepository;
use crate::core::repository::memory_repository::MemoryRepository;
use crate::core::repository::RepositoryStore;
use crate::core::transaction::create_transaction_manager;
use crate::fees::domain::FeeService;
use crate::fees::domain::service::FeeServiceImpl;
use crate::fees::repository::{FEES_INDEX, FEES_INDEX_PK, FEES_INDEX_SK, FEES_KEY, FEES_TABLE, FeeRepository,
                              PAYMENTS_INDEX, PAYMENTS_INDEX_PK, PAYMENTS_INDEX_SK, PAYMENTS_KEY, PAYMENTS_TABLE, PaymentRepository};
use crate::gateway::factory::create_publisher;
use crate::locks::fee_lock_manager;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::memory::MemoryStore;

pub(crate) async fn create_fee_repository(store: RepositoryStore) -> LibraryResult<Box<dyn FeeRepository>> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await?;
            Ok(Box::new(DDBRepository::new(client, FEES_TABLE, FEES_KEY, FEES_INDEX, FEES_INDEX_PK, FEES_INDEX_SK)))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await?;
            let _ = create_table(&client, FEES_TABLE, FEES_KEY, FEES_INDEX_PK, FEES_INDEX_SK).await;
            Ok(Box::new(DDBRepository::new(client, FEES_TABLE, FEES_KEY, FEES_INDEX, FEES_INDEX_PK, FEES_INDEX_SK)))
        }
        RepositoryStore::InMemory => {
            Ok(Box::new(MemoryRepository::new(MemoryStore::shared(), FEES_TABLE, FEES_KEY)))
        }
    }
}

pub(crate) async fn create_payment_repository(store: RepositoryStore) -> LibraryResult<Box<dyn PaymentRepository>> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await?;
            Ok(Box::new(DDBRepository::new(client, PAYMENTS_TABLE, PAYMENTS_KEY, PAYMENTS_INDEX, PAYMENTS_INDEX_PK, PAYMENTS_INDEX_SK)))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await?;
            let _ = create_table(&client, PAYMENTS_TABLE, PAYMENTS_KEY, PAYMENTS_INDEX_PK, PAYMENTS_INDEX_SK).await;
            Ok(Box::new(DDBRepository::new(client, PAYMENTS_TABLE, PAYMENTS_KEY, PAYMENTS_INDEX, PAYMENTS_INDEX_PK, PAYMENTS_INDEX_SK)))
        }
        RepositoryStore::InMemory => {
            Ok(Box::new(MemoryRepository::new(MemoryStore::shared(), PAYMENTS_TABLE, PAYMENTS_KEY)))
        }
    }
}

pub(crate) async fn create_fee_service(config: &Configuration, store: RepositoryStore) -> LibraryResult<Box<dyn FeeService>> {
    let fee_repo = create_fee_repository(store).await?;
    let payment_repo = create_payment_repository(store).await?;
    let tx_manager = create_transaction_manager(store).await?;
    let publisher = create_publisher(store.gateway_publisher()).await?;
    Ok(Box::new(FeeServiceImpl::new(config, fee_repo, payment_repo, tx_manager, publisher, fee_lock_manager())))
}
