use crate::circulation::domain::CirculationService;
use crate::circulation::domain::service::{CirculationServiceImpl, Collaborators};
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::RepositoryStore;
use crate::core::transaction::create_transaction_manager;
use crate::fees::factory::create_fee_service;
use crate::gateway::factory::create_publisher;
use crate::items::factory::create_item_service;
use crate::loans::factory::create_loan_service;
use crate::locks::item_lock_manager;
use crate::patrons::factory::create_patron_service;
use crate::requests::factory::create_request_service;

pub(crate) async fn create_circulation_service(config: &Configuration, store: RepositoryStore) -> LibraryResult<Box<dyn CirculationService>> {
    let collaborators = Collaborators {
        item_service: create_item_service(config, store).await?,
        patron_service: create_patron_service(config, store).await?,
        loan_service: create_loan_service(config, store).await?,
        request_service: create_request_service(config, store).await?,
        fee_service: create_fee_service(config, store).await?,
    };
    let tx_manager = create_transaction_manager(store).await?;
    let publisher = create_publisher(store.gateway_publisher()).await?;
    Ok(Box::new(CirculationServiceImpl::new(config, collaborators, tx_manager, publisher, item_lock_manager())))
}
