use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::core::command::{Command, CommandError};
use crate::core::library::RequestType;
use crate::requests::dto::RequestDto;
use crate::utils::date::opt_serializer;

pub(crate) struct CreateRequestCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl CreateRequestCommand {
    pub(crate) fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRequestCommandRequest {
    item_barcode: String,
    user_barcode: String,
    request_type: RequestType,
    pickup_service_point_id: String,
    #[serde(with = "opt_serializer", default)]
    expiration_date: Option<NaiveDateTime>,
}

impl CreateRequestCommandRequest {
    pub fn new(item_barcode: &str, user_barcode: &str, request_type: RequestType, pickup_service_point_id: &str) -> Self {
        Self {
            item_barcode: item_barcode.to_string(),
            user_barcode: user_barcode.to_string(),
            request_type,
            pickup_service_point_id: pickup_service_point_id.to_string(),
            expiration_date: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRequestCommandResponse {
    pub request: RequestDto,
}

impl CreateRequestCommandResponse {
    pub fn new(request: RequestDto) -> Self {
        Self {
            request,
        }
    }
}

#[async_trait]
impl Command<CreateRequestCommandRequest, CreateRequestCommandResponse> for CreateRequestCommand {
    async fn execute(&self, req: CreateRequestCommandRequest) -> Result<CreateRequestCommandResponse, CommandError> {
        self.circulation_service.create_request(req.item_barcode.as_str(), req.user_barcode.as_str(), req.request_type,
                                                req.pickup_service_point_id.as_str(), req.expiration_date)
            .await.map_err(CommandError::from).map(CreateRequestCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use uuid::Uuid;
    use crate::circulation::command::cancel_request_cmd::{CancelRequestCommand, CancelRequestCommandRequest};
    use crate::circulation::command::create_request_cmd::{CreateRequestCommand, CreateRequestCommandRequest};
    use crate::circulation::command::item_queue_cmd::{ItemQueueCommand, ItemQueueCommandRequest};
    use crate::circulation::domain::CirculationService;
    use crate::circulation::factory::create_circulation_service;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::library::{RequestStatus, RequestType};
    use crate::core::repository::RepositoryStore;
    use crate::items::domain::ItemService;
    use crate::items::dto::ItemDto;
    use crate::items::factory::create_item_service;
    use crate::patrons::domain::PatronService;
    use crate::patrons::dto::PatronDto;
    use crate::patrons::factory::create_patron_service;

    lazy_static! {
        static ref ITEM_SVC : AsyncOnce<Box<dyn ItemService>> = AsyncOnce::new(async {
                create_item_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("item service")
            });
        static ref PATRON_SVC : AsyncOnce<Box<dyn PatronService>> = AsyncOnce::new(async {
                create_patron_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("patron service")
            });
        static ref SUT_SVC : AsyncOnce<Box<dyn CirculationService>> = AsyncOnce::new(async {
                create_circulation_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("circulation service")
            });
        static ref CREATE_CMD : AsyncOnce<CreateRequestCommand> = AsyncOnce::new(async {
                let svc = create_circulation_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("circulation service");
                CreateRequestCommand::new(svc)
            });
        static ref CANCEL_CMD : AsyncOnce<CancelRequestCommand> = AsyncOnce::new(async {
                let svc = create_circulation_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("circulation service");
                CancelRequestCommand::new(svc)
            });
        static ref QUEUE_CMD : AsyncOnce<ItemQueueCommand> = AsyncOnce::new(async {
                let svc = create_circulation_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("circulation service");
                ItemQueueCommand::new(svc)
            });
    }

    async fn add_patron() -> PatronDto {
        PATRON_SVC.get().await.add_patron(&PatronDto::new(format!("PT-{}", Uuid::new_v4()).as_str(), "undergrad"))
            .await.expect("should add patron")
    }

    #[tokio::test]
    async fn test_should_run_create_and_cancel_request() {
        let create_cmd: &CreateRequestCommand = CREATE_CMD.get().await;
        let cancel_cmd: &CancelRequestCommand = CANCEL_CMD.get().await;
        let queue_cmd: &ItemQueueCommand = QUEUE_CMD.get().await;
        let item = ITEM_SVC.get().await.add_item(&ItemDto::new(format!("IT-{}", Uuid::new_v4()).as_str(), "title", "sp1"))
            .await.expect("should add item");
        let (borrower, first, second) = (add_patron().await, add_patron().await, add_patron().await);
        let _ = SUT_SVC.get().await.check_out(item.barcode.as_str(), borrower.barcode.as_str(), "sp1", None)
            .await.expect("should check out");

        let res1 = create_cmd.execute(CreateRequestCommandRequest::new(item.barcode.as_str(), first.barcode.as_str(), RequestType::Hold, "sp1"))
            .await.expect("should create");
        let res2 = create_cmd.execute(CreateRequestCommandRequest::new(item.barcode.as_str(), second.barcode.as_str(), RequestType::Hold, "sp1"))
            .await.expect("should create");
        assert_eq!(1, res1.request.position);
        assert_eq!(2, res2.request.position);

        let err = create_cmd.execute(CreateRequestCommandRequest::new(item.barcode.as_str(), first.barcode.as_str(), RequestType::Hold, "sp1"))
            .await.unwrap_err();
        assert!(matches!(err, CommandError::Conflict { .. }));
        let err = create_cmd.execute(CreateRequestCommandRequest::new(item.barcode.as_str(), borrower.barcode.as_str(), RequestType::Hold, "sp1"))
            .await.unwrap_err();
        assert_eq!("ErrRequesterIsBorrower", err.to_body().code);

        let cancelled = cancel_cmd.execute(CancelRequestCommandRequest::new(res1.request.request_id.as_str()))
            .await.expect("should cancel");
        assert_eq!(RequestStatus::ClosedCancelled, cancelled.request.status);

        let queue = queue_cmd.execute(ItemQueueCommandRequest::new(item.barcode.as_str())).await.expect("should list queue");
        assert_eq!(1, queue.data.len());
        assert_eq!(res2.request.request_id, queue.data[0].request_id);
        assert_eq!(1, queue.data[0].position);
    }
}
