use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::core::command::{Command, CommandError};
use crate::loans::dto::LoanDto;
use crate::requests::dto::RequestDto;
use crate::utils::date::opt_serializer;

pub(crate) struct CheckOutCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl CheckOutCommand {
    pub(crate) fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckOutCommandRequest {
    item_barcode: String,
    user_barcode: String,
    service_point_id: String,
    #[serde(with = "opt_serializer", default)]
    due_date: Option<NaiveDateTime>,
}

impl CheckOutCommandRequest {
    pub fn new(item_barcode: &str, user_barcode: &str, service_point_id: &str) -> Self {
        Self {
            item_barcode: item_barcode.to_string(),
            user_barcode: user_barcode.to_string(),
            service_point_id: service_point_id.to_string(),
            due_date: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckOutCommandResponse {
    #[serde(flatten)]
    pub loan: LoanDto,
    pub filled_request: Option<RequestDto>,
}

#[async_trait]
impl Command<CheckOutCommandRequest, CheckOutCommandResponse> for CheckOutCommand {
    async fn execute(&self, req: CheckOutCommandRequest) -> Result<CheckOutCommandResponse, CommandError> {
        self.circulation_service.check_out(req.item_barcode.as_str(), req.user_barcode.as_str(),
                                           req.service_point_id.as_str(), req.due_date)
            .await.map_err(CommandError::from)
            .map(|res| CheckOutCommandResponse { loan: res.loan, filled_request: res.filled_request })
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use uuid::Uuid;
    use crate::circulation::command::check_out_cmd::{CheckOutCommand, CheckOutCommandRequest};
    use crate::circulation::factory::create_circulation_service;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::library::LoanStatus;
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
        static ref CHECK_OUT_CMD : AsyncOnce<CheckOutCommand> = AsyncOnce::new(async {
                let svc = create_circulation_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("circulation service");
                CheckOutCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_check_out() {
        let check_out_cmd: &CheckOutCommand = CHECK_OUT_CMD.get().await;
        let item = ITEM_SVC.get().await.add_item(&ItemDto::new(format!("IT-{}", Uuid::new_v4()).as_str(), "title", "sp1"))
            .await.expect("should add item");
        let patron = PATRON_SVC.get().await.add_patron(&PatronDto::new(format!("PT-{}", Uuid::new_v4()).as_str(), "undergrad"))
            .await.expect("should add patron");

        let res = check_out_cmd.execute(CheckOutCommandRequest::new(item.barcode.as_str(), patron.barcode.as_str(), "sp1"))
            .await.expect("should check out");
        assert_eq!(LoanStatus::Open, res.loan.status);
        assert_eq!(item.item_id, res.loan.item_id);
        let json = serde_json::to_value(&res).expect("serialize");
        assert_eq!(patron.patron_id.as_str(), json["user_id"]);
        assert_eq!(patron.barcode.as_str(), json["user_barcode"]);

        let err = check_out_cmd.execute(CheckOutCommandRequest::new(item.barcode.as_str(), patron.barcode.as_str(), "sp1"))
            .await.unwrap_err();
        assert!(matches!(err, CommandError::Conflict { .. }));
        assert_eq!("ErrItemAlreadyOnLoan", err.to_body().code);
    }
}
