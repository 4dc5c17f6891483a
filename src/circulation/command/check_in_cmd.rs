use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::CheckInResult;
use crate::core::command::{Command, CommandError};
use crate::core::library::LoanStatus;
use crate::requests::dto::RequestDto;
use crate::utils::date::opt_serializer;

pub(crate) struct CheckInCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl CheckInCommand {
    pub(crate) fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CheckInCommandRequest {
    item_barcode: String,
    service_point_id: String,
    #[serde(with = "opt_serializer", default)]
    check_in_date: Option<NaiveDateTime>,
}

impl CheckInCommandRequest {
    pub fn new(item_barcode: &str, service_point_id: &str, check_in_date: Option<NaiveDateTime>) -> Self {
        Self {
            item_barcode: item_barcode.to_string(),
            service_point_id: service_point_id.to_string(),
            check_in_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckInCommandResponse {
    pub loan_id: String,
    #[serde(with = "opt_serializer")]
    pub return_date: Option<NaiveDateTime>,
    pub status: LoanStatus,
    pub was_overdue: bool,
    pub fine_amount: Option<Decimal>,
    pub fee_id: Option<String>,
    pub next_request: Option<RequestDto>,
}

impl CheckInCommandResponse {
    pub fn new(res: CheckInResult) -> Self {
        Self {
            loan_id: res.loan.loan_id,
            return_date: res.loan.return_date,
            status: res.loan.status,
            was_overdue: res.was_overdue,
            fine_amount: res.fine_amount,
            fee_id: res.fee_id,
            next_request: res.next_request,
        }
    }
}

#[async_trait]
impl Command<CheckInCommandRequest, CheckInCommandResponse> for CheckInCommand {
    async fn execute(&self, req: CheckInCommandRequest) -> Result<CheckInCommandResponse, CommandError> {
        self.circulation_service.check_in(req.item_barcode.as_str(), req.service_point_id.as_str(), req.check_in_date)
            .await.map_err(CommandError::from).map(CheckInCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use chrono::Duration;
    use lazy_static::lazy_static;
    use rust_decimal_macros::dec;
    use uuid::Uuid;
    use crate::circulation::command::check_in_cmd::{CheckInCommand, CheckInCommandRequest};
    use crate::circulation::domain::CirculationService;
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
        static ref SUT_SVC : AsyncOnce<Box<dyn CirculationService>> = AsyncOnce::new(async {
                create_circulation_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("circulation service")
            });
        static ref CHECK_IN_CMD : AsyncOnce<CheckInCommand> = AsyncOnce::new(async {
                let svc = create_circulation_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("circulation service");
                CheckInCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_check_in() {
        let circulation = SUT_SVC.get().await;
        let check_in_cmd: &CheckInCommand = CHECK_IN_CMD.get().await;
        let item = ITEM_SVC.get().await.add_item(&ItemDto::new(format!("IT-{}", Uuid::new_v4()).as_str(), "title", "sp1"))
            .await.expect("should add item");
        let patron = PATRON_SVC.get().await.add_patron(&PatronDto::new(format!("PT-{}", Uuid::new_v4()).as_str(), "undergrad"))
            .await.expect("should add patron");
        let loan = circulation.check_out(item.barcode.as_str(), patron.barcode.as_str(), "sp1", None)
            .await.expect("should check out").loan;

        let res = check_in_cmd.execute(CheckInCommandRequest::new(item.barcode.as_str(), "sp1", Some(loan.loan_date + Duration::days(100))))
            .await.expect("should check in");
        assert_eq!(loan.loan_id, res.loan_id);
        assert_eq!(LoanStatus::Closed, res.status);
        assert!(res.was_overdue);
        // capped at the maximum fine
        assert_eq!(Some(dec!(10.00)), res.fine_amount);

        let err = check_in_cmd.execute(CheckInCommandRequest::new("unknown", "sp1", None)).await.unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
    }
}
