use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::core::library::FeeType;
use crate::fees::domain::FeeService;
use crate::fees::dto::FeeDto;
use crate::patrons::domain::PatronService;
use crate::utils::date::opt_serializer;

pub(crate) struct CreateFeeCommand {
    fee_service: Box<dyn FeeService>,
    patron_service: Box<dyn PatronService>,
}

impl CreateFeeCommand {
    pub(crate) fn new(fee_service: Box<dyn FeeService>, patron_service: Box<dyn PatronService>) -> Self {
        Self {
            fee_service,
            patron_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateFeeCommandRequest {
    user_id: String,
    fee_type: FeeType,
    amount: Decimal,
    reason: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    item_id: Option<String>,
    #[serde(with = "opt_serializer", default)]
    due_date: Option<NaiveDateTime>,
}

impl CreateFeeCommandRequest {
    pub fn new(user_id: &str, fee_type: FeeType, amount: Decimal, reason: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            fee_type,
            amount,
            reason: reason.to_string(),
            description: None,
            item_id: None,
            due_date: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateFeeCommandResponse {
    pub fee: FeeDto,
}

impl CreateFeeCommandResponse {
    pub fn new(fee: FeeDto) -> Self {
        Self {
            fee,
        }
    }
}

#[async_trait]
impl Command<CreateFeeCommandRequest, CreateFeeCommandResponse> for CreateFeeCommand {
    async fn execute(&self, req: CreateFeeCommandRequest) -> Result<CreateFeeCommandResponse, CommandError> {
        let patron = self.patron_service.find_patron_by_id(req.user_id.as_str()).await?;
        self.fee_service.create_fee(&patron, req.fee_type, req.amount, req.reason.as_str(),
                                    req.description, req.item_id, req.due_date)
            .await.map_err(CommandError::from).map(CreateFeeCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use rust_decimal_macros::dec;
    use uuid::Uuid;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::library::{FeeStatus, FeeType};
    use crate::core::repository::RepositoryStore;
    use crate::fees::command::create_fee_cmd::{CreateFeeCommand, CreateFeeCommandRequest};
    use crate::fees::factory::create_fee_service;
    use crate::patrons::domain::PatronService;
    use crate::patrons::dto::PatronDto;
    use crate::patrons::factory::create_patron_service;

    lazy_static! {
        static ref PATRON_SVC : AsyncOnce<Box<dyn PatronService>> = AsyncOnce::new(async {
                create_patron_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("patron service")
            });
        static ref CREATE_CMD : AsyncOnce<CreateFeeCommand> = AsyncOnce::new(async {
                let config = Configuration::new("test");
                let fee_svc = create_fee_service(&config, RepositoryStore::InMemory).await.expect("fee service");
                let patron_svc = create_patron_service(&config, RepositoryStore::InMemory).await.expect("patron service");
                CreateFeeCommand::new(fee_svc, patron_svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_create_fee() {
        let patron_svc = PATRON_SVC.get().await;
        let create_cmd: &CreateFeeCommand = CREATE_CMD.get().await;
        let patron = patron_svc.add_patron(&PatronDto::new(format!("PT-{}", Uuid::new_v4()).as_str(), "staff"))
            .await.expect("should add patron");
        let res = create_cmd.execute(CreateFeeCommandRequest::new(patron.patron_id.as_str(), FeeType::Processing, dec!(2.00), "processing"))
            .await.expect("should create fee");
        assert_eq!(patron.patron_id, res.fee.patron_id);
        assert_eq!(FeeStatus::Open, res.fee.status);

        let err = create_cmd.execute(CreateFeeCommandRequest::new("missing", FeeType::Manual, dec!(1.00), "manual"))
            .await.unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
    }
}
