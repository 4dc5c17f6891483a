use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::fees::domain::FeeService;
use crate::fees::dto::{FeeDto, PaymentDto};

pub(crate) struct WaiveFeeCommand {
    fee_service: Box<dyn FeeService>,
}

impl WaiveFeeCommand {
    pub(crate) fn new(fee_service: Box<dyn FeeService>) -> Self {
        Self {
            fee_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WaiveFeeCommandRequest {
    #[serde(default)]
    pub fee_id: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
}

impl WaiveFeeCommandRequest {
    pub fn new(fee_id: &str, reason: Option<String>) -> Self {
        Self {
            fee_id: fee_id.to_string(),
            reason,
            created_by: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct WaiveFeeCommandResponse {
    pub fee: FeeDto,
    pub payment: PaymentDto,
}

impl WaiveFeeCommandResponse {
    pub fn new(fee: FeeDto, payment: PaymentDto) -> Self {
        Self {
            fee,
            payment,
        }
    }
}

#[async_trait]
impl Command<WaiveFeeCommandRequest, WaiveFeeCommandResponse> for WaiveFeeCommand {
    async fn execute(&self, req: WaiveFeeCommandRequest) -> Result<WaiveFeeCommandResponse, CommandError> {
        self.fee_service.waive_fee(req.fee_id.as_str(), req.reason, req.created_by)
            .await.map_err(CommandError::from).map(|(fee, payment)| WaiveFeeCommandResponse::new(fee, payment))
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::library::{FeeStatus, FeeType, PaymentMethod};
    use crate::core::repository::RepositoryStore;
    use crate::fees::command::list_payments_cmd::{ListPaymentsCommand, ListPaymentsCommandRequest};
    use crate::fees::command::waive_fee_cmd::{WaiveFeeCommand, WaiveFeeCommandRequest};
    use crate::fees::domain::FeeService;
    use crate::fees::factory::create_fee_service;
    use crate::patrons::dto::PatronDto;

    lazy_static! {
        static ref FEE_SVC : AsyncOnce<Box<dyn FeeService>> = AsyncOnce::new(async {
                create_fee_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("fee service")
            });
        static ref WAIVE_CMD : AsyncOnce<WaiveFeeCommand> = AsyncOnce::new(async {
                let svc = create_fee_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("fee service");
                WaiveFeeCommand::new(svc)
            });
        static ref PAYMENTS_CMD : AsyncOnce<ListPaymentsCommand> = AsyncOnce::new(async {
                let svc = create_fee_service(&Configuration::new("test"), RepositoryStore::InMemory).await.expect("fee service");
                ListPaymentsCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_waive_fee() {
        let fee_svc = FEE_SVC.get().await;
        let waive_cmd: &WaiveFeeCommand = WAIVE_CMD.get().await;
        let payments_cmd: &ListPaymentsCommand = PAYMENTS_CMD.get().await;
        let patron = PatronDto::new(format!("PT-{}", Uuid::new_v4()).as_str(), "undergrad");
        let fee = fee_svc.create_fee(&patron, FeeType::DamagedItem, dec!(5.00), "damage", None, None, None).await.expect("should create");
        let _ = fee_svc.apply_payment(fee.fee_id.as_str(), dec!(2.00), PaymentMethod::CreditCard, None, None).await.expect("should pay");

        let res = waive_cmd.execute(WaiveFeeCommandRequest::new(fee.fee_id.as_str(), Some("goodwill".to_string())))
            .await.expect("should waive");
        assert_eq!(FeeStatus::Closed, res.fee.status);
        assert_eq!(Decimal::ZERO, res.fee.remaining);
        assert_eq!(dec!(3.00), res.payment.amount);
        assert_eq!(PaymentMethod::Waive, res.payment.payment_method);

        let ledger = payments_cmd.execute(ListPaymentsCommandRequest::new(fee.fee_id.as_str())).await.expect("should list");
        assert_eq!(2, ledger.data.len());
        let total: Decimal = ledger.data.iter().map(|p| p.amount).sum();
        assert_eq!(fee.amount, total);
    }
}
