use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::core::library::PaymentMethod;
use crate::fees::domain::FeeService;
use crate::fees::dto::{FeeDto, PaymentDto};

pub(crate) struct ApplyPaymentCommand {
    fee_service: Box<dyn FeeService>,
}

impl ApplyPaymentCommand {
    pub(crate) fn new(fee_service: Box<dyn FeeService>) -> Self {
        Self {
            fee_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyPaymentCommandRequest {
    #[serde(default)]
    pub fee_id: String,
    amount: Decimal,
    payment_method: PaymentMethod,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
}

impl ApplyPaymentCommandRequest {
    pub fn new(fee_id: &str, amount: Decimal, payment_method: PaymentMethod) -> Self {
        Self {
            fee_id: fee_id.to_string(),
            amount,
            payment_method,
            note: None,
            created_by: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ApplyPaymentCommandResponse {
    pub fee: FeeDto,
    pub payment: PaymentDto,
}

impl ApplyPaymentCommandResponse {
    pub fn new(fee: FeeDto, payment: PaymentDto) -> Self {
        Self {
            fee,
            payment,
        }
    }
}

#[async_trait]
impl Command<ApplyPaymentCommandRequest, ApplyPaymentCommandResponse> for ApplyPaymentCommand {
    async fn execute(&self, req: ApplyPaymentCommandRequest) -> Result<ApplyPaymentCommandResponse, CommandError> {
        self.fee_service.apply_payment(req.fee_id.as_str(), req.amount, req.payment_method, req.note, req.created_by)
            .await.map_err(CommandError::from).map(|(fee, payment)| ApplyPaymentCommandResponse::new(fee, payment))
    }
}
