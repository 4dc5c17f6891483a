use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::fees::domain::FeeService;
use crate::fees::dto::{FeeDto, PaymentDto};

pub(crate) struct ForgiveFeeCommand {
    fee_service: Box<dyn FeeService>,
}

impl ForgiveFeeCommand {
    pub(crate) fn new(fee_service: Box<dyn FeeService>) -> Self {
        Self {
            fee_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForgiveFeeCommandRequest {
    #[serde(default)]
    pub fee_id: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
}

impl ForgiveFeeCommandRequest {
    pub fn new(fee_id: &str, reason: Option<String>) -> Self {
        Self {
            fee_id: fee_id.to_string(),
            reason,
            created_by: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ForgiveFeeCommandResponse {
    pub fee: FeeDto,
    pub payment: PaymentDto,
}

impl ForgiveFeeCommandResponse {
    pub fn new(fee: FeeDto, payment: PaymentDto) -> Self {
        Self {
            fee,
            payment,
        }
    }
}

#[async_trait]
impl Command<ForgiveFeeCommandRequest, ForgiveFeeCommandResponse> for ForgiveFeeCommand {
    async fn execute(&self, req: ForgiveFeeCommandRequest) -> Result<ForgiveFeeCommandResponse, CommandError> {
        self.fee_service.forgive_fee(req.fee_id.as_str(), req.reason, req.created_by)
            .await.map_err(CommandError::from).map(|(fee, payment)| ForgiveFeeCommandResponse::new(fee, payment))
    }
}
