use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::fees::domain::FeeService;
use crate::fees::dto::FeeDto;

pub(crate) struct SuspendFeeCommand {
    fee_service: Box<dyn FeeService>,
}

impl SuspendFeeCommand {
    pub(crate) fn new(fee_service: Box<dyn FeeService>) -> Self {
        Self {
            fee_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuspendFeeCommandRequest {
    fee_id: String,
}

impl SuspendFeeCommandRequest {
    pub fn new(fee_id: &str) -> Self {
        Self {
            fee_id: fee_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SuspendFeeCommandResponse {
    pub fee: FeeDto,
}

impl SuspendFeeCommandResponse {
    pub fn new(fee: FeeDto) -> Self {
        Self {
            fee,
        }
    }
}

#[async_trait]
impl Command<SuspendFeeCommandRequest, SuspendFeeCommandResponse> for SuspendFeeCommand {
    async fn execute(&self, req: SuspendFeeCommandRequest) -> Result<SuspendFeeCommandResponse, CommandError> {
        self.fee_service.suspend_fee(req.fee_id.as_str())
            .await.map_err(CommandError::from).map(SuspendFeeCommandResponse::new)
    }
}
