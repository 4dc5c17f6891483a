use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::fees::domain::FeeService;
use crate::fees::dto::FeeDto;

pub(crate) struct ResumeFeeCommand {
    fee_service: Box<dyn FeeService>,
}

impl ResumeFeeCommand {
    pub(crate) fn new(fee_service: Box<dyn FeeService>) -> Self {
        Self {
            fee_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResumeFeeCommandRequest {
    fee_id: String,
}

impl ResumeFeeCommandRequest {
    pub fn new(fee_id: &str) -> Self {
        Self {
            fee_id: fee_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ResumeFeeCommandResponse {
    pub fee: FeeDto,
}

impl ResumeFeeCommandResponse {
    pub fn new(fee: FeeDto) -> Self {
        Self {
            fee,
        }
    }
}

#[async_trait]
impl Command<ResumeFeeCommandRequest, ResumeFeeCommandResponse> for ResumeFeeCommand {
    async fn execute(&self, req: ResumeFeeCommandRequest) -> Result<ResumeFeeCommandResponse, CommandError> {
        self.fee_service.resume_fee(req.fee_id.as_str())
            .await.map_err(CommandError::from).map(ResumeFeeCommandResponse::new)
    }
}
