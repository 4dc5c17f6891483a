use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::fees::domain::FeeService;
use crate::fees::dto::FeeDto;

pub(crate) struct GetFeeCommand {
    fee_service: Box<dyn FeeService>,
}

impl GetFeeCommand {
    pub(crate) fn new(fee_service: Box<dyn FeeService>) -> Self {
        Self {
            fee_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetFeeCommandRequest {
    fee_id: String,
}

impl GetFeeCommandRequest {
    pub fn new(fee_id: &str) -> Self {
        Self {
            fee_id: fee_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetFeeCommandResponse {
    pub fee: FeeDto,
}

impl GetFeeCommandResponse {
    pub fn new(fee: FeeDto) -> Self {
        Self {
            fee,
        }
    }
}

#[async_trait]
impl Command<GetFeeCommandRequest, GetFeeCommandResponse> for GetFeeCommand {
    async fn execute(&self, req: GetFeeCommandRequest) -> Result<GetFeeCommandResponse, CommandError> {
        self.fee_service.find_fee_by_id(req.fee_id.as_str())
            .await.map_err(CommandError::from).map(GetFeeCommandResponse::new)
    }
}
