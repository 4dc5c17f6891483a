use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::core::command::{Command, CommandError};
use crate::requests::dto::RequestDto;

pub(crate) struct CancelRequestCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl CancelRequestCommand {
    pub(crate) fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelRequestCommandRequest {
    request_id: String,
}

impl CancelRequestCommandRequest {
    pub fn new(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CancelRequestCommandResponse {
    pub request: RequestDto,
}

impl CancelRequestCommandResponse {
    pub fn new(request: RequestDto) -> Self {
        Self {
            request,
        }
    }
}

#[async_trait]
impl Command<CancelRequestCommandRequest, CancelRequestCommandResponse> for CancelRequestCommand {
    async fn execute(&self, req: CancelRequestCommandRequest) -> Result<CancelRequestCommandResponse, CommandError> {
        self.circulation_service.cancel_request(req.request_id.as_str())
            .await.map_err(CommandError::from).map(CancelRequestCommandResponse::new)
    }
}
