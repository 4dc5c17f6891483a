use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::core::command::{Command, CommandError};
use crate::requests::dto::RequestDto;

pub(crate) struct ExpirePickupCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl ExpirePickupCommand {
    pub(crate) fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExpirePickupCommandRequest {
    request_id: String,
}

impl ExpirePickupCommandRequest {
    pub fn new(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExpirePickupCommandResponse {
    pub request: RequestDto,
}

impl ExpirePickupCommandResponse {
    pub fn new(request: RequestDto) -> Self {
        Self {
            request,
        }
    }
}

#[async_trait]
impl Command<ExpirePickupCommandRequest, ExpirePickupCommandResponse> for ExpirePickupCommand {
    async fn execute(&self, req: ExpirePickupCommandRequest) -> Result<ExpirePickupCommandResponse, CommandError> {
        self.circulation_service.expire_pickup_window(req.request_id.as_str())
            .await.map_err(CommandError::from).map(ExpirePickupCommandResponse::new)
    }
}
