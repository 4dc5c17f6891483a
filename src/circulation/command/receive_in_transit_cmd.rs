use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::core::command::{Command, CommandError};
use crate::requests::dto::RequestDto;

pub(crate) struct ReceiveInTransitCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl ReceiveInTransitCommand {
    pub(crate) fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReceiveInTransitCommandRequest {
    item_barcode: String,
    service_point_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReceiveInTransitCommandResponse {
    pub request: RequestDto,
}

impl ReceiveInTransitCommandResponse {
    pub fn new(request: RequestDto) -> Self {
        Self {
            request,
        }
    }
}

#[async_trait]
impl Command<ReceiveInTransitCommandRequest, ReceiveInTransitCommandResponse> for ReceiveInTransitCommand {
    async fn execute(&self, req: ReceiveInTransitCommandRequest) -> Result<ReceiveInTransitCommandResponse, CommandError> {
        self.circulation_service.receive_in_transit(req.item_barcode.as_str(), req.service_point_id.as_str())
            .await.map_err(CommandError::from).map(ReceiveInTransitCommandResponse::new)
    }
}
