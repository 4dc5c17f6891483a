use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::core::command::{Command, CommandError};
use crate::requests::dto::RequestDto;

pub(crate) struct ItemQueueCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl ItemQueueCommand {
    pub(crate) fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemQueueCommandRequest {
    item_barcode: String,
}

impl ItemQueueCommandRequest {
    pub fn new(item_barcode: &str) -> Self {
        Self {
            item_barcode: item_barcode.to_string(),
        }
    }
}

// open requests of the item by queue position
#[derive(Debug, Serialize)]
pub(crate) struct ItemQueueCommandResponse {
    pub data: Vec<RequestDto>,
}

impl ItemQueueCommandResponse {
    pub fn new(data: Vec<RequestDto>) -> Self {
        Self {
            data,
        }
    }
}

#[async_trait]
impl Command<ItemQueueCommandRequest, ItemQueueCommandResponse> for ItemQueueCommand {
    async fn execute(&self, req: ItemQueueCommandRequest) -> Result<ItemQueueCommandResponse, CommandError> {
        self.circulation_service.item_queue(req.item_barcode.as_str())
            .await.map_err(CommandError::from).map(ItemQueueCommandResponse::new)
    }
}
