use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::RenewResult;
use crate::core::command::{Command, CommandError};

pub(crate) struct RenewCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl RenewCommand {
    pub(crate) fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RenewCommandRequest {
    item_barcode: String,
    #[serde(default)]
    user_barcode: Option<String>,
}

impl RenewCommandRequest {
    pub fn new(item_barcode: &str, user_barcode: Option<&str>) -> Self {
        Self {
            item_barcode: item_barcode.to_string(),
            user_barcode: user_barcode.map(|b| b.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RenewCommandResponse {
    #[serde(flatten)]
    pub renewal: RenewResult,
}

impl RenewCommandResponse {
    pub fn new(renewal: RenewResult) -> Self {
        Self {
            renewal,
        }
    }
}

#[async_trait]
impl Command<RenewCommandRequest, RenewCommandResponse> for RenewCommand {
    async fn execute(&self, req: RenewCommandRequest) -> Result<RenewCommandResponse, CommandError> {
        self.circulation_service.renew(req.item_barcode.as_str(), req.user_barcode.as_deref())
            .await.map_err(CommandError::from).map(RenewCommandResponse::new)
    }
}
