use async_trait::async_trait;
use serde::Deserialize;
use crate::circulation::domain::CirculationService;
use crate::core::command::{Command, CommandError};
use crate::core::controller::{DEFAULT_PAGE_SIZE, ListResponse};
use crate::core::library::RequestStatus;
use crate::requests::dto::{RequestDto, RequestFilter};

pub(crate) struct ListRequestsCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl ListRequestsCommand {
    pub(crate) fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListRequestsCommandRequest {
    #[serde(default)]
    status: Option<RequestStatus>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    page_size: Option<usize>,
}

impl ListRequestsCommandRequest {
    fn filter(&self) -> RequestFilter {
        RequestFilter {
            status: self.status,
            user_id: self.user_id.clone(),
            item_id: self.item_id.clone(),
        }
    }
}

pub(crate) type ListRequestsCommandResponse = ListResponse<RequestDto>;

#[async_trait]
impl Command<ListRequestsCommandRequest, ListRequestsCommandResponse> for ListRequestsCommand {
    async fn execute(&self, req: ListRequestsCommandRequest) -> Result<ListRequestsCommandResponse, CommandError> {
        let res = self.circulation_service.list_requests(&req.filter(), req.page.unwrap_or(1),
                                                         req.page_size.unwrap_or(DEFAULT_PAGE_SIZE)).await?;
        let meta = res.meta();
        Ok(ListResponse { data: res.records, meta })
    }
}
