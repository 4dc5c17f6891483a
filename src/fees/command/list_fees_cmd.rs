use async_trait::async_trait;
use serde::Deserialize;
use crate::core::command::{Command, CommandError};
use crate::core::controller::{DEFAULT_PAGE_SIZE, ListResponse};
use crate::core::library::FeeStatus;
use crate::fees::domain::FeeService;
use crate::fees::dto::{FeeDto, FeeFilter};

pub(crate) struct ListFeesCommand {
    fee_service: Box<dyn FeeService>,
}

impl ListFeesCommand {
    pub(crate) fn new(fee_service: Box<dyn FeeService>) -> Self {
        Self {
            fee_service,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListFeesCommandRequest {
    #[serde(default)]
    status: Option<FeeStatus>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    page_size: Option<usize>,
}

impl ListFeesCommandRequest {
    pub fn for_patron(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..Default::default()
        }
    }

    fn filter(&self) -> FeeFilter {
        FeeFilter {
            status: self.status,
            user_id: self.user_id.clone(),
            item_id: self.item_id.clone(),
        }
    }
}

pub(crate) type ListFeesCommandResponse = ListResponse<FeeDto>;

#[async_trait]
impl Command<ListFeesCommandRequest, ListFeesCommandResponse> for ListFeesCommand {
    async fn execute(&self, req: ListFeesCommandRequest) -> Result<ListFeesCommandResponse, CommandError> {
        let res = self.fee_service.query_fees(&req.filter(), req.page.unwrap_or(1),
                                              req.page_size.unwrap_or(DEFAULT_PAGE_SIZE)).await?;
        let meta = res.meta();
        Ok(ListResponse { data: res.records, meta })
    }
}
