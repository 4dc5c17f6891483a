use async_trait::async_trait;
use serde::Deserialize;
use crate::circulation::domain::CirculationService;
use crate::core::command::{Command, CommandError};
use crate::core::controller::{DEFAULT_PAGE_SIZE, ListResponse};
use crate::core::library::LoanStatus;
use crate::loans::dto::{LoanDto, LoanFilter};

pub(crate) struct ListLoansCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl ListLoansCommand {
    pub(crate) fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListLoansCommandRequest {
    #[serde(default)]
    status: Option<LoanStatus>,
    #[serde(default)]
    overdue_only: Option<bool>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    item_id: Option<String>,
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    page_size: Option<usize>,
}

impl ListLoansCommandRequest {
    fn filter(&self) -> LoanFilter {
        LoanFilter {
            status: self.status,
            overdue_only: self.overdue_only.unwrap_or(false),
            user_id: self.user_id.clone(),
            item_id: self.item_id.clone(),
        }
    }
}

pub(crate) type ListLoansCommandResponse = ListResponse<LoanDto>;

#[async_trait]
impl Command<ListLoansCommandRequest, ListLoansCommandResponse> for ListLoansCommand {
    async fn execute(&self, req: ListLoansCommandRequest) -> Result<ListLoansCommandResponse, CommandError> {
        let res = self.circulation_service.list_loans(&req.filter(), req.page.unwrap_or(1),
                                                      req.page_size.unwrap_or(DEFAULT_PAGE_SIZE)).await?;
        let meta = res.meta();
        Ok(ListResponse { data: res.records, meta })
    }
}
