use async_trait::async_trait;
use serde::Deserialize;
use crate::core::command::{Command, CommandError};
use crate::core::controller::{DEFAULT_PAGE_SIZE, ListResponse};
use crate::fees::domain::FeeService;
use crate::fees::dto::PaymentDto;

pub(crate) struct ListPaymentsCommand {
    fee_service: Box<dyn FeeService>,
}

impl ListPaymentsCommand {
    pub(crate) fn new(fee_service: Box<dyn FeeService>) -> Self {
        Self {
            fee_service,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListPaymentsCommandRequest {
    #[serde(default)]
    pub fee_id: String,
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    page_size: Option<usize>,
}

impl ListPaymentsCommandRequest {
    pub fn new(fee_id: &str) -> Self {
        Self {
            fee_id: fee_id.to_string(),
            ..Default::default()
        }
    }
}

pub(crate) type ListPaymentsCommandResponse = ListResponse<PaymentDto>;

#[async_trait]
impl Command<ListPaymentsCommandRequest, ListPaymentsCommandResponse> for ListPaymentsCommand {
    async fn execute(&self, req: ListPaymentsCommandRequest) -> Result<ListPaymentsCommandResponse, CommandError> {
        // unknown fees answer not found rather than an empty ledger
        let _ = self.fee_service.find_fee_by_id(req.fee_id.as_str()).await?;
        let res = self.fee_service.query_payments(req.fee_id.as_str(), req.page.unwrap_or(1),
                                                  req.page_size.unwrap_or(DEFAULT_PAGE_SIZE)).await?;
        let meta = res.meta();
        Ok(ListResponse { data: res.records, meta })
    }
}
