pub mod service;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::circulation::dto::{CheckInResult, CheckOutResult, RenewResult};
use crate::core::library::{LibraryResult, PaginatedResult, RequestType};
use crate::loans::dto::{LoanFilter, LoanDto};
use crate::requests::dto::{RequestDto, RequestFilter};

// CirculationService drives loans, hold queues and overdue fines of an item as one
// transaction per operation. Every mutating operation runs under the lock of its item.
#[async_trait]
pub(crate) trait CirculationService: Sync + Send {
    async fn check_out(&self, item_barcode: &str, patron_barcode: &str, service_point_id: &str,
                       due_date: Option<NaiveDateTime>) -> LibraryResult<CheckOutResult>;

    async fn check_in(&self, item_barcode: &str, service_point_id: &str,
                      check_in_date: Option<NaiveDateTime>) -> LibraryResult<CheckInResult>;

    // without a patron barcode the current borrower renews
    async fn renew(&self, item_barcode: &str, patron_barcode: Option<&str>) -> LibraryResult<RenewResult>;

    async fn create_request(&self, item_barcode: &str, patron_barcode: &str, request_type: RequestType,
                            pickup_service_point_id: &str, expiration_date: Option<NaiveDateTime>) -> LibraryResult<RequestDto>;

    async fn cancel_request(&self, request_id: &str) -> LibraryResult<RequestDto>;

    async fn expire_pickup_window(&self, request_id: &str) -> LibraryResult<RequestDto>;

    async fn receive_in_transit(&self, item_barcode: &str, service_point_id: &str) -> LibraryResult<RequestDto>;

    async fn item_queue(&self, item_barcode: &str) -> LibraryResult<Vec<RequestDto>>;

    async fn find_loan_by_id(&self, loan_id: &str) -> LibraryResult<LoanDto>;

    async fn find_request_by_id(&self, request_id: &str) -> LibraryResult<RequestDto>;

    async fn list_loans(&self, filter: &LoanFilter, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<LoanDto>>;

    async fn list_requests(&self, filter: &RequestFilter, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<RequestDto>>;
}
