pub mod model;
pub mod service;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::transaction::ChangeSet;
use crate::items::dto::ItemDto;
use crate::loans::dto::{LoanDto, LoanFilter};
use crate::patrons::dto::PatronDto;

// LoanService owns the loan lifecycle. Mutating operations only stage their writes and events
// into the given ChangeSet, the caller commits them together with the rest of the operation
// while it holds the item lock.
#[async_trait]
pub(crate) trait LoanService: Sync + Send {
    // points `item` at the new loan, the caller stages the item
    async fn check_out(&self, changes: &mut ChangeSet, item: &mut ItemDto, patron: &PatronDto,
                       service_point_id: &str, due_date: Option<NaiveDateTime>) -> LibraryResult<LoanDto>;

    async fn check_in(&self, changes: &mut ChangeSet, item: &mut ItemDto, service_point_id: &str,
                      check_in_date: NaiveDateTime) -> LibraryResult<LoanDto>;

    // returns the previous due date with the renewed loan
    async fn renew(&self, changes: &mut ChangeSet, item: &ItemDto, patron: &PatronDto,
                   competing_requests: bool) -> LibraryResult<(NaiveDateTime, LoanDto)>;

    // shortens the open loan of the item to now + return_days
    async fn recall(&self, changes: &mut ChangeSet, item: &ItemDto, return_days: i64) -> LibraryResult<Option<LoanDto>>;

    async fn find_open_loan(&self, item: &ItemDto) -> LibraryResult<Option<LoanDto>>;

    async fn find_loan_by_id(&self, loan_id: &str) -> LibraryResult<LoanDto>;

    async fn query_loans(&self, filter: &LoanFilter, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<LoanDto>>;
}
