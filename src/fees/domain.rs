pub mod model;
pub mod service;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use crate::core::library::{FeeType, LibraryResult, PaginatedResult, PaymentMethod};
use crate::core::transaction::ChangeSet;
use crate::fees::dto::{FeeDto, FeeFilter, PaymentDto};
use crate::loans::dto::LoanDto;
use crate::patrons::dto::PatronDto;

// FeeService manages fees and their payment ledger. Every change of an existing fee runs
// under the lock of that fee and commits the fee with its new payment in one transaction.
#[async_trait]
pub(crate) trait FeeService: Sync + Send {
    // stages an overdue fine for a closed loan into the check-in transaction, None when not late
    async fn assess_overdue(&self, changes: &mut ChangeSet, loan: &LoanDto) -> LibraryResult<Option<FeeDto>>;

    async fn create_fee(&self, patron: &PatronDto, fee_type: FeeType, amount: Decimal, reason: &str,
                        description: Option<String>, item_id: Option<String>,
                        due_date: Option<NaiveDateTime>) -> LibraryResult<FeeDto>;

    async fn apply_payment(&self, fee_id: &str, amount: Decimal, method: PaymentMethod,
                           note: Option<String>, created_by: Option<String>) -> LibraryResult<(FeeDto, PaymentDto)>;

    async fn waive_fee(&self, fee_id: &str, reason: Option<String>, created_by: Option<String>) -> LibraryResult<(FeeDto, PaymentDto)>;

    async fn forgive_fee(&self, fee_id: &str, reason: Option<String>, created_by: Option<String>) -> LibraryResult<(FeeDto, PaymentDto)>;

    async fn suspend_fee(&self, fee_id: &str) -> LibraryResult<FeeDto>;

    async fn resume_fee(&self, fee_id: &str) -> LibraryResult<FeeDto>;

    // remaining balance of every open or suspended fee of the patron
    async fn outstanding_balance(&self, patron_id: &str) -> LibraryResult<Decimal>;

    async fn find_fee_by_id(&self, fee_id: &str) -> LibraryResult<FeeDto>;

    async fn query_fees(&self, filter: &FeeFilter, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<FeeDto>>;

    async fn query_payments(&self, fee_id: &str, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<PaymentDto>>;
}
