pub mod model;
pub mod queue;
pub mod service;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::core::library::{LibraryResult, PaginatedResult, RequestType};
use crate::core::transaction::ChangeSet;
use crate::items::dto::ItemDto;
use crate::patrons::dto::PatronDto;
use crate::requests::dto::{RequestDto, RequestFilter};

// RequestService keeps the hold queue of every item. Like the loan ledger it only stages
// writes into the caller's ChangeSet, which must hold the item lock of the queue it touches.
#[async_trait]
pub(crate) trait RequestService: Sync + Send {
    // `borrower_id` is the patron of the item's open loan, None when the item is available.
    // Every mutating operation keeps `item.request_ids` in step with the queue it stages, the
    // caller stages the item.
    async fn create_request(&self, changes: &mut ChangeSet, item: &mut ItemDto, patron: &PatronDto,
                            request_type: RequestType, pickup_service_point_id: &str,
                            expiration_date: Option<NaiveDateTime>, borrower_id: Option<&str>) -> LibraryResult<RequestDto>;

    async fn cancel_request(&self, changes: &mut ChangeSet, request_id: &str, item: &mut ItemDto,
                            item_available: bool) -> LibraryResult<RequestDto>;

    // fills the head request of the item for a check-out by `patron`, None when nobody waits
    async fn fulfill(&self, changes: &mut ChangeSet, item: &mut ItemDto, patron: &PatronDto) -> LibraryResult<Option<RequestDto>>;

    async fn on_item_became_available(&self, changes: &mut ChangeSet, item: &mut ItemDto,
                                      service_point_id: &str) -> LibraryResult<Option<RequestDto>>;

    async fn expire_pickup(&self, changes: &mut ChangeSet, request_id: &str, item: &mut ItemDto,
                           item_available: bool) -> LibraryResult<RequestDto>;

    async fn receive_in_transit(&self, changes: &mut ChangeSet, item: &mut ItemDto,
                                service_point_id: &str) -> LibraryResult<RequestDto>;

    // open requests of the item ordered by position
    async fn item_queue(&self, item: &ItemDto) -> LibraryResult<Vec<RequestDto>>;

    async fn has_active_requests(&self, item: &ItemDto) -> LibraryResult<bool>;

    async fn count_active_for_patron(&self, patron_id: &str) -> LibraryResult<usize>;

    async fn find_request_by_id(&self, request_id: &str) -> LibraryResult<RequestDto>;

    async fn query_requests(&self, filter: &RequestFilter, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<RequestDto>>;
}
