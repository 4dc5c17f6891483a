use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{debug, info};
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult, ReasonCode, RequestStatus, RequestType};
use crate::core::transaction::ChangeSet;
use crate::items::dto::ItemDto;
use crate::patrons::dto::PatronDto;
use crate::requests::domain::model::RequestEntity;
use crate::requests::domain::queue::RequestQueue;
use crate::requests::domain::RequestService;
use crate::requests::dto::{RequestDto, RequestFilter};
use crate::requests::repository::RequestRepository;

pub(crate) struct RequestServiceImpl {
    config: Configuration,
    request_repository: Box<dyn RequestRepository>,
}

impl RequestServiceImpl {
    pub(crate) fn new(config: &Configuration, request_repository: Box<dyn RequestRepository>) -> Self {
        RequestServiceImpl {
            config: config.clone(),
            request_repository,
        }
    }

    // reads the requests the item lists by key, so the queue is as recent as the item itself
    async fn load_queue(&self, item: &ItemDto) -> LibraryResult<RequestQueue> {
        let mut requests = vec![];
        for request_id in item.request_ids.iter() {
            let request = match self.request_repository.get(request_id).await {
                Ok(request) => request,
                Err(LibraryError::NotFound { .. }) => return Err(LibraryError::invariant(
                    format!("item {} lists missing request {}", item.barcode, request_id).as_str(),
                    ReasonCode::ItemStateMismatch)),
                Err(err) => return Err(err),
            };
            if !request.is_open() || request.item_id != item.item_id {
                return Err(LibraryError::invariant(
                    format!("item {} lists request {} which is {}", item.barcode, request_id, request.request_status).as_str(),
                    ReasonCode::ItemStateMismatch));
            }
            requests.push(request);
        }
        RequestQueue::new(item.item_id.as_str(), requests)
    }

    fn stage(&self, changes: &mut ChangeSet, queue: RequestQueue, item: &mut ItemDto) -> LibraryResult<()> {
        item.request_ids = queue.stage(changes, self.config.branch_id.as_str())?;
        Ok(())
    }

    async fn find_open_request(&self, request_id: &str) -> LibraryResult<RequestEntity> {
        let request = match self.request_repository.get(request_id).await {
            Ok(request) => request,
            Err(LibraryError::NotFound { .. }) => return Err(LibraryError::not_found(
                format!("request not found for {}", request_id).as_str(), ReasonCode::RequestNotFound)),
            Err(err) => return Err(err),
        };
        if !request.is_open() {
            return Err(LibraryError::policy(
                format!("request {} is already {}", request_id, request.request_status).as_str(),
                ReasonCode::RequestClosed));
        }
        Ok(request)
    }

    // where the item waits for the next request, None leaves every promotion on the hold shelf
    fn routing(&self, location: &str) -> Option<String> {
        if self.config.in_transit_routing {
            Some(location.to_string())
        } else {
            None
        }
    }
}

#[async_trait]
impl RequestService for RequestServiceImpl {
    async fn create_request(&self, changes: &mut ChangeSet, item: &mut ItemDto, patron: &PatronDto,
                            request_type: RequestType, pickup_service_point_id: &str,
                            expiration_date: Option<NaiveDateTime>, borrower_id: Option<&str>) -> LibraryResult<RequestDto> {
        if !patron.active {
            return Err(LibraryError::policy(
                format!("patron {} is not active", patron.barcode).as_str(), ReasonCode::PatronInactive));
        }
        if borrower_id == Some(patron.patron_id.as_str()) {
            return Err(LibraryError::policy(
                format!("patron {} already borrows item {}", patron.barcode, item.barcode).as_str(),
                ReasonCode::RequesterIsBorrower));
        }
        let now = changes.now();
        if let Some(expiration) = expiration_date {
            if expiration <= now {
                return Err(LibraryError::validation(
                    format!("expiration date {} is not in the future", expiration).as_str(), None));
            }
        }
        let mut queue = self.load_queue(item).await?;
        if let Some(existing) = queue.find_by_patron(patron.patron_id.as_str()) {
            return Err(LibraryError::conflict(
                format!("patron {} already has request {} for item {}", patron.barcode, existing.request_id, item.barcode).as_str(),
                ReasonCode::DuplicateRequest));
        }
        let active = self.count_active_for_patron(patron.patron_id.as_str()).await?;
        if active as i64 >= self.config.max_holds {
            return Err(LibraryError::policy(
                format!("patron {} already has {} open requests", patron.barcode, active).as_str(),
                ReasonCode::MaxHoldsReached));
        }
        let item_available = borrower_id.is_none();
        if item_available && queue.is_empty() && request_type != RequestType::Page {
            return Err(LibraryError::policy(
                format!("item {} is available for check-out", item.barcode).as_str(), ReasonCode::ItemAvailable));
        }

        let request = RequestEntity::new(item.item_id.as_str(), item.barcode.as_str(),
                                         patron.patron_id.as_str(), patron.barcode.as_str(),
                                         request_type, pickup_service_point_id, expiration_date, now);
        let request_id = request.request_id.to_string();
        let position = queue.enqueue(request, self.config.recall_priority);
        if item_available && request_type == RequestType::Page {
            let location = self.routing(item.location_id.as_str());
            queue.promote(now, self.config.hold_shelf_days, location.as_deref())?;
        }
        let created = queue.requests().iter()
            .find(|r| r.request_id == request_id)
            .map(RequestDto::from)
            .ok_or_else(|| LibraryError::invariant(
                format!("request {} lost from queue of item {}", request_id, item.barcode).as_str(),
                ReasonCode::QueueCorrupted))?;
        self.stage(changes, queue, item)?;
        info!("{} request {} of patron {} queued at {} for item {}",
            request_type, created.request_id, patron.barcode, position, item.barcode);
        Ok(created)
    }

    async fn cancel_request(&self, changes: &mut ChangeSet, request_id: &str, item: &mut ItemDto,
                            item_available: bool) -> LibraryResult<RequestDto> {
        self.find_open_request(request_id).await?;
        let now = changes.now();
        let mut queue = self.load_queue(item).await?;
        let was_promoted = queue.requests().iter()
            .any(|r| r.request_id == request_id && r.request_status != RequestStatus::OpenNotYetFilled);
        let mut cancelled = queue.close(request_id, RequestStatus::ClosedCancelled, now)?;
        if item_available {
            // a promoted request has the item on its way to, or waiting at, its pickup service point
            let location = if was_promoted {
                self.routing(cancelled.pickup_service_point_id.as_str())
            } else {
                self.routing(item.location_id.as_str())
            };
            if let Some(next) = queue.promote(now, self.config.hold_shelf_days, location.as_deref())? {
                debug!("request {} promoted after cancellation of {}", next.request_id, request_id);
            }
        }
        self.stage(changes, queue, item)?;
        cancelled.version += 1;
        info!("request {} for item {} cancelled", request_id, item.barcode);
        Ok(RequestDto::from(&cancelled))
    }

    async fn fulfill(&self, changes: &mut ChangeSet, item: &mut ItemDto, patron: &PatronDto) -> LibraryResult<Option<RequestDto>> {
        let mut queue = self.load_queue(item).await?;
        let request_id = match queue.head() {
            None => return Ok(None),
            Some(head) if head.patron_id == patron.patron_id && head.request_status == RequestStatus::OpenAwaitingPickup => {
                head.request_id.to_string()
            }
            Some(_) => {
                return Err(LibraryError::policy(
                    format!("item {} is held for another patron", item.barcode).as_str(), ReasonCode::ItemNotAvailable));
            }
        };
        let now = changes.now();
        let mut filled = queue.close(request_id.as_str(), RequestStatus::ClosedFilled, now)?;
        self.stage(changes, queue, item)?;
        filled.version += 1;
        info!("request {} filled by check-out of item {}", filled.request_id, item.barcode);
        Ok(Some(RequestDto::from(&filled)))
    }

    async fn on_item_became_available(&self, changes: &mut ChangeSet, item: &mut ItemDto,
                                      service_point_id: &str) -> LibraryResult<Option<RequestDto>> {
        let mut queue = self.load_queue(item).await?;
        if queue.is_empty() {
            return Ok(None);
        }
        let now = changes.now();
        let location = self.routing(service_point_id);
        let promoted = queue.promote(now, self.config.hold_shelf_days, location.as_deref())?;
        self.stage(changes, queue, item)?;
        Ok(promoted.map(|mut r| {
            r.version += 1;
            info!("request {} of patron {} is {} for item {}", r.request_id, r.patron_barcode, r.request_status, item.barcode);
            RequestDto::from(&r)
        }))
    }

    async fn expire_pickup(&self, changes: &mut ChangeSet, request_id: &str, item: &mut ItemDto,
                           item_available: bool) -> LibraryResult<RequestDto> {
        let request = self.find_open_request(request_id).await?;
        if request.request_status != RequestStatus::OpenAwaitingPickup {
            return Err(LibraryError::policy(
                format!("request {} is {}", request_id, request.request_status).as_str(),
                ReasonCode::RequestNotAwaitingPickup));
        }
        let now = changes.now();
        if !request.pickup_window_elapsed(now) {
            return Err(LibraryError::policy(
                format!("request {} can be picked up until {:?}", request_id, request.hold_shelf_expiration_date).as_str(),
                ReasonCode::PickupWindowOpen));
        }
        let mut queue = self.load_queue(item).await?;
        let mut expired = queue.close(request_id, RequestStatus::ClosedPickupExpired, now)?;
        if item_available {
            let location = self.routing(expired.pickup_service_point_id.as_str());
            queue.promote(now, self.config.hold_shelf_days, location.as_deref())?;
        }
        self.stage(changes, queue, item)?;
        expired.version += 1;
        info!("pickup window of request {} for item {} expired", request_id, item.barcode);
        Ok(RequestDto::from(&expired))
    }

    async fn receive_in_transit(&self, changes: &mut ChangeSet, item: &mut ItemDto,
                                service_point_id: &str) -> LibraryResult<RequestDto> {
        let mut queue = self.load_queue(item).await?;
        let now = changes.now();
        let mut received = queue.receive(service_point_id, now, self.config.hold_shelf_days)?;
        self.stage(changes, queue, item)?;
        received.version += 1;
        info!("item {} received at {} for request {}", item.barcode, service_point_id, received.request_id);
        Ok(RequestDto::from(&received))
    }

    async fn item_queue(&self, item: &ItemDto) -> LibraryResult<Vec<RequestDto>> {
        let queue = self.load_queue(item).await?;
        Ok(queue.requests().iter().map(RequestDto::from).collect())
    }

    async fn has_active_requests(&self, item: &ItemDto) -> LibraryResult<bool> {
        Ok(!self.load_queue(item).await?.is_empty())
    }

    async fn count_active_for_patron(&self, patron_id: &str) -> LibraryResult<usize> {
        Ok(self.request_repository.find_active_for_patron(patron_id).await?.len())
    }

    async fn find_request_by_id(&self, request_id: &str) -> LibraryResult<RequestDto> {
        match self.request_repository.get(request_id).await {
            Ok(request) => Ok(RequestDto::from(&request)),
            Err(LibraryError::NotFound { .. }) => Err(LibraryError::not_found(
                format!("request not found for {}", request_id).as_str(), ReasonCode::RequestNotFound)),
            Err(err) => Err(err),
        }
    }

    async fn query_requests(&self, filter: &RequestFilter, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<RequestDto>> {
        let res = self.request_repository.query(&filter.to_predicate(), page, page_size).await?;
        Ok(res.map(|r| RequestDto::from(r)))
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use chrono::{Duration, Utc};
    use lazy_static::lazy_static;
    use uuid::Uuid;
    use crate::core::domain::Configuration;
    use crate::core::library::{LibraryError, ReasonCode, RequestStatus, RequestType};
    use crate::core::repository::RepositoryStore;
    use crate::core::transaction::{ChangeSet, TransactionManager};
    use crate::core::transaction::memory_transaction_manager::MemoryTransactionManager;
    use crate::items::dto::ItemDto;
    use crate::patrons::dto::PatronDto;
    use crate::requests::domain::RequestService;
    use crate::requests::dto::RequestFilter;
    use crate::requests::factory;
    use crate::utils::memory::MemoryStore;

    lazy_static! {
        static ref SUT_SVC: AsyncOnce<Box<dyn RequestService>> = AsyncOnce::new(async {
                let mut config = Configuration::new("test");
                config.max_holds = 2;
                factory::create_request_service(&config, RepositoryStore::InMemory).await.expect("request service")
            });
    }

    fn item() -> ItemDto {
        ItemDto::new(format!("IT-{}", Uuid::new_v4()).as_str(), "title", "sp1")
    }

    fn patron() -> PatronDto {
        PatronDto::new(format!("PT-{}", Uuid::new_v4()).as_str(), "undergrad")
    }

    async fn commit(changes: &ChangeSet) {
        MemoryTransactionManager::new(MemoryStore::shared()).commit(changes).await.expect("should commit");
    }

    #[tokio::test]
    async fn test_should_queue_and_promote_hold() {
        let request_svc = SUT_SVC.get().await;
        let (mut item, borrower, holder) = (item(), patron(), patron());
        let mut changes = ChangeSet::new();
        let request = request_svc.create_request(&mut changes, &mut item, &holder, RequestType::Hold, "sp1", None,
                                                 Some(borrower.patron_id.as_str())).await.expect("should create");
        assert_eq!(1, request.position);
        assert_eq!(RequestStatus::OpenNotYetFilled, request.status);
        assert_eq!(vec![request.request_id.to_string()], item.request_ids);
        commit(&changes).await;

        let mut changes = ChangeSet::new();
        let promoted = request_svc.on_item_became_available(&mut changes, &mut item, "sp1").await
            .expect("should promote").expect("holder promoted");
        assert_eq!(RequestStatus::OpenAwaitingPickup, promoted.status);
        commit(&changes).await;

        let err = request_svc.fulfill(&mut ChangeSet::new(), &mut item, &borrower).await.unwrap_err();
        assert!(matches!(err, LibraryError::PolicyViolation { reason_code: ReasonCode::ItemNotAvailable, .. }));
        let mut changes = ChangeSet::new();
        let filled = request_svc.fulfill(&mut changes, &mut item, &holder).await.expect("should fill").expect("filled");
        assert_eq!(RequestStatus::ClosedFilled, filled.status);
        commit(&changes).await;
        let loaded = request_svc.find_request_by_id(request.request_id.as_str()).await.expect("should find");
        assert_eq!(filled, loaded);
        assert!(item.request_ids.is_empty());
        assert!(request_svc.item_queue(&item).await.expect("queue").is_empty());
    }

    #[tokio::test]
    async fn test_should_keep_positions_dense_after_cancel() {
        let request_svc = SUT_SVC.get().await;
        let (mut item, borrower) = (item(), patron());
        let mut ids = vec![];
        for _ in 0..3 {
            let mut changes = ChangeSet::new();
            let request = request_svc.create_request(&mut changes, &mut item, &patron(), RequestType::Hold, "sp1", None,
                                                     Some(borrower.patron_id.as_str())).await.expect("should create");
            commit(&changes).await;
            ids.push(request.request_id);
        }
        let mut changes = ChangeSet::new();
        let cancelled = request_svc.cancel_request(&mut changes, ids[1].as_str(), &mut item, false).await.expect("should cancel");
        assert_eq!(RequestStatus::ClosedCancelled, cancelled.status);
        commit(&changes).await;
        let queue = request_svc.item_queue(&item).await.expect("queue");
        assert_eq!(vec![1, 2], queue.iter().map(|r| r.position).collect::<Vec<i64>>());
        assert_eq!(vec![ids[0].to_string(), ids[2].to_string()], queue.iter().map(|r| r.request_id.to_string()).collect::<Vec<String>>());
        assert_eq!(vec![ids[0].to_string(), ids[2].to_string()], item.request_ids);

        let err = request_svc.cancel_request(&mut ChangeSet::new(), ids[1].as_str(), &mut item, false).await.unwrap_err();
        assert!(matches!(err, LibraryError::PolicyViolation { reason_code: ReasonCode::RequestClosed, .. }));
    }

    #[tokio::test]
    async fn test_should_reject_invalid_requests() {
        let request_svc = SUT_SVC.get().await;
        let (mut requested, borrower, holder) = (item(), patron(), patron());
        let borrower_id = Some(borrower.patron_id.as_str());
        let err = request_svc.create_request(&mut ChangeSet::new(), &mut requested, &borrower, RequestType::Hold, "sp1", None, borrower_id).await.unwrap_err();
        assert!(matches!(err, LibraryError::PolicyViolation { reason_code: ReasonCode::RequesterIsBorrower, .. }));
        let err = request_svc.create_request(&mut ChangeSet::new(), &mut requested, &holder, RequestType::Hold, "sp1", None, None).await.unwrap_err();
        assert!(matches!(err, LibraryError::PolicyViolation { reason_code: ReasonCode::ItemAvailable, .. }));

        let mut changes = ChangeSet::new();
        request_svc.create_request(&mut changes, &mut requested, &holder, RequestType::Hold, "sp1", None, borrower_id).await.expect("should create");
        commit(&changes).await;
        let err = request_svc.create_request(&mut ChangeSet::new(), &mut requested, &holder, RequestType::Recall, "sp1", None, borrower_id).await.unwrap_err();
        assert!(matches!(err, LibraryError::Conflict { reason_code: ReasonCode::DuplicateRequest, .. }));

        let mut changes = ChangeSet::new();
        request_svc.create_request(&mut changes, &mut item(), &holder, RequestType::Hold, "sp1", None, borrower_id).await.expect("should create");
        commit(&changes).await;
        let err = request_svc.create_request(&mut ChangeSet::new(), &mut item(), &holder, RequestType::Hold, "sp1", None, borrower_id).await.unwrap_err();
        assert!(matches!(err, LibraryError::PolicyViolation { reason_code: ReasonCode::MaxHoldsReached, .. }));
        assert_eq!(2, request_svc.count_active_for_patron(holder.patron_id.as_str()).await.expect("count"));

        let mut inactive = patron();
        inactive.active = false;
        let err = request_svc.create_request(&mut ChangeSet::new(), &mut requested, &inactive, RequestType::Hold, "sp1", None, borrower_id).await.unwrap_err();
        assert!(matches!(err, LibraryError::PolicyViolation { reason_code: ReasonCode::PatronInactive, .. }));
    }

    #[tokio::test]
    async fn test_should_page_available_item_in_transit() {
        let request_svc = SUT_SVC.get().await;
        let (mut item, holder) = (item(), patron());
        let mut changes = ChangeSet::new();
        let request = request_svc.create_request(&mut changes, &mut item, &holder, RequestType::Page, "sp2", None, None).await.expect("should page");
        assert_eq!(RequestStatus::OpenInTransit, request.status);
        commit(&changes).await;
        assert!(request_svc.has_active_requests(&item).await.expect("active"));

        let mut changes = ChangeSet::new();
        let received = request_svc.receive_in_transit(&mut changes, &mut item, "sp2").await.expect("should receive");
        assert_eq!(RequestStatus::OpenAwaitingPickup, received.status);
        commit(&changes).await;
        let err = request_svc.receive_in_transit(&mut ChangeSet::new(), &mut item, "sp2").await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { reason_code: ReasonCode::RequestNotFound, .. }));
    }

    #[tokio::test]
    async fn test_should_expire_pickup_and_promote_next() {
        let request_svc = SUT_SVC.get().await;
        let (mut item, borrower, first, second) = (item(), patron(), patron(), patron());
        for holder in [&first, &second] {
            let mut changes = ChangeSet::new();
            request_svc.create_request(&mut changes, &mut item, holder, RequestType::Hold, "sp1", None,
                                       Some(borrower.patron_id.as_str())).await.expect("should create");
            commit(&changes).await;
        }
        let mut changes = ChangeSet::new();
        let promoted = request_svc.on_item_became_available(&mut changes, &mut item, "sp1").await.expect("promote").expect("first");
        commit(&changes).await;
        let err = request_svc.expire_pickup(&mut ChangeSet::new(), promoted.request_id.as_str(), &mut item, true).await.unwrap_err();
        assert!(matches!(err, LibraryError::PolicyViolation { reason_code: ReasonCode::PickupWindowOpen, .. }));

        let mut changes = ChangeSet::at(Utc::now().naive_utc() + Duration::days(11));
        let expired = request_svc.expire_pickup(&mut changes, promoted.request_id.as_str(), &mut item, true).await.expect("should expire");
        assert_eq!(RequestStatus::ClosedPickupExpired, expired.status);
        commit(&changes).await;
        let queue = request_svc.item_queue(&item).await.expect("queue");
        assert_eq!(1, queue.len());
        assert_eq!(second.patron_id, queue[0].patron_id);
        assert_eq!(RequestStatus::OpenAwaitingPickup, queue[0].status);

        let filter = RequestFilter { status: Some(RequestStatus::ClosedPickupExpired), user_id: Some(first.patron_id.to_string()), item_id: None };
        let res = request_svc.query_requests(&filter, 1, 10).await.expect("should query");
        assert_eq!(1, res.total_items);
    }

    #[tokio::test]
    async fn test_should_reject_item_listing_closed_request() {
        let request_svc = SUT_SVC.get().await;
        let (mut item, borrower, holder) = (item(), patron(), patron());
        let mut changes = ChangeSet::new();
        let request = request_svc.create_request(&mut changes, &mut item, &holder, RequestType::Hold, "sp1", None,
                                                 Some(borrower.patron_id.as_str())).await.expect("should create");
        commit(&changes).await;
        let mut stale = item.clone();
        let mut changes = ChangeSet::new();
        request_svc.cancel_request(&mut changes, request.request_id.as_str(), &mut item, false).await.expect("should cancel");
        commit(&changes).await;

        let err = request_svc.item_queue(&stale).await.unwrap_err();
        assert!(matches!(err, LibraryError::Invariant { reason_code: ReasonCode::ItemStateMismatch, .. }));
        stale.request_ids = vec!["missing".to_string()];
        let err = request_svc.item_queue(&stale).await.unwrap_err();
        assert!(matches!(err, LibraryError::Invariant { reason_code: ReasonCode::ItemStateMismatch, .. }));
    }
}
