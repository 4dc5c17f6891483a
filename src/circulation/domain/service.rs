use std::future::Future;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tracing::{debug, info};
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::{CheckInResult, CheckOutResult, RenewResult};
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult, ReasonCode, RequestType};
use crate::core::transaction::{ChangeSet, TransactionManager};
use crate::fees::domain::FeeService;
use crate::gateway::events::EventPublisher;
use crate::items::domain::ItemService;
use crate::items::dto::ItemDto;
use crate::loans::domain::LoanService;
use crate::loans::dto::{LoanDto, LoanFilter};
use crate::locks::{LockManager, with_lock};
use crate::patrons::domain::PatronService;
use crate::patrons::dto::PatronDto;
use crate::requests::domain::RequestService;
use crate::requests::dto::{RequestDto, RequestFilter};

// Collaborators are the services a circulation transaction spans
pub(crate) struct Collaborators {
    pub item_service: Box<dyn ItemService>,
    pub patron_service: Box<dyn PatronService>,
    pub loan_service: Box<dyn LoanService>,
    pub request_service: Box<dyn RequestService>,
    pub fee_service: Box<dyn FeeService>,
}

// Circulation is shared with the task that runs a locked operation
struct Circulation {
    config: Configuration,
    services: Collaborators,
    tx_manager: Box<dyn TransactionManager>,
    publisher: Box<dyn EventPublisher>,
}

pub(crate) struct CirculationServiceImpl {
    inner: Arc<Circulation>,
    item_locks: Arc<dyn LockManager>,
}

impl CirculationServiceImpl {
    pub(crate) fn new(config: &Configuration, services: Collaborators, tx_manager: Box<dyn TransactionManager>,
                      publisher: Box<dyn EventPublisher>, item_locks: Arc<dyn LockManager>) -> Self {
        CirculationServiceImpl {
            inner: Arc::new(Circulation {
                config: config.clone(),
                services,
                tx_manager,
                publisher,
            }),
            item_locks,
        }
    }

    // run_locked runs `f` under the item lock in a task of its own, so a caller that goes away
    // cannot stop an operation between its checks and its commit
    async fn run_locked<T, F, Fut>(&self, item_id: &str, f: F) -> LibraryResult<T>
        where T: Send + 'static,
              F: FnOnce(Arc<Circulation>) -> Fut + Send + 'static,
              Fut: Future<Output=LibraryResult<T>> + Send + 'static {
        let inner = self.inner.clone();
        let locks = self.item_locks.clone();
        let key = item_id.to_string();
        let timeout = inner.config.lock_timeout();
        let task = tokio::spawn(async move {
            with_lock(locks.as_ref(), key.as_str(), timeout, || f(inner)).await
        });
        task.await.map_err(|err| LibraryError::runtime(
            format!("circulation of item {} was aborted: {}", item_id, err).as_str(), None))?
    }

    async fn find_item(&self, item_barcode: &str) -> LibraryResult<ItemDto> {
        self.inner.services.item_service.find_item_by_barcode(item_barcode).await
    }

    async fn find_patron(&self, patron_barcode: &str) -> LibraryResult<PatronDto> {
        self.inner.services.patron_service.find_patron_by_barcode(patron_barcode).await
    }
}

impl Circulation {
    async fn commit(&self, changes: ChangeSet) -> LibraryResult<()> {
        let writes = self.tx_manager.commit(&changes).await?;
        let published = self.publisher.publish_all(changes.events()).await;
        debug!("committed {} writes and published {} of {} events", writes, published, changes.events().len());
        Ok(())
    }

    async fn check_fee_block(&self, patron: &PatronDto) -> LibraryResult<()> {
        let limit = match self.config.max_outstanding_balance {
            Some(limit) => limit,
            None => return Ok(()),
        };
        let balance = self.services.fee_service.outstanding_balance(patron.patron_id.as_str()).await?;
        if balance > limit {
            return Err(LibraryError::policy(
                format!("patron {} owes {} which exceeds {}", patron.barcode, balance, limit).as_str(),
                ReasonCode::PatronBlocked));
        }
        Ok(())
    }

    // the item read under the lock, its version guards every decision staged against it
    async fn reload(&self, item: &ItemDto) -> LibraryResult<ItemDto> {
        self.services.item_service.find_item_by_id(item.item_id.as_str()).await
    }

    async fn commit_with_item(&self, mut changes: ChangeSet, item: &mut ItemDto) -> LibraryResult<()> {
        self.services.item_service.stage_circulation(&mut changes, item)?;
        self.commit(changes).await
    }

    async fn check_out(&self, item: ItemDto, patron: PatronDto, service_point_id: String,
                       due_date: Option<NaiveDateTime>) -> LibraryResult<CheckOutResult> {
        let mut item = self.reload(&item).await?;
        let mut changes = ChangeSet::new();
        let loan = self.services.loan_service.check_out(&mut changes, &mut item, &patron, service_point_id.as_str(), due_date).await?;
        self.check_fee_block(&patron).await?;
        let filled_request = self.services.request_service.fulfill(&mut changes, &mut item, &patron).await?;
        self.commit_with_item(changes, &mut item).await?;
        Ok(CheckOutResult { loan, filled_request })
    }

    async fn check_in(&self, item: ItemDto, service_point_id: String,
                      check_in_date: Option<NaiveDateTime>) -> LibraryResult<CheckInResult> {
        let mut changes = match check_in_date {
            Some(date) if date > Utc::now().naive_utc() => return Err(LibraryError::validation(
                format!("check-in date {} is in the future", date).as_str(), Some(ReasonCode::InvalidCheckInDate))),
            Some(date) => ChangeSet::at(date),
            None => ChangeSet::new(),
        };
        let mut item = self.reload(&item).await?;
        let returned = changes.now();
        let loan = self.services.loan_service.check_in(&mut changes, &mut item, service_point_id.as_str(), returned).await?;
        let fee = self.services.fee_service.assess_overdue(&mut changes, &loan).await?;
        let next_request = self.services.request_service.on_item_became_available(&mut changes, &mut item, service_point_id.as_str()).await?;
        self.commit_with_item(changes, &mut item).await?;
        Ok(CheckInResult::new(loan, fee, next_request))
    }

    async fn renew(&self, item: ItemDto, patron: Option<PatronDto>) -> LibraryResult<RenewResult> {
        let mut item = self.reload(&item).await?;
        let patron = match patron {
            Some(patron) => patron,
            None => {
                let loan = self.services.loan_service.find_open_loan(&item).await?.ok_or_else(|| {
                    LibraryError::policy(format!("item {} has no open loan", item.barcode).as_str(), ReasonCode::NoOpenLoan)
                })?;
                self.services.patron_service.find_patron_by_id(loan.patron_id.as_str()).await?
            }
        };
        let competing = self.services.request_service.has_active_requests(&item).await?;
        let mut changes = ChangeSet::new();
        let (previous, loan) = self.services.loan_service.renew(&mut changes, &item, &patron, competing).await?;
        self.commit_with_item(changes, &mut item).await?;
        Ok(RenewResult::new(previous, &loan))
    }

    async fn create_request(&self, item: ItemDto, patron: PatronDto, request_type: RequestType, pickup_service_point_id: String,
                            expiration_date: Option<NaiveDateTime>) -> LibraryResult<RequestDto> {
        let mut item = self.reload(&item).await?;
        let mut changes = ChangeSet::new();
        let open_loan = self.services.loan_service.find_open_loan(&item).await?;
        let borrower = open_loan.as_ref().map(|loan| loan.patron_id.as_str());
        let request = self.services.request_service.create_request(
            &mut changes, &mut item, &patron, request_type, pickup_service_point_id.as_str(), expiration_date, borrower).await?;
        if request_type == RequestType::Recall {
            if let Some(days) = self.config.recall_return_days {
                self.services.loan_service.recall(&mut changes, &item, days).await?;
            }
        }
        self.commit_with_item(changes, &mut item).await?;
        Ok(request)
    }

    async fn cancel_request(&self, item: ItemDto, request_id: String) -> LibraryResult<RequestDto> {
        let mut item = self.reload(&item).await?;
        let available = item.open_loan_id.is_none();
        let mut changes = ChangeSet::new();
        let cancelled = self.services.request_service.cancel_request(&mut changes, request_id.as_str(), &mut item, available).await?;
        self.commit_with_item(changes, &mut item).await?;
        Ok(cancelled)
    }

    async fn expire_pickup(&self, item: ItemDto, request_id: String) -> LibraryResult<RequestDto> {
        let mut item = self.reload(&item).await?;
        let available = item.open_loan_id.is_none();
        let mut changes = ChangeSet::new();
        let expired = self.services.request_service.expire_pickup(&mut changes, request_id.as_str(), &mut item, available).await?;
        self.commit_with_item(changes, &mut item).await?;
        Ok(expired)
    }

    async fn receive_in_transit(&self, item: ItemDto, service_point_id: String) -> LibraryResult<RequestDto> {
        let mut item = self.reload(&item).await?;
        let mut changes = ChangeSet::new();
        let received = self.services.request_service.receive_in_transit(&mut changes, &mut item, service_point_id.as_str()).await?;
        self.commit_with_item(changes, &mut item).await?;
        Ok(received)
    }
}

#[async_trait]
impl CirculationService for CirculationServiceImpl {
    async fn check_out(&self, item_barcode: &str, patron_barcode: &str, service_point_id: &str,
                       due_date: Option<NaiveDateTime>) -> LibraryResult<CheckOutResult> {
        let item = self.find_item(item_barcode).await?;
        let patron = self.find_patron(patron_barcode).await?;
        let item_id = item.item_id.to_string();
        let service_point_id = service_point_id.to_string();
        let res = self.run_locked(item_id.as_str(), move |c| async move {
            c.check_out(item, patron, service_point_id, due_date).await
        }).await?;
        info!("checked out {} to {}, loan {} due {}", item_barcode, patron_barcode, res.loan.loan_id, res.loan.due_date);
        Ok(res)
    }

    async fn check_in(&self, item_barcode: &str, service_point_id: &str,
                      check_in_date: Option<NaiveDateTime>) -> LibraryResult<CheckInResult> {
        let item = self.find_item(item_barcode).await?;
        let item_id = item.item_id.to_string();
        let service_point_id = service_point_id.to_string();
        let res = self.run_locked(item_id.as_str(), move |c| async move {
            c.check_in(item, service_point_id, check_in_date).await
        }).await?;
        info!("checked in {}, overdue {} fine {:?}", item_barcode, res.was_overdue, res.fine_amount);
        Ok(res)
    }

    async fn renew(&self, item_barcode: &str, patron_barcode: Option<&str>) -> LibraryResult<RenewResult> {
        let item = self.find_item(item_barcode).await?;
        let patron = match patron_barcode {
            Some(barcode) => Some(self.find_patron(barcode).await?),
            None => None,
        };
        let item_id = item.item_id.to_string();
        self.run_locked(item_id.as_str(), move |c| async move {
            c.renew(item, patron).await
        }).await
    }

    async fn create_request(&self, item_barcode: &str, patron_barcode: &str, request_type: RequestType,
                            pickup_service_point_id: &str, expiration_date: Option<NaiveDateTime>) -> LibraryResult<RequestDto> {
        let item = self.find_item(item_barcode).await?;
        let patron = self.find_patron(patron_barcode).await?;
        let item_id = item.item_id.to_string();
        let pickup_service_point_id = pickup_service_point_id.to_string();
        self.run_locked(item_id.as_str(), move |c| async move {
            c.create_request(item, patron, request_type, pickup_service_point_id, expiration_date).await
        }).await
    }

    async fn cancel_request(&self, request_id: &str) -> LibraryResult<RequestDto> {
        let request = self.inner.services.request_service.find_request_by_id(request_id).await?;
        let item = self.inner.services.item_service.find_item_by_id(request.item_id.as_str()).await?;
        let request_id = request_id.to_string();
        self.run_locked(request.item_id.as_str(), move |c| async move {
            c.cancel_request(item, request_id).await
        }).await
    }

    async fn expire_pickup_window(&self, request_id: &str) -> LibraryResult<RequestDto> {
        let request = self.inner.services.request_service.find_request_by_id(request_id).await?;
        let item = self.inner.services.item_service.find_item_by_id(request.item_id.as_str()).await?;
        let request_id = request_id.to_string();
        self.run_locked(request.item_id.as_str(), move |c| async move {
            c.expire_pickup(item, request_id).await
        }).await
    }

    async fn receive_in_transit(&self, item_barcode: &str, service_point_id: &str) -> LibraryResult<RequestDto> {
        let item = self.find_item(item_barcode).await?;
        let item_id = item.item_id.to_string();
        let service_point_id = service_point_id.to_string();
        self.run_locked(item_id.as_str(), move |c| async move {
            c.receive_in_transit(item, service_point_id).await
        }).await
    }

    async fn item_queue(&self, item_barcode: &str) -> LibraryResult<Vec<RequestDto>> {
        let item = self.find_item(item_barcode).await?;
        let item = self.inner.services.item_service.find_item_by_id(item.item_id.as_str()).await?;
        self.inner.services.request_service.item_queue(&item).await
    }

    async fn find_loan_by_id(&self, loan_id: &str) -> LibraryResult<LoanDto> {
        self.inner.services.loan_service.find_loan_by_id(loan_id).await
    }

    async fn find_request_by_id(&self, request_id: &str) -> LibraryResult<RequestDto> {
        self.inner.services.request_service.find_request_by_id(request_id).await
    }

    async fn list_loans(&self, filter: &LoanFilter, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<LoanDto>> {
        self.inner.services.loan_service.query_loans(filter, page, page_size).await
    }

    async fn list_requests(&self, filter: &RequestFilter, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<RequestDto>> {
        self.inner.services.request_service.query_requests(filter, page, page_size).await
    }
}
