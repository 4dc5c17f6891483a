use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use tracing::info;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult, ReasonCode};
use crate::core::transaction::ChangeSet;
use crate::items::dto::ItemDto;
use crate::loans::domain::LoanService;
use crate::loans::domain::model::LoanEntity;
use crate::loans::dto::{LoanDto, LoanFilter};
use crate::loans::repository::{LOANS_KEY, LOANS_TABLE, LoanRepository};
use crate::patrons::dto::PatronDto;

const LOAN_EVENTS: &str = "loans";

pub(crate) struct LoanServiceImpl {
    config: Configuration,
    loan_repository: Box<dyn LoanRepository>,
}

impl LoanServiceImpl {
    pub(crate) fn new(config: &Configuration, loan_repository: Box<dyn LoanRepository>) -> Self {
        LoanServiceImpl {
            config: config.clone(),
            loan_repository,
        }
    }

    // the loan the item points at, read by key so that it is as recent as the item itself
    async fn load_open_loan(&self, item: &ItemDto) -> LibraryResult<Option<LoanEntity>> {
        let loan_id = match item.open_loan_id.as_deref() {
            Some(loan_id) => loan_id,
            None => return Ok(None),
        };
        let loan = match self.loan_repository.get(loan_id).await {
            Ok(loan) => loan,
            Err(LibraryError::NotFound { .. }) => return Err(LibraryError::invariant(
                format!("item {} points at missing loan {}", item.barcode, loan_id).as_str(),
                ReasonCode::ItemStateMismatch)),
            Err(err) => return Err(err),
        };
        if !loan.is_open() || loan.item_id != item.item_id {
            return Err(LibraryError::invariant(
                format!("item {} points at loan {} which is {}", item.barcode, loan_id, loan.loan_status).as_str(),
                ReasonCode::ItemStateMismatch));
        }
        Ok(Some(loan))
    }

    async fn open_loan(&self, item: &ItemDto) -> LibraryResult<LoanEntity> {
        self.load_open_loan(item).await?.ok_or_else(|| {
            LibraryError::policy(format!("item {} has no open loan", item.barcode).as_str(), ReasonCode::NoOpenLoan)
        })
    }

    fn event_metadata(&self, loan: &LoanEntity) -> HashMap<String, String> {
        HashMap::from([
            ("branch_id".to_string(), self.config.branch_id.to_string()),
            ("item_id".to_string(), loan.item_id.to_string()),
            ("patron_id".to_string(), loan.patron_id.to_string()),
        ])
    }
}

#[async_trait]
impl LoanService for LoanServiceImpl {
    async fn check_out(&self, changes: &mut ChangeSet, item: &mut ItemDto, patron: &PatronDto,
                       service_point_id: &str, due_date: Option<NaiveDateTime>) -> LibraryResult<LoanDto> {
        if let Some(existing) = self.load_open_loan(item).await? {
            return Err(LibraryError::conflict(
                format!("item {} is already on loan {}", item.barcode, existing.loan_id).as_str(),
                ReasonCode::ItemAlreadyOnLoan));
        }
        if !patron.active {
            return Err(LibraryError::policy(
                format!("patron {} is not active", patron.barcode).as_str(), ReasonCode::PatronInactive));
        }
        let now = changes.now();
        let policy = self.config.loan_policy(patron.patron_group.as_str());
        let mut loan = LoanEntity::new(item.item_id.as_str(), item.barcode.as_str(),
                                       patron.patron_id.as_str(), patron.barcode.as_str(),
                                       service_point_id, policy, now);
        if let Some(due_date) = due_date {
            if due_date <= now {
                return Err(LibraryError::validation(
                    format!("due date {} is not in the future", due_date).as_str(), None));
            }
            loan.due_date = due_date;
        }
        changes.create(LOANS_TABLE, LOANS_KEY, &loan)?;
        item.open_loan_id = Some(loan.loan_id.to_string());
        let dto = LoanDto::from(&loan);
        changes.publish(DomainEvent::added("loan_checked_out", LOAN_EVENTS, loan.loan_id.as_str(),
                                           &self.event_metadata(&loan), &dto)?);
        info!("item {} checked out to patron {} due {}", item.barcode, patron.barcode, loan.due_date);
        Ok(dto)
    }

    async fn check_in(&self, changes: &mut ChangeSet, item: &mut ItemDto, service_point_id: &str,
                      check_in_date: NaiveDateTime) -> LibraryResult<LoanDto> {
        let mut loan = self.open_loan(item).await?;
        loan.close(check_in_date, service_point_id)?;
        changes.update(LOANS_TABLE, LOANS_KEY, &mut loan)?;
        item.open_loan_id = None;
        let dto = LoanDto::from(&loan);
        changes.publish(DomainEvent::closed("loan_checked_in", LOAN_EVENTS, loan.loan_id.as_str(),
                                            &self.event_metadata(&loan), &dto)?);
        info!("item {} checked in at {}", item.barcode, service_point_id);
        Ok(dto)
    }

    async fn renew(&self, changes: &mut ChangeSet, item: &ItemDto, patron: &PatronDto,
                   competing_requests: bool) -> LibraryResult<(NaiveDateTime, LoanDto)> {
        let mut loan = self.open_loan(item).await?;
        if loan.patron_id != patron.patron_id {
            return Err(LibraryError::policy(
                format!("item {} is not on loan to patron {}", item.barcode, patron.barcode).as_str(),
                ReasonCode::PatronMismatch));
        }
        if !patron.active {
            return Err(LibraryError::policy(
                format!("patron {} is not active", patron.barcode).as_str(), ReasonCode::PatronInactive));
        }
        let now = changes.now();
        let previous = loan.renew(now)?;
        if competing_requests {
            return Err(LibraryError::policy(
                format!("item {} is requested by another patron", item.barcode).as_str(),
                ReasonCode::ItemRecalled));
        }
        changes.update(LOANS_TABLE, LOANS_KEY, &mut loan)?;
        let dto = LoanDto::from(&loan);
        changes.publish(DomainEvent::updated("loan_renewed", LOAN_EVENTS, loan.loan_id.as_str(),
                                             &self.event_metadata(&loan), &dto)?);
        info!("loan {} renewed {} of {} times, due {}", loan.loan_id, loan.renewal_count, loan.max_renewals, loan.due_date);
        Ok((previous, dto))
    }

    async fn recall(&self, changes: &mut ChangeSet, item: &ItemDto, return_days: i64) -> LibraryResult<Option<LoanDto>> {
        let mut loan = match self.load_open_loan(item).await? {
            Some(loan) => loan,
            None => return Ok(None),
        };
        let now = changes.now();
        if !loan.recall(now + Duration::days(return_days)) {
            return Ok(None);
        }
        changes.update(LOANS_TABLE, LOANS_KEY, &mut loan)?;
        let dto = LoanDto::from(&loan);
        changes.publish(DomainEvent::updated("loan_recalled", LOAN_EVENTS, loan.loan_id.as_str(),
                                             &self.event_metadata(&loan), &dto)?);
        info!("loan {} recalled, due {}", loan.loan_id, loan.due_date);
        Ok(Some(dto))
    }

    async fn find_open_loan(&self, item: &ItemDto) -> LibraryResult<Option<LoanDto>> {
        Ok(self.load_open_loan(item).await?.map(|l| LoanDto::from(&l)))
    }

    async fn find_loan_by_id(&self, loan_id: &str) -> LibraryResult<LoanDto> {
        match self.loan_repository.get(loan_id).await {
            Ok(loan) => Ok(LoanDto::from(&loan)),
            Err(LibraryError::NotFound { .. }) => Err(LibraryError::not_found(
                format!("loan not found for {}", loan_id).as_str(), ReasonCode::LoanNotFound)),
            Err(err) => Err(err),
        }
    }

    async fn query_loans(&self, filter: &LoanFilter, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<LoanDto>> {
        let predicate = filter.to_predicate(Utc::now().naive_utc());
        let res = self.loan_repository.query(&predicate, page, page_size).await?;
        Ok(res.map(|l| LoanDto::from(l)))
    }
}
