use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, info};
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{FeeType, LibraryError, LibraryResult, PaginatedResult, PaymentMethod, ReasonCode};
use crate::core::transaction::{ChangeSet, TransactionManager};
use crate::fees::domain::FeeService;
use crate::fees::domain::model::{FeeEntity, overdue_fine, PaymentEntity};
use crate::fees::dto::{FeeDto, FeeFilter, PaymentDto};
use crate::fees::repository::{FEES_KEY, FEES_TABLE, FeeRepository, PAYMENTS_KEY, PAYMENTS_TABLE, PaymentRepository};
use crate::gateway::events::EventPublisher;
use crate::loans::dto::LoanDto;
use crate::locks::{LockManager, with_lock};
use crate::patrons::dto::PatronDto;

const FEE_EVENTS: &str = "fees";

pub(crate) struct FeeServiceImpl {
    config: Configuration,
    fee_repository: Box<dyn FeeRepository>,
    payment_repository: Box<dyn PaymentRepository>,
    tx_manager: Box<dyn TransactionManager>,
    publisher: Box<dyn EventPublisher>,
    fee_locks: Arc<dyn LockManager>,
}

impl FeeServiceImpl {
    pub(crate) fn new(config: &Configuration, fee_repository: Box<dyn FeeRepository>,
                      payment_repository: Box<dyn PaymentRepository>, tx_manager: Box<dyn TransactionManager>,
                      publisher: Box<dyn EventPublisher>, fee_locks: Arc<dyn LockManager>) -> Self {
        FeeServiceImpl {
            config: config.clone(),
            fee_repository,
            payment_repository,
            tx_manager,
            publisher,
            fee_locks,
        }
    }

    async fn load_fee(&self, fee_id: &str) -> LibraryResult<FeeEntity> {
        match self.fee_repository.get(fee_id).await {
            Ok(fee) => Ok(fee),
            Err(LibraryError::NotFound { .. }) => Err(LibraryError::not_found(
                format!("fee not found for {}", fee_id).as_str(), ReasonCode::FeeNotFound)),
            Err(err) => Err(err),
        }
    }

    fn event_metadata(&self, fee: &FeeEntity, payment: Option<&PaymentEntity>) -> HashMap<String, String> {
        let mut metadata = HashMap::from([
            ("branch_id".to_string(), self.config.branch_id.to_string()),
            ("patron_id".to_string(), fee.patron_id.to_string()),
        ]);
        if let Some(payment) = payment {
            metadata.insert("payment_id".to_string(), payment.payment_id.to_string());
            metadata.insert("amount".to_string(), payment.amount.to_string());
        }
        metadata
    }

    // change_fee loads the fee under its lock, checks its balance before and after `f` and
    // commits the fee together with the payment `f` produced
    async fn change_fee<F>(&self, fee_id: &str, event_name: &str, f: F) -> LibraryResult<(FeeDto, Option<PaymentDto>)>
        where F: FnOnce(&mut FeeEntity, NaiveDateTime) -> LibraryResult<Option<PaymentEntity>> + Send {
        with_lock(self.fee_locks.as_ref(), fee_id, self.config.lock_timeout(), || async move {
            let mut fee = self.load_fee(fee_id).await?;
            fee.verify_balance()?;

            let mut changes = ChangeSet::new();
            let now = changes.now();
            let payment = f(&mut fee, now)?;
            fee.verify_balance()?;

            changes.update(FEES_TABLE, FEES_KEY, &mut fee)?;
            if let Some(payment) = &payment {
                changes.create(PAYMENTS_TABLE, PAYMENTS_KEY, payment)?;
            }
            let dto = FeeDto::from(&fee);
            let metadata = self.event_metadata(&fee, payment.as_ref());
            let event = if fee.is_closed() {
                DomainEvent::closed(event_name, FEE_EVENTS, fee_id, &metadata, &dto)?
            } else {
                DomainEvent::updated(event_name, FEE_EVENTS, fee_id, &metadata, &dto)?
            };
            changes.publish(event);
            self.tx_manager.commit(&changes).await?;
            let published = self.publisher.publish_all(changes.events()).await;
            debug!("fee {} {} published {} events", fee_id, event_name, published);
            Ok((dto, payment.map(|p| PaymentDto::from(&p))))
        }).await
    }

    async fn settle(&self, fee_id: &str, method: PaymentMethod, event_name: &str, reason: Option<String>,
                    created_by: Option<String>) -> LibraryResult<(FeeDto, PaymentDto)> {
        let (fee, payment) = self.change_fee(fee_id, event_name, |fee, now| {
            fee.settle(method, reason, created_by, now).map(Some)
        }).await?;
        let payment = payment.ok_or_else(|| LibraryError::invariant(
            format!("{} of fee {} recorded no payment", method, fee_id).as_str(), ReasonCode::BalanceMismatch))?;
        info!("fee {} settled by {} of {}", fee_id, method, payment.amount);
        Ok((fee, payment))
    }
}

#[async_trait]
impl FeeService for FeeServiceImpl {
    async fn assess_overdue(&self, changes: &mut ChangeSet, loan: &LoanDto) -> LibraryResult<Option<FeeDto>> {
        let returned = match loan.return_date {
            Some(returned) => returned,
            None => return Ok(None),
        };
        let fine = overdue_fine(loan.due_date, returned, self.config.daily_overdue_rate, self.config.max_overdue_fine);
        if fine <= Decimal::ZERO {
            return Ok(None);
        }
        let now = changes.now();
        let days = (returned - loan.due_date).num_days();
        let mut fee = FeeEntity::new(loan.patron_id.as_str(), FeeType::Overdue, fine, "overdue",
                                     Some(format!("item {} returned {} days late", loan.item_barcode, days)), now)?;
        fee.item_id = Some(loan.item_id.to_string());
        fee.loan_id = Some(loan.loan_id.to_string());
        changes.create(FEES_TABLE, FEES_KEY, &fee)?;
        let dto = FeeDto::from(&fee);
        changes.publish(DomainEvent::added("fee_created", FEE_EVENTS, fee.fee_id.as_str(),
                                           &self.event_metadata(&fee, None), &dto)?);
        info!("overdue fine {} for loan {} ({} days)", fine, loan.loan_id, days);
        Ok(Some(dto))
    }

    async fn create_fee(&self, patron: &PatronDto, fee_type: FeeType, amount: Decimal, reason: &str,
                        description: Option<String>, item_id: Option<String>,
                        due_date: Option<NaiveDateTime>) -> LibraryResult<FeeDto> {
        let mut changes = ChangeSet::new();
        let now = changes.now();
        let mut fee = FeeEntity::new(patron.patron_id.as_str(), fee_type, amount, reason, description, now)?;
        fee.item_id = item_id;
        fee.due_date = due_date;
        changes.create(FEES_TABLE, FEES_KEY, &fee)?;
        let dto = FeeDto::from(&fee);
        changes.publish(DomainEvent::added("fee_created", FEE_EVENTS, fee.fee_id.as_str(),
                                           &self.event_metadata(&fee, None), &dto)?);
        self.tx_manager.commit(&changes).await?;
        self.publisher.publish_all(changes.events()).await;
        info!("{} fee {} of {} created for patron {}", fee_type, fee.fee_id, amount, patron.barcode);
        Ok(dto)
    }

    async fn apply_payment(&self, fee_id: &str, amount: Decimal, method: PaymentMethod,
                           note: Option<String>, created_by: Option<String>) -> LibraryResult<(FeeDto, PaymentDto)> {
        let (fee, payment) = self.change_fee(fee_id, "fee_payment_applied", |fee, now| {
            fee.apply_payment(amount, method, note, created_by, now).map(Some)
        }).await?;
        let payment = payment.ok_or_else(|| LibraryError::invariant(
            format!("payment on fee {} was not recorded", fee_id).as_str(), ReasonCode::BalanceMismatch))?;
        info!("payment {} of {} applied to fee {}, remaining {}", payment.payment_id, amount, fee_id, fee.remaining);
        Ok((fee, payment))
    }

    async fn waive_fee(&self, fee_id: &str, reason: Option<String>, created_by: Option<String>) -> LibraryResult<(FeeDto, PaymentDto)> {
        self.settle(fee_id, PaymentMethod::Waive, "fee_waived", reason, created_by).await
    }

    async fn forgive_fee(&self, fee_id: &str, reason: Option<String>, created_by: Option<String>) -> LibraryResult<(FeeDto, PaymentDto)> {
        self.settle(fee_id, PaymentMethod::Forgive, "fee_forgiven", reason, created_by).await
    }

    async fn suspend_fee(&self, fee_id: &str) -> LibraryResult<FeeDto> {
        let (fee, _) = self.change_fee(fee_id, "fee_suspended", |fee, _| {
            fee.suspend().map(|_| None)
        }).await?;
        info!("fee {} suspended", fee_id);
        Ok(fee)
    }

    async fn resume_fee(&self, fee_id: &str) -> LibraryResult<FeeDto> {
        let (fee, _) = self.change_fee(fee_id, "fee_resumed", |fee, _| {
            fee.resume().map(|_| None)
        }).await?;
        info!("fee {} resumed", fee_id);
        Ok(fee)
    }

    async fn outstanding_balance(&self, patron_id: &str) -> LibraryResult<Decimal> {
        let fees = self.fee_repository.find_unsettled_for_patron(patron_id).await?;
        Ok(fees.iter().map(|f| f.remaining).sum())
    }

    async fn find_fee_by_id(&self, fee_id: &str) -> LibraryResult<FeeDto> {
        self.load_fee(fee_id).await.map(|f| FeeDto::from(&f))
    }

    async fn query_fees(&self, filter: &FeeFilter, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<FeeDto>> {
        let res = self.fee_repository.query(&filter.to_predicate(), page, page_size).await?;
        Ok(res.map(|f| FeeDto::from(f)))
    }

    async fn query_payments(&self, fee_id: &str, page: usize, page_size: usize) -> LibraryResult<PaginatedResult<PaymentDto>> {
        self.load_fee(fee_id).await?;
        let predicate = HashMap::from([("fee_id".to_string(), fee_id.to_string())]);
        let res = self.payment_repository.query(&predicate, page, page_size).await?;
        Ok(res.map(|p| PaymentDto::from(p)))
    }
}
