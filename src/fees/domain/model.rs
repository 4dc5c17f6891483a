use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::{Identifiable, Versioned};
use crate::core::library::{FeeStatus, FeeType, LibraryError, LibraryResult, PaymentMethod, ReasonCode};
use crate::utils::date::{opt_serializer, serializer};

// amounts are whole cents
const MAX_AMOUNT_SCALE: u32 = 2;

pub(crate) fn validate_amount(amount: Decimal) -> LibraryResult<()> {
    if amount <= Decimal::ZERO {
        return Err(LibraryError::policy(
            format!("amount {} must be greater than zero", amount).as_str(), ReasonCode::InvalidAmount));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(LibraryError::policy(
            format!("amount {} has more than {} decimal places", amount, MAX_AMOUNT_SCALE).as_str(),
            ReasonCode::InvalidAmount));
    }
    Ok(())
}

// overdue_fine charges every full day past the due date, capped at max_fine
pub(crate) fn overdue_fine(due_date: NaiveDateTime, returned: NaiveDateTime,
                           daily_rate: Decimal, max_fine: Decimal) -> Decimal {
    let days = (returned - due_date).num_days();
    if days <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(days) * daily_rate).min(max_fine).round_dp(MAX_AMOUNT_SCALE)
}

// FeeEntity is a patron's obligation. `paid_total` sums the payments recorded against the fee
// and is written in the same transaction as each of them, so `remaining` always equals
// amount minus paid_total on the row itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FeeEntity {
    pub fee_id: String,
    pub version: i64,
    pub patron_id: String,
    pub item_id: Option<String>,
    pub loan_id: Option<String>,
    pub fee_type: FeeType,
    pub fee_status: FeeStatus,
    pub amount: Decimal,
    pub remaining: Decimal,
    #[serde(default)]
    pub paid_total: Decimal,
    pub reason: String,
    pub description: Option<String>,
    #[serde(with = "opt_serializer", default)]
    pub due_date: Option<NaiveDateTime>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl FeeEntity {
    pub fn new(patron_id: &str, fee_type: FeeType, amount: Decimal, reason: &str,
               description: Option<String>, now: NaiveDateTime) -> LibraryResult<Self> {
        validate_amount(amount)?;
        Ok(Self {
            fee_id: Uuid::new_v4().to_string(),
            version: 0,
            patron_id: patron_id.to_string(),
            item_id: None,
            loan_id: None,
            fee_type,
            fee_status: FeeStatus::Open,
            amount,
            remaining: amount,
            paid_total: Decimal::ZERO,
            reason: reason.to_string(),
            description,
            due_date: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.fee_status == FeeStatus::Closed
    }

    // apply_payment records money paid by the patron
    pub fn apply_payment(&mut self, amount: Decimal, method: PaymentMethod, note: Option<String>,
                         created_by: Option<String>, now: NaiveDateTime) -> LibraryResult<PaymentEntity> {
        self.check_not_closed()?;
        if self.fee_status == FeeStatus::Suspended {
            return Err(LibraryError::policy(
                format!("fee {} is suspended", self.fee_id).as_str(), ReasonCode::FeeSuspended));
        }
        if method.is_administrative() {
            return Err(LibraryError::validation(
                format!("{} is not a payment method, use waive or forgive", method).as_str(), None));
        }
        validate_amount(amount)?;
        if amount > self.remaining {
            return Err(LibraryError::policy(
                format!("amount {} exceeds remaining {} of fee {}", amount, self.remaining, self.fee_id).as_str(),
                ReasonCode::InsufficientAmount));
        }
        self.remaining -= amount;
        self.paid_total += amount;
        if self.remaining.is_zero() {
            self.fee_status = FeeStatus::Closed;
        }
        Ok(PaymentEntity::new(self, amount, method, note, created_by, now))
    }

    // settle closes an open or suspended fee by waiving or forgiving its whole remaining balance
    pub fn settle(&mut self, method: PaymentMethod, note: Option<String>,
                  created_by: Option<String>, now: NaiveDateTime) -> LibraryResult<PaymentEntity> {
        self.check_not_closed()?;
        if !method.is_administrative() {
            return Err(LibraryError::validation(
                format!("{} cannot settle a fee", method).as_str(), None));
        }
        let amount = self.remaining;
        self.remaining = Decimal::ZERO;
        self.paid_total += amount;
        self.fee_status = FeeStatus::Closed;
        Ok(PaymentEntity::new(self, amount, method, note, created_by, now))
    }

    pub fn suspend(&mut self) -> LibraryResult<()> {
        self.check_not_closed()?;
        if self.fee_status == FeeStatus::Suspended {
            return Err(LibraryError::policy(
                format!("fee {} is already suspended", self.fee_id).as_str(), ReasonCode::FeeSuspended));
        }
        self.fee_status = FeeStatus::Suspended;
        Ok(())
    }

    pub fn resume(&mut self) -> LibraryResult<()> {
        self.check_not_closed()?;
        if self.fee_status != FeeStatus::Suspended {
            return Err(LibraryError::policy(
                format!("fee {} is not suspended", self.fee_id).as_str(), ReasonCode::FeeNotSuspended));
        }
        self.fee_status = FeeStatus::Open;
        Ok(())
    }

    // verify_balance checks the stored remaining against the payments recorded on the row
    pub fn verify_balance(&self) -> LibraryResult<()> {
        if self.amount - self.paid_total != self.remaining || self.remaining < Decimal::ZERO || self.remaining > self.amount {
            return Err(LibraryError::invariant(
                format!("fee {} has remaining {} but amount {} and payments {}",
                        self.fee_id, self.remaining, self.amount, self.paid_total).as_str(),
                ReasonCode::BalanceMismatch));
        }
        if (self.fee_status == FeeStatus::Closed) != self.remaining.is_zero() {
            return Err(LibraryError::invariant(
                format!("fee {} is {} with remaining {}", self.fee_id, self.fee_status, self.remaining).as_str(),
                ReasonCode::BalanceMismatch));
        }
        Ok(())
    }

    fn check_not_closed(&self) -> LibraryResult<()> {
        if self.is_closed() {
            return Err(LibraryError::policy(
                format!("fee {} is closed", self.fee_id).as_str(), ReasonCode::FeeClosed));
        }
        Ok(())
    }
}

impl Identifiable for FeeEntity {
    fn id(&self) -> String {
        self.fee_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Versioned for FeeEntity {
    fn advance_version(&mut self, now: NaiveDateTime) {
        self.version += 1;
        self.updated_at = now;
    }
}

// PaymentEntity is an append-only ledger entry against a fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PaymentEntity {
    pub payment_id: String,
    pub version: i64,
    pub fee_id: String,
    pub patron_id: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    pub created_by: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
}

impl PaymentEntity {
    fn new(fee: &FeeEntity, amount: Decimal, payment_method: PaymentMethod, note: Option<String>,
           created_by: Option<String>, now: NaiveDateTime) -> Self {
        Self {
            payment_id: Uuid::new_v4().to_string(),
            version: 0,
            fee_id: fee.fee_id.to_string(),
            patron_id: fee.patron_id.to_string(),
            amount,
            payment_method,
            note,
            created_by,
            created_at: now,
        }
    }
}

impl Identifiable for PaymentEntity {
    fn id(&self) -> String {
        self.payment_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}
