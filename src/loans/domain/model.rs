use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::{Identifiable, LoanPolicy, Versioned};
use crate::core::library::{LibraryError, LibraryResult, LoanStatus, ReasonCode};
use crate::utils::date::{opt_serializer, serializer};

// LoanEntity records one episode of an item on loan to one patron, loans are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LoanEntity {
    pub loan_id: String,
    pub version: i64,
    pub item_id: String,
    pub patron_id: String,
    pub item_barcode: String,
    pub patron_barcode: String,
    pub loan_status: LoanStatus,
    #[serde(with = "serializer")]
    pub loan_date: NaiveDateTime,
    #[serde(with = "serializer")]
    pub due_date: NaiveDateTime,
    #[serde(with = "opt_serializer", default)]
    pub return_date: Option<NaiveDateTime>,
    pub renewal_count: i64,
    pub max_renewals: i64,
    pub loan_period_days: i64,
    pub checkout_service_point_id: String,
    pub checkin_service_point_id: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl LoanEntity {
    pub fn new(item_id: &str, item_barcode: &str, patron_id: &str, patron_barcode: &str,
               service_point_id: &str, policy: LoanPolicy, now: NaiveDateTime) -> Self {
        Self {
            loan_id: Uuid::new_v4().to_string(),
            version: 0,
            item_id: item_id.to_string(),
            patron_id: patron_id.to_string(),
            item_barcode: item_barcode.to_string(),
            patron_barcode: patron_barcode.to_string(),
            loan_status: LoanStatus::Open,
            loan_date: now,
            due_date: now + Duration::days(policy.loan_period_days),
            return_date: None,
            renewal_count: 0,
            max_renewals: policy.max_renewals,
            loan_period_days: policy.loan_period_days,
            checkout_service_point_id: service_point_id.to_string(),
            checkin_service_point_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.loan_status == LoanStatus::Open
    }

    pub fn is_overdue(&self, at: NaiveDateTime) -> bool {
        at > self.due_date
    }

    // whole days past the due date, partial days are not charged
    pub fn overdue_days(&self, at: NaiveDateTime) -> i64 {
        if self.is_overdue(at) {
            (at - self.due_date).num_days()
        } else {
            0
        }
    }

    pub fn close(&mut self, return_date: NaiveDateTime, service_point_id: &str) -> LibraryResult<()> {
        if !self.is_open() {
            return Err(LibraryError::policy(
                format!("loan {} is already closed", self.loan_id).as_str(), ReasonCode::NoOpenLoan));
        }
        if return_date < self.loan_date {
            return Err(LibraryError::validation(
                format!("check-in date {} is before loan date {}", return_date, self.loan_date).as_str(),
                Some(ReasonCode::InvalidCheckInDate)));
        }
        self.loan_status = LoanStatus::Closed;
        self.return_date = Some(return_date);
        self.checkin_service_point_id = Some(service_point_id.to_string());
        Ok(())
    }

    // renewal is not cumulative, the new due date counts from now rather than from the
    // previous due date; returns the previous due date
    pub fn renew(&mut self, now: NaiveDateTime) -> LibraryResult<NaiveDateTime> {
        if !self.is_open() {
            return Err(LibraryError::policy(
                format!("loan {} is closed", self.loan_id).as_str(), ReasonCode::NoOpenLoan));
        }
        if self.renewal_count >= self.max_renewals {
            return Err(LibraryError::policy(
                format!("loan {} reached {} renewals", self.loan_id, self.max_renewals).as_str(),
                ReasonCode::MaxRenewalsReached));
        }
        let previous = self.due_date;
        self.due_date = now + Duration::days(self.loan_period_days);
        self.renewal_count += 1;
        Ok(previous)
    }

    // recall moves the due date earlier, it never extends a loan
    pub fn recall(&mut self, due_date: NaiveDateTime) -> bool {
        if self.is_open() && due_date < self.due_date {
            self.due_date = due_date;
            true
        } else {
            false
        }
    }
}

impl Identifiable for LoanEntity {
    fn id(&self) -> String {
        self.loan_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Versioned for LoanEntity {
    fn advance_version(&mut self, now: NaiveDateTime) {
        self.version += 1;
        self.updated_at = now;
    }
}
