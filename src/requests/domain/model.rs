use std::sync::atomic::{AtomicI64, Ordering};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::{Identifiable, Versioned};
use crate::core::library::{LibraryError, LibraryResult, ReasonCode, RequestStatus, RequestType};
use crate::utils::date::{opt_serializer, serializer};

static SEQUENCE: AtomicI64 = AtomicI64::new(0);

// next_sequence is strictly increasing within the process and never behind the wall clock
// in milliseconds, it breaks ties between requests submitted at the same instant.
pub(crate) fn next_sequence(now: NaiveDateTime) -> i64 {
    SEQUENCE.fetch_max(now.and_utc().timestamp_millis(), Ordering::SeqCst);
    SEQUENCE.fetch_add(1, Ordering::SeqCst) + 1
}

// RequestEntity is a patron's claim on an item. Open requests of an item are kept at
// positions 1..N, closed requests keep position 0 and stay for history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RequestEntity {
    pub request_id: String,
    pub version: i64,
    pub item_id: String,
    pub patron_id: String,
    pub item_barcode: String,
    pub patron_barcode: String,
    pub request_type: RequestType,
    pub request_status: RequestStatus,
    #[serde(with = "serializer")]
    pub request_date: NaiveDateTime,
    pub sequence: i64,
    #[serde(with = "opt_serializer", default)]
    pub expiration_date: Option<NaiveDateTime>,
    #[serde(with = "opt_serializer", default)]
    pub hold_shelf_expiration_date: Option<NaiveDateTime>,
    #[serde(with = "opt_serializer", default)]
    pub closed_date: Option<NaiveDateTime>,
    pub queue_position: i64,
    pub pickup_service_point_id: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl RequestEntity {
    pub fn new(item_id: &str, item_barcode: &str, patron_id: &str, patron_barcode: &str,
               request_type: RequestType, pickup_service_point_id: &str,
               expiration_date: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            version: 0,
            item_id: item_id.to_string(),
            patron_id: patron_id.to_string(),
            item_barcode: item_barcode.to_string(),
            patron_barcode: patron_barcode.to_string(),
            request_type,
            request_status: RequestStatus::OpenNotYetFilled,
            request_date: now,
            sequence: next_sequence(now),
            expiration_date,
            hold_shelf_expiration_date: None,
            closed_date: None,
            queue_position: 0,
            pickup_service_point_id: pickup_service_point_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.request_status.is_open()
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expiration_date.map(|e| e < now).unwrap_or(false)
    }

    pub fn pickup_window_elapsed(&self, now: NaiveDateTime) -> bool {
        self.hold_shelf_expiration_date.map(|e| now >= e).unwrap_or(false)
    }

    pub fn await_pickup(&mut self, now: NaiveDateTime, hold_shelf_days: i64) -> LibraryResult<()> {
        match self.request_status {
            RequestStatus::OpenNotYetFilled | RequestStatus::OpenInTransit => {
                self.request_status = RequestStatus::OpenAwaitingPickup;
                self.hold_shelf_expiration_date = Some(now + Duration::days(hold_shelf_days));
                Ok(())
            }
            other => Err(self.invalid_transition(other, RequestStatus::OpenAwaitingPickup)),
        }
    }

    pub fn send_in_transit(&mut self) -> LibraryResult<()> {
        match self.request_status {
            RequestStatus::OpenNotYetFilled => {
                self.request_status = RequestStatus::OpenInTransit;
                Ok(())
            }
            other => Err(self.invalid_transition(other, RequestStatus::OpenInTransit)),
        }
    }

    pub fn close(&mut self, status: RequestStatus, now: NaiveDateTime) -> LibraryResult<()> {
        if !self.is_open() {
            return Err(LibraryError::policy(
                format!("request {} is already {}", self.request_id, self.request_status).as_str(),
                ReasonCode::RequestClosed));
        }
        let allowed = match status {
            RequestStatus::ClosedCancelled => true,
            RequestStatus::ClosedFilled => self.request_status == RequestStatus::OpenAwaitingPickup,
            RequestStatus::ClosedPickupExpired => self.request_status != RequestStatus::OpenInTransit,
            _ => false,
        };
        if !allowed {
            return Err(self.invalid_transition(self.request_status, status));
        }
        self.request_status = status;
        self.closed_date = Some(now);
        self.queue_position = 0;
        Ok(())
    }

    fn invalid_transition(&self, from: RequestStatus, to: RequestStatus) -> LibraryError {
        LibraryError::invariant(
            format!("request {} cannot move from {} to {}", self.request_id, from, to).as_str(),
            ReasonCode::RequestClosed)
    }
}

impl Identifiable for RequestEntity {
    fn id(&self) -> String {
        self.request_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Versioned for RequestEntity {
    fn advance_version(&mut self, now: NaiveDateTime) {
        self.version += 1;
        self.updated_at = now;
    }
}
