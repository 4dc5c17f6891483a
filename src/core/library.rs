use std::fmt;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

// ReasonCode is the stable error code returned to callers for every handled failure
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReasonCode {
    ItemNotFound,
    PatronNotFound,
    LoanNotFound,
    RequestNotFound,
    FeeNotFound,
    RecordNotFound,
    ItemAlreadyOnLoan,
    DuplicateRequest,
    VersionConflict,
    ItemNotAvailable,
    ItemAvailable,
    NoOpenLoan,
    MaxRenewalsReached,
    ItemRecalled,
    PatronInactive,
    PatronMismatch,
    PatronBlocked,
    MaxHoldsReached,
    RequesterIsBorrower,
    RequestClosed,
    RequestNotAwaitingPickup,
    PickupWindowOpen,
    InvalidAmount,
    InsufficientAmount,
    InvalidCheckInDate,
    FeeClosed,
    FeeSuspended,
    FeeNotSuspended,
    LockTimeout,
    DatabaseUnavailable,
    BalanceMismatch,
    TooManyWrites,
    QueueCorrupted,
    DuplicateWrite,
    ItemStateMismatch,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::ItemNotFound => "ErrItemNotFound",
            ReasonCode::PatronNotFound => "ErrPatronNotFound",
            ReasonCode::LoanNotFound => "ErrLoanNotFound",
            ReasonCode::RequestNotFound => "ErrRequestNotFound",
            ReasonCode::FeeNotFound => "ErrFeeNotFound",
            ReasonCode::RecordNotFound => "ErrRecordNotFound",
            ReasonCode::ItemAlreadyOnLoan => "ErrItemAlreadyOnLoan",
            ReasonCode::DuplicateRequest => "ErrDuplicateRequest",
            ReasonCode::VersionConflict => "ErrVersionConflict",
            ReasonCode::ItemNotAvailable => "ErrItemNotAvailable",
            ReasonCode::ItemAvailable => "ErrItemAvailable",
            ReasonCode::NoOpenLoan => "ErrNoOpenLoan",
            ReasonCode::MaxRenewalsReached => "ErrMaxRenewalsReached",
            ReasonCode::ItemRecalled => "ErrItemRecalled",
            ReasonCode::PatronInactive => "ErrPatronInactive",
            ReasonCode::PatronMismatch => "ErrPatronMismatch",
            ReasonCode::PatronBlocked => "ErrPatronBlocked",
            ReasonCode::MaxHoldsReached => "ErrMaxHoldsReached",
            ReasonCode::RequesterIsBorrower => "ErrRequesterIsBorrower",
            ReasonCode::RequestClosed => "ErrRequestClosed",
            ReasonCode::RequestNotAwaitingPickup => "ErrRequestNotAwaitingPickup",
            ReasonCode::PickupWindowOpen => "ErrPickupWindowOpen",
            ReasonCode::InvalidAmount => "ErrInvalidAmount",
            ReasonCode::InsufficientAmount => "ErrInsufficientAmount",
            ReasonCode::InvalidCheckInDate => "ErrInvalidCheckInDate",
            ReasonCode::FeeClosed => "ErrFeeClosed",
            ReasonCode::FeeSuspended => "ErrFeeSuspended",
            ReasonCode::FeeNotSuspended => "ErrFeeNotSuspended",
            ReasonCode::LockTimeout => "ErrLockTimeout",
            ReasonCode::DatabaseUnavailable => "ErrDatabaseUnavailable",
            ReasonCode::BalanceMismatch => "ErrBalanceMismatch",
            ReasonCode::TooManyWrites => "ErrTooManyWrites",
            ReasonCode::QueueCorrupted => "ErrQueueCorrupted",
            ReasonCode::DuplicateWrite => "ErrDuplicateWrite",
            ReasonCode::ItemStateMismatch => "ErrItemStateMismatch",
        }
    }
}

impl Display for ReasonCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub enum LibraryError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    NotFound {
        message: String,
        reason_code: ReasonCode,
    },
    // Conflict covers state that already exists, e.g. an open loan or a concurrent
    // write that changed the version of a record after it was read.
    Conflict {
        message: String,
        reason_code: ReasonCode,
    },
    PolicyViolation {
        message: String,
        reason_code: ReasonCode,
    },
    // This is a retry-able error, which indicates that the lock being requested has already been
    // held by another worker and has not been released before the lock timeout elapsed.
    // The caller can retry acquiring the lock with or without a backoff.
    CurrentlyUnavailable {
        message: String,
        reason_code: ReasonCode,
        retryable: bool,
    },
    Validation {
        message: String,
        reason_code: Option<ReasonCode>,
    },
    // Invariant is never user-triggered, it signals a bug and aborts the operation.
    Invariant {
        message: String,
        reason_code: ReasonCode,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn not_found(message: &str, reason_code: ReasonCode) -> LibraryError {
        LibraryError::NotFound { message: message.to_string(), reason_code }
    }

    pub fn conflict(message: &str, reason_code: ReasonCode) -> LibraryError {
        LibraryError::Conflict { message: message.to_string(), reason_code }
    }

    pub fn policy(message: &str, reason_code: ReasonCode) -> LibraryError {
        LibraryError::PolicyViolation { message: message.to_string(), reason_code }
    }

    pub fn unavailable(message: &str, reason_code: ReasonCode, retryable: bool) -> LibraryError {
        LibraryError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn lock_timeout(message: &str) -> LibraryError {
        LibraryError::unavailable(message, ReasonCode::LockTimeout, true)
    }

    pub fn database_or_unavailable(message: &str, reason: Option<String>, retryable: bool) -> LibraryError {
        if retryable {
            LibraryError::unavailable(
                format!("ddb database unavailable error {:?} {:?}", message, reason).as_str(),
                ReasonCode::DatabaseUnavailable, true)
        } else if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                LibraryError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str(), ReasonCode::RecordNotFound)
            } else if reason_val.as_str().contains("400") {
                // conditional check and transaction cancellation failures are reported as 400
                LibraryError::conflict(
                    format!("conditional write failed {:?} {:?}", message, reason).as_str(), ReasonCode::VersionConflict)
            } else {
                LibraryError::database(
                    format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
            }
        } else {
            LibraryError::database(
                format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
        }
    }

    pub fn validation(message: &str, reason_code: Option<ReasonCode>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn invariant(message: &str, reason_code: ReasonCode) -> LibraryError {
        LibraryError::Invariant { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::NotFound { .. } => { false }
            LibraryError::Conflict { .. } => { false }
            LibraryError::PolicyViolation { .. } => { false }
            LibraryError::CurrentlyUnavailable { retryable, .. } => { *retryable }
            LibraryError::Validation { .. } => { false }
            LibraryError::Invariant { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }

    // stable code returned to the caller
    pub fn code(&self) -> &'static str {
        match self {
            LibraryError::Database { .. } => { "ErrDatabase" }
            LibraryError::NotFound { reason_code, .. } => { reason_code.as_str() }
            LibraryError::Conflict { reason_code, .. } => { reason_code.as_str() }
            LibraryError::PolicyViolation { reason_code, .. } => { reason_code.as_str() }
            LibraryError::CurrentlyUnavailable { reason_code, .. } => { reason_code.as_str() }
            LibraryError::Validation { reason_code, .. } => {
                reason_code.map(|c| c.as_str()).unwrap_or("ErrValidation")
            }
            LibraryError::Invariant { reason_code, .. } => { reason_code.as_str() }
            LibraryError::Serialization { .. } => { "ErrSerialization" }
            LibraryError::Runtime { .. } => { "ErrRuntime" }
        }
    }

    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            LibraryError::NotFound { reason_code, .. } => { Some(*reason_code) }
            LibraryError::Conflict { reason_code, .. } => { Some(*reason_code) }
            LibraryError::PolicyViolation { reason_code, .. } => { Some(*reason_code) }
            LibraryError::CurrentlyUnavailable { reason_code, .. } => { Some(*reason_code) }
            LibraryError::Validation { reason_code, .. } => { *reason_code }
            LibraryError::Invariant { reason_code, .. } => { Some(*reason_code) }
            _ => { None }
        }
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::runtime(
            format!("serde io {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<String> for LibraryError {
    fn from(err: String) -> Self {
        LibraryError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::NotFound { message, reason_code } => {
                write!(f, "{} {}", reason_code, message)
            }
            LibraryError::Conflict { message, reason_code } => {
                write!(f, "{} {}", reason_code, message)
            }
            LibraryError::PolicyViolation { message, reason_code } => {
                write!(f, "{} {}", reason_code, message)
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {} {}", reason_code, message, retryable)
            }
            LibraryError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::Invariant { message, reason_code } => {
                write!(f, "{} {}", reason_code, message)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

/// A specialized Result type for circulation operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

// It defines abstraction for paginated result, pages are 1-based
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    // The page number
    pub page: usize,
    // page size
    pub page_size: usize,
    // number of records matching the query across all pages
    pub total_items: usize,
    pub total_pages: usize,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(page: usize, page_size: usize, total_items: usize, records: Vec<T>) -> Self {
        let total_pages = if page_size == 0 || total_items == 0 { 0 } else { (total_items - 1) / page_size + 1 };
        PaginatedResult {
            page,
            page_size,
            total_items,
            total_pages,
            records,
        }
    }

    pub(crate) fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> PaginatedResult<U> {
        PaginatedResult {
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            records: self.records.iter().map(f).collect(),
        }
    }

    pub(crate) fn meta(&self) -> PageMeta {
        PageMeta {
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct PageMeta {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LoanStatus {
    Open,
    Closed,
}

impl Display for LoanStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            LoanStatus::Open => write!(f, "open"),
            LoanStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RequestType {
    Hold,
    Recall,
    Page,
}

impl Display for RequestType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RequestType::Hold => write!(f, "hold"),
            RequestType::Recall => write!(f, "recall"),
            RequestType::Page => write!(f, "page"),
        }
    }
}

// Every open status starts with "open_" and every terminal status with "closed_",
// queries for active requests rely on that prefix.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RequestStatus {
    OpenNotYetFilled,
    OpenInTransit,
    OpenAwaitingPickup,
    ClosedFilled,
    ClosedCancelled,
    ClosedPickupExpired,
}

pub(crate) const OPEN_REQUEST_PREFIX: &str = "open";

impl RequestStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, RequestStatus::OpenNotYetFilled | RequestStatus::OpenInTransit | RequestStatus::OpenAwaitingPickup)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RequestStatus::OpenNotYetFilled => write!(f, "open_not_yet_filled"),
            RequestStatus::OpenInTransit => write!(f, "open_in_transit"),
            RequestStatus::OpenAwaitingPickup => write!(f, "open_awaiting_pickup"),
            RequestStatus::ClosedFilled => write!(f, "closed_filled"),
            RequestStatus::ClosedCancelled => write!(f, "closed_cancelled"),
            RequestStatus::ClosedPickupExpired => write!(f, "closed_pickup_expired"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FeeType {
    Overdue,
    LostItem,
    DamagedItem,
    Processing,
    Replacement,
    Manual,
}

impl Display for FeeType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            FeeType::Overdue => write!(f, "overdue"),
            FeeType::LostItem => write!(f, "lost_item"),
            FeeType::DamagedItem => write!(f, "damaged_item"),
            FeeType::Processing => write!(f, "processing"),
            FeeType::Replacement => write!(f, "replacement"),
            FeeType::Manual => write!(f, "manual"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FeeStatus {
    Open,
    Closed,
    Suspended,
}

impl Display for FeeStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            FeeStatus::Open => write!(f, "open"),
            FeeStatus::Closed => write!(f, "closed"),
            FeeStatus::Suspended => write!(f, "suspended"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PaymentMethod {
    Cash,
    Check,
    CreditCard,
    Transfer,
    Waive,
    Forgive,
}

impl PaymentMethod {
    // waive and forgive close a fee without money changing hands
    pub fn is_administrative(&self) -> bool {
        matches!(self, PaymentMethod::Waive | PaymentMethod::Forgive)
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Check => write!(f, "check"),
            PaymentMethod::CreditCard => write!(f, "credit_card"),
            PaymentMethod::Transfer => write!(f, "transfer"),
            PaymentMethod::Waive => write!(f, "waive"),
            PaymentMethod::Forgive => write!(f, "forgive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Display;
    use crate::core::library::{FeeStatus, FeeType, LibraryError, LoanStatus, PaginatedResult, PaymentMethod, ReasonCode, RequestStatus, RequestType};

    #[tokio::test]
    async fn test_should_create_database_error() {
        assert!(matches!(LibraryError::database("test", None, false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_create_conflict_error() {
        let err = LibraryError::conflict("test", ReasonCode::ItemAlreadyOnLoan);
        assert!(matches!(err, LibraryError::Conflict{ message: _, reason_code: ReasonCode::ItemAlreadyOnLoan }));
        assert_eq!("ErrItemAlreadyOnLoan", err.code());
    }

    #[tokio::test]
    async fn test_should_create_not_found_error() {
        assert!(matches!(LibraryError::not_found("test", ReasonCode::ItemNotFound), LibraryError::NotFound{ message: _, reason_code: _ }));
    }

    #[tokio::test]
    async fn test_should_create_policy_error() {
        let err = LibraryError::policy("test", ReasonCode::MaxRenewalsReached);
        assert_eq!("ErrMaxRenewalsReached", err.code());
        assert_eq!(Some(ReasonCode::MaxRenewalsReached), err.reason_code());
    }

    #[tokio::test]
    async fn test_should_create_lock_timeout_error() {
        let err = LibraryError::lock_timeout("test");
        assert!(matches!(err, LibraryError::CurrentlyUnavailable{ message: _, reason_code: ReasonCode::LockTimeout, retryable: true }));
        assert_eq!("ErrLockTimeout", err.code());
    }

    #[tokio::test]
    async fn test_should_create_database_or_unavailable_error() {
        assert!(matches!(LibraryError::database_or_unavailable("test", None, true), LibraryError::CurrentlyUnavailable{ message: _, reason_code: _, retryable: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("404".to_string()), false), LibraryError::NotFound{ message: _, reason_code: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("400".to_string()), false), LibraryError::Conflict{ message: _, reason_code: ReasonCode::VersionConflict }));
        assert!(matches!(LibraryError::database_or_unavailable("test", Some("500".to_string()), false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
        assert!(matches!(LibraryError::database_or_unavailable("test", None, false), LibraryError::Database{ message: _, reason_code: _, retryable: _ }));
    }

    #[tokio::test]
    async fn test_should_create_retryable_error() {
        assert!(!LibraryError::database("test", None, false).retryable());
        assert!(!LibraryError::not_found("test", ReasonCode::FeeNotFound).retryable());
        assert!(!LibraryError::conflict("test", ReasonCode::DuplicateRequest).retryable());
        assert!(!LibraryError::policy("test", ReasonCode::ItemRecalled).retryable());
        assert!(LibraryError::lock_timeout("test").retryable());
        assert!(!LibraryError::validation("test", None).retryable());
        assert!(!LibraryError::invariant("test", ReasonCode::BalanceMismatch).retryable());
        assert!(!LibraryError::serialization("test").retryable());
        assert!(!LibraryError::runtime("test", None).retryable());
    }

    fn assert_wire_name<T>(value: T)
        where T: Display + PartialEq + std::fmt::Debug + serde::Serialize + serde::de::DeserializeOwned {
        let encoded = format!("\"{}\"", value);
        assert_eq!(encoded, serde_json::to_string(&value).unwrap());
        assert_eq!(value, serde_json::from_str::<T>(encoded.as_str()).unwrap());
    }

    #[tokio::test]
    async fn test_should_format_statuses() {
        for status in [LoanStatus::Open, LoanStatus::Closed] {
            assert_wire_name(status);
        }
        for status in [RequestStatus::OpenNotYetFilled, RequestStatus::OpenInTransit, RequestStatus::OpenAwaitingPickup,
            RequestStatus::ClosedFilled, RequestStatus::ClosedCancelled, RequestStatus::ClosedPickupExpired] {
            assert_wire_name(status);
            assert_eq!(status.is_open(), status.to_string().starts_with("open"));
        }
        for kind in [RequestType::Hold, RequestType::Recall, RequestType::Page] {
            assert_wire_name(kind);
        }
        for kind in [FeeType::Overdue, FeeType::LostItem, FeeType::DamagedItem, FeeType::Processing, FeeType::Replacement, FeeType::Manual] {
            assert_wire_name(kind);
        }
        for status in [FeeStatus::Open, FeeStatus::Closed, FeeStatus::Suspended] {
            assert_wire_name(status);
        }
        for method in [PaymentMethod::Cash, PaymentMethod::Check, PaymentMethod::CreditCard, PaymentMethod::Transfer,
            PaymentMethod::Waive, PaymentMethod::Forgive] {
            assert_wire_name(method);
        }
    }

    #[tokio::test]
    async fn test_should_reject_unknown_names() {
        assert!(serde_json::from_str::<LoanStatus>("\"lost\"").is_err());
        assert!(serde_json::from_str::<RequestType>("\"reserve\"").is_err());
        assert!(serde_json::from_str::<RequestStatus>("\"open\"").is_err());
        assert!(serde_json::from_str::<FeeType>("\"late\"").is_err());
        assert!(serde_json::from_str::<FeeStatus>("\"paid\"").is_err());
        assert!(serde_json::from_str::<PaymentMethod>("\"bitcoin\"").is_err());
    }

    #[tokio::test]
    async fn test_should_compute_total_pages() {
        let res = PaginatedResult::new(1, 10, 21, vec![1, 2, 3]);
        assert_eq!(3, res.total_pages);
        let res = PaginatedResult::new(1, 10, 0, Vec::<i32>::new());
        assert_eq!(0, res.total_pages);
        assert_eq!(0, res.meta().total_items);
    }
}
