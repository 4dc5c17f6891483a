use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::library::LibraryError;

#[derive(Debug, PartialEq)]
pub enum CommandError {
    NotFound {
        message: String,
        reason_code: String,
    },
    Conflict {
        message: String,
        reason_code: String,
    },
    PolicyViolation {
        message: String,
        reason_code: String,
    },
    Unavailable {
        message: String,
        reason_code: String,
        retryable: bool,
    },
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Invariant {
        message: String,
        reason_code: String,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
}

// ErrorBody is the json returned to callers for every failed command
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: String,
    pub kind: String,
    pub message: String,
    pub retryable: bool,
}

impl CommandError {
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::NotFound { .. } => { "not_found" }
            CommandError::Conflict { .. } => { "conflict" }
            CommandError::PolicyViolation { .. } => { "policy_violation" }
            CommandError::Unavailable { .. } => { "timeout" }
            CommandError::Database { .. } => { "database" }
            CommandError::Invariant { .. } => { "invariant" }
            CommandError::Serialization { .. } => { "serialization" }
            CommandError::Validation { .. } => { "validation" }
            CommandError::Runtime { .. } => { "runtime" }
        }
    }

    pub(crate) fn to_body(&self) -> ErrorBody {
        let (code, message, retryable) = match self {
            CommandError::NotFound { message, reason_code } => { (reason_code.to_string(), message, false) }
            CommandError::Conflict { message, reason_code } => { (reason_code.to_string(), message, false) }
            CommandError::PolicyViolation { message, reason_code } => { (reason_code.to_string(), message, false) }
            CommandError::Unavailable { message, reason_code, retryable } => { (reason_code.to_string(), message, *retryable) }
            CommandError::Database { message, retryable, .. } => { ("ErrDatabase".to_string(), message, *retryable) }
            CommandError::Invariant { message, reason_code } => { (reason_code.to_string(), message, false) }
            CommandError::Serialization { message } => { ("ErrSerialization".to_string(), message, false) }
            CommandError::Validation { message, reason_code } => {
                (reason_code.clone().unwrap_or_else(|| "ErrValidation".to_string()), message, false)
            }
            CommandError::Runtime { message, retryable, .. } => { ("ErrRuntime".to_string(), message, *retryable) }
        };
        ErrorBody { code, kind: self.kind().to_string(), message: message.to_string(), retryable }
    }
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        let code = other.code().to_string();
        match other {
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            LibraryError::NotFound { message, .. } => {
                CommandError::NotFound { message, reason_code: code }
            }
            LibraryError::Conflict { message, .. } => {
                CommandError::Conflict { message, reason_code: code }
            }
            LibraryError::PolicyViolation { message, .. } => {
                CommandError::PolicyViolation { message, reason_code: code }
            }
            LibraryError::CurrentlyUnavailable { message, retryable, .. } => {
                CommandError::Unavailable { message, reason_code: code, retryable }
            }
            LibraryError::Validation { message, .. } => {
                CommandError::Validation { message, reason_code: Some(code) }
            }
            LibraryError::Invariant { message, .. } => {
                CommandError::Invariant { message, reason_code: code }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code, retryable: false }
            }
        }
    }
}
