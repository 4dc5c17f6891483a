use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::error;
use crate::core::command::{CommandError, ErrorBody};
use crate::core::domain::Configuration;
use crate::core::library::PageMeta;
use crate::core::repository::RepositoryStore;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct AppState {
    pub(crate) config: Configuration,
    pub(crate) store: RepositoryStore,
}

impl AppState {
    pub fn new(branch: &str, store: RepositoryStore) -> AppState {
        AppState {
            config: Configuration::from_env(branch),
            store,
        }
    }
}

// ListResponse is the envelope of every listing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

// page parameters shared by listing endpoints, pages are 1-based
pub(crate) const DEFAULT_PAGE_SIZE: usize = 50;

pub(crate) type ServerError = (StatusCode, String);

pub fn json_to_server_error(err: serde_json::Error) -> ServerError {
    let body = ErrorBody {
        code: "ErrValidation".to_string(),
        kind: "validation".to_string(),
        message: format!("{}", err),
        retryable: false,
    };
    (StatusCode::BAD_REQUEST, body_to_string(&body))
}

fn body_to_string(body: &ErrorBody) -> String {
    serde_json::to_string(body).unwrap_or_else(|_| body.message.to_string())
}

impl From<CommandError> for ServerError {
    fn from(err: CommandError) -> Self {
        let status = match err {
            CommandError::NotFound { .. } => { StatusCode::NOT_FOUND }
            CommandError::Conflict { .. } => { StatusCode::CONFLICT }
            CommandError::PolicyViolation { .. } => { StatusCode::UNPROCESSABLE_ENTITY }
            CommandError::Unavailable { .. } => { StatusCode::SERVICE_UNAVAILABLE }
            CommandError::Serialization { .. } => { StatusCode::BAD_REQUEST }
            CommandError::Validation { .. } => { StatusCode::BAD_REQUEST }
            CommandError::Database { .. } => { StatusCode::INTERNAL_SERVER_ERROR }
            CommandError::Invariant { .. } => {
                error!("invariant violated {:?}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            CommandError::Runtime { .. } => { StatusCode::INTERNAL_SERVER_ERROR }
        };
        (status, body_to_string(&err.to_body()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use crate::core::command::{CommandError, ErrorBody};
    use crate::core::controller::{json_to_server_error, ServerError};
    use crate::core::library::{LibraryError, ReasonCode};

    #[tokio::test]
    async fn test_should_map_command_errors_to_status() {
        let cases = vec![
            (LibraryError::not_found("x", ReasonCode::ItemNotFound), StatusCode::NOT_FOUND),
            (LibraryError::conflict("x", ReasonCode::ItemAlreadyOnLoan), StatusCode::CONFLICT),
            (LibraryError::policy("x", ReasonCode::MaxRenewalsReached), StatusCode::UNPROCESSABLE_ENTITY),
            (LibraryError::lock_timeout("x"), StatusCode::SERVICE_UNAVAILABLE),
            (LibraryError::validation("x", Some(ReasonCode::InvalidAmount)), StatusCode::BAD_REQUEST),
            (LibraryError::invariant("x", ReasonCode::BalanceMismatch), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let code = err.code();
            let (actual, body): ServerError = CommandError::from(err).into();
            assert_eq!(status, actual);
            let body: ErrorBody = serde_json::from_str(body.as_str()).expect("json body");
            assert_eq!(code, body.code);
        }
    }

    #[tokio::test]
    async fn test_should_map_json_error() {
        let err = serde_json::from_str::<i32>("x").unwrap_err();
        let (status, body) = json_to_server_error(err);
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert!(body.contains("ErrValidation"));
    }
}
