include!("../../lib.rs");
use axum::{
    routing::{get, post},
    Router,
};
use lambda_http::{run, Error};
use crate::utils::ddb::setup_tracing;
use crate::core::controller::AppState;
use crate::core::repository::RepositoryStore;
use crate::circulation::controller::{cancel_request, check_in, check_out, create_request, expire_pickup, item_queue,
                                     list_loans, list_requests, receive_in_transit, renew};

const DEV_MODE: bool = true;

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let state = if DEV_MODE {
        std::env::set_var("AWS_LAMBDA_FUNCTION_NAME", "_");
        std::env::set_var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE", "4096");
        std::env::set_var("AWS_LAMBDA_FUNCTION_VERSION", "1");
        std::env::set_var("AWS_LAMBDA_RUNTIME_API", "http://[::]:9000/.rt");
        AppState::new("dev", RepositoryStore::LocalDynamoDB)
    } else {
        AppState::new("prod", RepositoryStore::DynamoDB)
    };

    let app = Router::new()
        .route("/circulation/check-out", post(check_out))
        .route("/circulation/check-in", post(check_in))
        .route("/circulation/renew", post(renew))
        .route("/circulation/loans", get(list_loans))
        .route("/circulation/requests", get(list_requests).post(create_request))
        .route("/circulation/requests/:id/cancel", post(cancel_request))
        .route("/circulation/requests/:id/expire", post(expire_pickup))
        .route("/circulation/in-transit/receive", post(receive_in_transit))
        .route("/circulation/items/:barcode/queue", get(item_queue))
        .with_state(state);

    run(app).await
}
