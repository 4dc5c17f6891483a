include!("../../lib.rs");
use axum::{
    routing::{get, post},
    Router,
};
use lambda_http::{run, Error};
use crate::utils::ddb::setup_tracing;
use crate::core::controller::AppState;
use crate::core::repository::RepositoryStore;
use crate::fees::controller::{apply_payment, create_fee, forgive_fee, get_fee, list_fees, list_payments, resume_fee, suspend_fee, waive_fee};

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
        .route("/fees", get(list_fees).post(create_fee))
        .route("/fees/:id", get(get_fee))
        .route("/fees/:id/payments", get(list_payments).post(apply_payment))
        .route("/fees/:id/waive", post(waive_fee))
        .route("/fees/:id/forgive", post(forgive_fee))
        .route("/fees/:id/suspend", post(suspend_fee))
        .route("/fees/:id/resume", post(resume_fee))
        .with_state(state);

    run(app).await
}
