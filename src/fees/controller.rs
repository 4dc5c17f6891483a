use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::Value;
use crate::core::command::{Command, CommandError};
use crate::core::controller::{AppState, json_to_server_error, ServerError};
use crate::fees::command::apply_payment_cmd::{ApplyPaymentCommand, ApplyPaymentCommandRequest, ApplyPaymentCommandResponse};
use crate::fees::command::create_fee_cmd::{CreateFeeCommand, CreateFeeCommandRequest, CreateFeeCommandResponse};
use crate::fees::command::forgive_fee_cmd::{ForgiveFeeCommand, ForgiveFeeCommandRequest, ForgiveFeeCommandResponse};
use crate::fees::command::get_fee_cmd::{GetFeeCommand, GetFeeCommandRequest, GetFeeCommandResponse};
use crate::fees::command::list_fees_cmd::{ListFeesCommand, ListFeesCommandRequest, ListFeesCommandResponse};
use crate::fees::command::list_payments_cmd::{ListPaymentsCommand, ListPaymentsCommandRequest, ListPaymentsCommandResponse};
use crate::fees::command::resume_fee_cmd::{ResumeFeeCommand, ResumeFeeCommandRequest, ResumeFeeCommandResponse};
use crate::fees::command::suspend_fee_cmd::{SuspendFeeCommand, SuspendFeeCommandRequest, SuspendFeeCommandResponse};
use crate::fees::command::waive_fee_cmd::{WaiveFeeCommand, WaiveFeeCommandRequest, WaiveFeeCommandResponse};
use crate::fees::domain::FeeService;
use crate::fees::factory;
use crate::patrons::factory::create_patron_service;

async fn build_service(state: &AppState) -> Result<Box<dyn FeeService>, ServerError> {
    factory::create_fee_service(&state.config, state.store).await
        .map_err(|err| CommandError::from(err).into())
}

pub(crate) async fn create_fee(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<CreateFeeCommandResponse>, ServerError> {
    let req: CreateFeeCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state).await?;
    let patron_svc = create_patron_service(&state.config, state.store).await.map_err(CommandError::from)?;
    let res = CreateFeeCommand::new(svc, patron_svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn get_fee(
    State(state): State<AppState>,
    Path(id): Path<String>) -> Result<Json<GetFeeCommandResponse>, ServerError> {
    let svc = build_service(&state).await?;
    let res = GetFeeCommand::new(svc).execute(GetFeeCommandRequest::new(id.as_str())).await?;
    Ok(Json(res))
}

pub(crate) async fn list_fees(
    State(state): State<AppState>,
    Query(req): Query<ListFeesCommandRequest>) -> Result<Json<ListFeesCommandResponse>, ServerError> {
    let svc = build_service(&state).await?;
    let res = ListFeesCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn apply_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    json: Json<Value>) -> Result<Json<ApplyPaymentCommandResponse>, ServerError> {
    let mut req: ApplyPaymentCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.fee_id = id;
    let svc = build_service(&state).await?;
    let res = ApplyPaymentCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(mut req): Query<ListPaymentsCommandRequest>) -> Result<Json<ListPaymentsCommandResponse>, ServerError> {
    req.fee_id = id;
    let svc = build_service(&state).await?;
    let res = ListPaymentsCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn waive_fee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    json: Json<Value>) -> Result<Json<WaiveFeeCommandResponse>, ServerError> {
    let mut req: WaiveFeeCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.fee_id = id;
    let svc = build_service(&state).await?;
    let res = WaiveFeeCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn forgive_fee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    json: Json<Value>) -> Result<Json<ForgiveFeeCommandResponse>, ServerError> {
    let mut req: ForgiveFeeCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    req.fee_id = id;
    let svc = build_service(&state).await?;
    let res = ForgiveFeeCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn suspend_fee(
    State(state): State<AppState>,
    Path(id): Path<String>) -> Result<Json<SuspendFeeCommandResponse>, ServerError> {
    let svc = build_service(&state).await?;
    let res = SuspendFeeCommand::new(svc).execute(SuspendFeeCommandRequest::new(id.as_str())).await?;
    Ok(Json(res))
}

pub(crate) async fn resume_fee(
    State(state): State<AppState>,
    Path(id): Path<String>) -> Result<Json<ResumeFeeCommandResponse>, ServerError> {
    let svc = build_service(&state).await?;
    let res = ResumeFeeCommand::new(svc).execute(ResumeFeeCommandRequest::new(id.as_str())).await?;
    Ok(Json(res))
}
