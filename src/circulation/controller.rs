use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::Value;
use crate::circulation::command::cancel_request_cmd::{CancelRequestCommand, CancelRequestCommandRequest, CancelRequestCommandResponse};
use crate::circulation::command::check_in_cmd::{CheckInCommand, CheckInCommandRequest, CheckInCommandResponse};
use crate::circulation::command::check_out_cmd::{CheckOutCommand, CheckOutCommandRequest, CheckOutCommandResponse};
use crate::circulation::command::create_request_cmd::{CreateRequestCommand, CreateRequestCommandRequest, CreateRequestCommandResponse};
use crate::circulation::command::expire_pickup_cmd::{ExpirePickupCommand, ExpirePickupCommandRequest, ExpirePickupCommandResponse};
use crate::circulation::command::item_queue_cmd::{ItemQueueCommand, ItemQueueCommandRequest, ItemQueueCommandResponse};
use crate::circulation::command::list_loans_cmd::{ListLoansCommand, ListLoansCommandRequest, ListLoansCommandResponse};
use crate::circulation::command::list_requests_cmd::{ListRequestsCommand, ListRequestsCommandRequest, ListRequestsCommandResponse};
use crate::circulation::command::receive_in_transit_cmd::{ReceiveInTransitCommand, ReceiveInTransitCommandRequest, ReceiveInTransitCommandResponse};
use crate::circulation::command::renew_cmd::{RenewCommand, RenewCommandRequest, RenewCommandResponse};
use crate::circulation::domain::CirculationService;
use crate::circulation::factory;
use crate::core::command::{Command, CommandError};
use crate::core::controller::{AppState, json_to_server_error, ServerError};

async fn build_service(state: &AppState) -> Result<Box<dyn CirculationService>, ServerError> {
    factory::create_circulation_service(&state.config, state.store).await
        .map_err(|err| CommandError::from(err).into())
}

pub(crate) async fn check_out(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<CheckOutCommandResponse>, ServerError> {
    let req: CheckOutCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state).await?;
    let res = CheckOutCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn check_in(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<CheckInCommandResponse>, ServerError> {
    let req: CheckInCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state).await?;
    let res = CheckInCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn renew(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<RenewCommandResponse>, ServerError> {
    let req: RenewCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state).await?;
    let res = RenewCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn list_loans(
    State(state): State<AppState>,
    Query(req): Query<ListLoansCommandRequest>) -> Result<Json<ListLoansCommandResponse>, ServerError> {
    let svc = build_service(&state).await?;
    let res = ListLoansCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn create_request(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<CreateRequestCommandResponse>, ServerError> {
    let req: CreateRequestCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state).await?;
    let res = CreateRequestCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn list_requests(
    State(state): State<AppState>,
    Query(req): Query<ListRequestsCommandRequest>) -> Result<Json<ListRequestsCommandResponse>, ServerError> {
    let svc = build_service(&state).await?;
    let res = ListRequestsCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn cancel_request(
    State(state): State<AppState>,
    Path(id): Path<String>) -> Result<Json<CancelRequestCommandResponse>, ServerError> {
    let svc = build_service(&state).await?;
    let res = CancelRequestCommand::new(svc).execute(CancelRequestCommandRequest::new(id.as_str())).await?;
    Ok(Json(res))
}

pub(crate) async fn expire_pickup(
    State(state): State<AppState>,
    Path(id): Path<String>) -> Result<Json<ExpirePickupCommandResponse>, ServerError> {
    let svc = build_service(&state).await?;
    let res = ExpirePickupCommand::new(svc).execute(ExpirePickupCommandRequest::new(id.as_str())).await?;
    Ok(Json(res))
}

pub(crate) async fn receive_in_transit(
    State(state): State<AppState>,
    json: Json<Value>) -> Result<Json<ReceiveInTransitCommandResponse>, ServerError> {
    let req: ReceiveInTransitCommandRequest = serde_json::from_value(json.0).map_err(json_to_server_error)?;
    let svc = build_service(&state).await?;
    let res = ReceiveInTransitCommand::new(svc).execute(req).await?;
    Ok(Json(res))
}

pub(crate) async fn item_queue(
    State(state): State<AppState>,
    Path(barcode): Path<String>) -> Result<Json<ItemQueueCommandResponse>, ServerError> {
    let svc = build_service(&state).await?;
    let res = ItemQueueCommand::new(svc).execute(ItemQueueCommandRequest::new(barcode.as_str())).await?;
    Ok(Json(res))
}
