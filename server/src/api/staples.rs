//! Staple endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use larder_core::models::{Staple, StapleInput};
use larder_core::staples;

use crate::api::{core_error, not_found, ErrorResponse};
use crate::{get_conn, AppState};

#[derive(OpenApi)]
#[openapi(
    paths(list_staples, needed, create_staple, update_staple, delete_staple, set_need),
    components(schemas(Staple, StapleInput, CreatedResponse, NeedRequest))
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_staples).post(create_staple))
        .route("/needed", get(needed))
        .route("/{id}", axum::routing::put(update_staple).delete(delete_staple))
        .route("/{id}/need", post(set_need))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i32,
}

#[utoipa::path(
    get,
    path = "/api/staples",
    tag = "staples",
    responses((status = 200, description = "All staples", body = Vec<Staple>))
)]
pub async fn list_staples(State(state): State<AppState>) -> Response {
    let mut conn = get_conn!(state);
    match staples::get_all(&mut conn) {
        Ok(all) => Json(all).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/staples/needed",
    tag = "staples",
    responses((status = 200, description = "Staples marked need-to-buy", body = Vec<Staple>))
)]
pub async fn needed(State(state): State<AppState>) -> Response {
    let mut conn = get_conn!(state);
    match staples::get_needed(&mut conn) {
        Ok(all) => Json(all).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/staples",
    tag = "staples",
    request_body = StapleInput,
    responses(
        (status = 201, description = "Staple created", body = CreatedResponse),
        (status = 409, description = "Name already exists", body = ErrorResponse)
    )
)]
pub async fn create_staple(
    State(state): State<AppState>,
    Json(input): Json<StapleInput>,
) -> Response {
    let mut conn = get_conn!(state);
    match staples::add(&mut conn, &input) {
        Ok(id) => (StatusCode::CREATED, Json(CreatedResponse { id })).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    put,
    path = "/api/staples/{id}",
    tag = "staples",
    request_body = StapleInput,
    responses((status = 204, description = "Staple updated"))
)]
pub async fn update_staple(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<StapleInput>,
) -> Response {
    let mut conn = get_conn!(state);
    match staples::update(&mut conn, id, &input) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/staples/{id}",
    tag = "staples",
    responses((status = 204, description = "Staple deleted"))
)]
pub async fn delete_staple(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let mut conn = get_conn!(state);
    match staples::delete(&mut conn, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NeedRequest {
    pub need_to_buy: bool,
}

#[utoipa::path(
    post,
    path = "/api/staples/{id}/need",
    tag = "staples",
    request_body = NeedRequest,
    responses(
        (status = 204, description = "Toggle saved"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn set_need(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<NeedRequest>,
) -> Response {
    let mut conn = get_conn!(state);
    match staples::get(&mut conn, id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Staple"),
        Err(e) => return core_error(e),
    }
    match staples::set_need_to_buy(&mut conn, id, request.need_to_buy) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}
