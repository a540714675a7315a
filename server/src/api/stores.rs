//! Store endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use larder_core::models::{Store, StoreInput};
use larder_core::stores;

use crate::api::{core_error, not_found, ErrorResponse};
use crate::{get_conn, AppState};

#[derive(OpenApi)]
#[openapi(
    paths(list_stores, get_store, create_store, update_store, delete_store),
    components(schemas(Store, StoreInput, CreatedResponse))
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route(
            "/{id}",
            get(get_store).put(update_store).delete(delete_store),
        )
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i32,
}

#[utoipa::path(
    get,
    path = "/api/stores",
    tag = "stores",
    responses((status = 200, description = "All stores", body = Vec<Store>))
)]
pub async fn list_stores(State(state): State<AppState>) -> Response {
    let mut conn = get_conn!(state);
    match stores::get_all(&mut conn) {
        Ok(all) => Json(all).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}",
    tag = "stores",
    responses(
        (status = 200, description = "Store", body = Store),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_store(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let mut conn = get_conn!(state);
    match stores::get(&mut conn, id) {
        Ok(Some(store)) => Json(store).into_response(),
        Ok(None) => not_found("Store"),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/stores",
    tag = "stores",
    request_body = StoreInput,
    responses(
        (status = 201, description = "Store created", body = CreatedResponse),
        (status = 409, description = "Name already exists", body = ErrorResponse)
    )
)]
pub async fn create_store(
    State(state): State<AppState>,
    Json(input): Json<StoreInput>,
) -> Response {
    let mut conn = get_conn!(state);
    match stores::add(&mut conn, &input) {
        Ok(id) => (StatusCode::CREATED, Json(CreatedResponse { id })).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    put,
    path = "/api/stores/{id}",
    tag = "stores",
    request_body = StoreInput,
    responses((status = 204, description = "Store updated"))
)]
pub async fn update_store(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<StoreInput>,
) -> Response {
    let mut conn = get_conn!(state);
    match stores::update(&mut conn, id, &input) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/stores/{id}",
    tag = "stores",
    responses((status = 204, description = "Store deleted; references are nulled"))
)]
pub async fn delete_store(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let mut conn = get_conn!(state);
    match stores::delete(&mut conn, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}
