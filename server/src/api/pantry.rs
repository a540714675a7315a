//! Pantry inventory endpoints, including CSV import.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use larder_core::models::{PantryItem, PantryItemInput};
use larder_core::pantry::{self, CsvImportSummary};

use crate::api::{core_error, not_found, ErrorResponse};
use crate::{get_conn, AppState};

#[derive(OpenApi)]
#[openapi(
    paths(list_items, get_item, create_item, update_item, delete_item, delete_many, expiring, locations, categories, import_csv),
    components(schemas(PantryItem, PantryItemInput, CsvImportSummary, DeleteManyRequest, DeleteManyResponse, ImportCsvRequest, CreatedResponse))
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
        .route("/delete-many", post(delete_many))
        .route("/expiring", get(expiring))
        .route("/locations", get(locations))
        .route("/categories", get(categories))
        .route("/import", post(import_csv))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    pub location: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i32,
}

#[utoipa::path(
    get,
    path = "/api/pantry",
    tag = "pantry",
    params(ListQuery),
    responses((status = 200, description = "All pantry items", body = Vec<PantryItem>))
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let mut conn = get_conn!(state);
    match pantry::get_all(&mut conn, query.location.as_deref(), query.category.as_deref()) {
        Ok(items) => Json(items).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/pantry/{id}",
    tag = "pantry",
    responses(
        (status = 200, description = "Pantry item", body = PantryItem),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_item(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let mut conn = get_conn!(state);
    match pantry::get(&mut conn, id) {
        Ok(Some(item)) => Json(item).into_response(),
        Ok(None) => not_found("Pantry item"),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/pantry",
    tag = "pantry",
    request_body = PantryItemInput,
    responses((status = 201, description = "Item created", body = CreatedResponse))
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<PantryItemInput>,
) -> Response {
    let mut conn = get_conn!(state);
    match pantry::add(&mut conn, &input) {
        Ok(id) => (StatusCode::CREATED, Json(CreatedResponse { id })).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    put,
    path = "/api/pantry/{id}",
    tag = "pantry",
    request_body = PantryItemInput,
    responses(
        (status = 204, description = "Item updated"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<PantryItemInput>,
) -> Response {
    let mut conn = get_conn!(state);
    match pantry::get(&mut conn, id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Pantry item"),
        Err(e) => return core_error(e),
    }
    match pantry::update(&mut conn, id, &input) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/pantry/{id}",
    tag = "pantry",
    responses((status = 204, description = "Item deleted"))
)]
pub async fn delete_item(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let mut conn = get_conn!(state);
    match pantry::delete(&mut conn, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteManyRequest {
    pub ids: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteManyResponse {
    pub deleted: usize,
}

#[utoipa::path(
    post,
    path = "/api/pantry/delete-many",
    tag = "pantry",
    request_body = DeleteManyRequest,
    responses((status = 200, description = "Items deleted", body = DeleteManyResponse))
)]
pub async fn delete_many(
    State(state): State<AppState>,
    Json(request): Json<DeleteManyRequest>,
) -> Response {
    let mut conn = get_conn!(state);
    match pantry::delete_many(&mut conn, &request.ids) {
        Ok(deleted) => Json(DeleteManyResponse { deleted }).into_response(),
        Err(e) => core_error(e),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExpiringQuery {
    /// Days ahead to look (default 7).
    pub days: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/pantry/expiring",
    tag = "pantry",
    params(ExpiringQuery),
    responses((status = 200, description = "Items expiring soon", body = Vec<PantryItem>))
)]
pub async fn expiring(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> Response {
    let mut conn = get_conn!(state);
    match pantry::get_expiring_soon(&mut conn, query.days.unwrap_or(7)) {
        Ok(items) => Json(items).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/pantry/locations",
    tag = "pantry",
    responses((status = 200, description = "Distinct locations", body = Vec<String>))
)]
pub async fn locations(State(state): State<AppState>) -> Response {
    let mut conn = get_conn!(state);
    match pantry::get_locations(&mut conn) {
        Ok(values) => Json(values).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/pantry/categories",
    tag = "pantry",
    responses((status = 200, description = "Distinct categories", body = Vec<String>))
)]
pub async fn categories(State(state): State<AppState>) -> Response {
    let mut conn = get_conn!(state);
    match pantry::get_categories(&mut conn) {
        Ok(values) => Json(values).into_response(),
        Err(e) => core_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportCsvRequest {
    /// Raw PantryChecker CSV content.
    pub csv: String,
}

#[utoipa::path(
    post,
    path = "/api/pantry/import",
    tag = "pantry",
    request_body = ImportCsvRequest,
    responses(
        (status = 200, description = "Import summary", body = CsvImportSummary),
        (status = 400, description = "Unreadable CSV", body = ErrorResponse)
    )
)]
pub async fn import_csv(
    State(state): State<AppState>,
    Json(request): Json<ImportCsvRequest>,
) -> Response {
    let mut conn = get_conn!(state);
    match pantry::import_csv(&mut conn, request.csv.as_bytes()) {
        Ok(summary) => Json(summary).into_response(),
        Err(larder_core::CoreError::Csv(e)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("CSV import failed: {e}"),
            }),
        )
            .into_response(),
        Err(e) => core_error(e),
    }
}
