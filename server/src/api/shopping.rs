//! Shopping list endpoints: generation, provenance, and plain-text export.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use larder_core::meal_plan;
use larder_core::shopping_list::{self, IngredientSource, ShoppingItem};

use crate::api::core_error;
use crate::{get_conn, AppState};

#[derive(OpenApi)]
#[openapi(
    paths(generate, sources, export),
    components(schemas(ShoppingItem, ShoppingListResponse, IngredientSource))
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(generate))
        .route("/sources", get(sources))
        .route("/export", get(export))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RangeQuery {
    /// Range start; defaults to the current week's Monday.
    pub start: Option<NaiveDate>,
    /// Range end, inclusive; defaults to the current week's Sunday.
    pub end: Option<NaiveDate>,
    /// Subtract on-hand pantry stock (default true).
    pub use_pantry: Option<bool>,
}

impl RangeQuery {
    pub(crate) fn resolve(&self) -> (NaiveDate, NaiveDate, bool) {
        let week_start = meal_plan::week_start(None);
        let start = self.start.unwrap_or(week_start);
        let end = self.end.unwrap_or(week_start + Duration::days(6));
        (start, end, self.use_pantry.unwrap_or(true))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShoppingListResponse {
    /// Store name mapped to its lines, alphabetical within each group.
    pub stores: BTreeMap<String, Vec<ShoppingItem>>,
    /// Checklist-style rendering of the same data.
    pub plain_text: String,
}

#[utoipa::path(
    get,
    path = "/api/shopping",
    tag = "shopping",
    params(RangeQuery),
    responses((status = 200, description = "Shopping list grouped by store", body = ShoppingListResponse))
)]
pub async fn generate(State(state): State<AppState>, Query(query): Query<RangeQuery>) -> Response {
    let (start, end, use_pantry) = query.resolve();
    let mut conn = get_conn!(state);
    match shopping_list::generate(&mut conn, start, end, use_pantry) {
        Ok(list) => {
            let plain_text = shopping_list::format_shopping_list(&list);
            Json(ShoppingListResponse {
                stores: list,
                plain_text,
            })
            .into_response()
        }
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/shopping/sources",
    tag = "shopping",
    params(RangeQuery),
    responses((status = 200, description = "Which planned meals require each ingredient"))
)]
pub async fn sources(State(state): State<AppState>, Query(query): Query<RangeQuery>) -> Response {
    let (start, end, _) = query.resolve();
    let mut conn = get_conn!(state);
    match shopping_list::get_ingredient_sources(&mut conn, start, end) {
        Ok(map) => Json(map).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/shopping/export",
    tag = "shopping",
    params(RangeQuery),
    responses((status = 200, description = "Plain-text checklist attachment", content_type = "text/plain"))
)]
pub async fn export(State(state): State<AppState>, Query(query): Query<RangeQuery>) -> Response {
    let (start, end, use_pantry) = query.resolve();
    let mut conn = get_conn!(state);
    match shopping_list::generate(&mut conn, start, end, use_pantry) {
        Ok(list) => {
            let text = shopping_list::format_shopping_list(&list);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=shopping_list.txt",
                    ),
                ],
                text,
            )
                .into_response()
        }
        Err(e) => core_error(e),
    }
}
