//! Known price endpoints: manual upserts, receipt parsing, and bulk AI
//! estimation for the current shopping list.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use larder_core::ai::{self, ImageAttachment, ReceiptItem};
use larder_core::known_prices::{self, PriceUpdate};
use larder_core::models::KnownPrice;
use larder_core::shopping_list;

use crate::api::{ai_error, core_error, require_ai};
use crate::{get_conn, AppState};

use super::shopping::RangeQuery;

#[derive(OpenApi)]
#[openapi(
    paths(list_prices, upsert_price, delete_price, parse_receipt, estimate),
    components(schemas(KnownPrice, PriceUpdate, ImageAttachment, ReceiptItem, ReceiptRequest, EstimateResponse))
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_prices).post(upsert_price))
        .route("/{id}", delete(delete_price))
        .route("/receipt", post(parse_receipt))
        .route("/estimate", post(estimate))
}

#[utoipa::path(
    get,
    path = "/api/prices",
    tag = "prices",
    responses((status = 200, description = "All known prices", body = Vec<KnownPrice>))
)]
pub async fn list_prices(State(state): State<AppState>) -> Response {
    let mut conn = get_conn!(state);
    match known_prices::get_all(&mut conn) {
        Ok(all) => Json(all).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/prices",
    tag = "prices",
    request_body = PriceUpdate,
    responses((status = 204, description = "Price upserted"))
)]
pub async fn upsert_price(
    State(state): State<AppState>,
    Json(price): Json<PriceUpdate>,
) -> Response {
    let mut conn = get_conn!(state);
    match known_prices::upsert(&mut conn, &price) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/prices/{id}",
    tag = "prices",
    responses((status = 204, description = "Price deleted"))
)]
pub async fn delete_price(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let mut conn = get_conn!(state);
    match known_prices::delete(&mut conn, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReceiptRequest {
    /// Receipt photos as base64 payloads.
    pub images: Vec<ImageAttachment>,
}

#[utoipa::path(
    post,
    path = "/api/prices/receipt",
    tag = "prices",
    request_body = ReceiptRequest,
    responses(
        (status = 200, description = "Parsed line items, already upserted into known prices", body = Vec<ReceiptItem>),
        (status = 503, description = "AI not configured", body = crate::api::ErrorResponse)
    )
)]
pub async fn parse_receipt(
    State(state): State<AppState>,
    Json(request): Json<ReceiptRequest>,
) -> Response {
    let provider = match require_ai(&state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let items = match ai::parse_receipt_images(provider.as_ref(), &request.images).await {
        Ok(items) => items,
        Err(e) => return ai_error(e),
    };

    let updates: Vec<PriceUpdate> = items
        .iter()
        .map(|item| PriceUpdate {
            item_name: item.item_name.clone(),
            unit_price: item.unit_price,
            unit: None,
            store_id: None,
        })
        .collect();

    let mut conn = get_conn!(state);
    if let Err(e) = known_prices::bulk_upsert(&mut conn, &updates) {
        return core_error(e);
    }

    Json(items).into_response()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EstimateResponse {
    /// Folded item name mapped to the estimated unit price.
    pub prices: std::collections::HashMap<String, f64>,
}

#[utoipa::path(
    post,
    path = "/api/prices/estimate",
    tag = "prices",
    params(RangeQuery),
    responses(
        (status = 200, description = "Estimated prices for unpriced shopping list lines, saved as known prices", body = EstimateResponse),
        (status = 503, description = "AI not configured", body = crate::api::ErrorResponse)
    )
)]
pub async fn estimate(State(state): State<AppState>, Query(query): Query<RangeQuery>) -> Response {
    let provider = match require_ai(&state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let (start, end, use_pantry) = query.resolve();
    let mut conn = get_conn!(state);
    let list = match shopping_list::generate(&mut conn, start, end, use_pantry) {
        Ok(list) => list,
        Err(e) => return core_error(e),
    };

    // Only lines with no resolved price need an estimate.
    let items: Vec<(String, f64, String)> = list
        .values()
        .flatten()
        .filter(|item| item.unit_price.is_none())
        .map(|item| {
            (
                item.name.clone(),
                item.quantity.unwrap_or(0.0),
                item.unit.clone().unwrap_or_default(),
            )
        })
        .collect();

    let prices = match ai::estimate_prices(provider.as_ref(), &items).await {
        Ok(prices) => prices,
        Err(e) => return ai_error(e),
    };

    let updates: Vec<PriceUpdate> = prices
        .iter()
        .map(|(name, price)| PriceUpdate {
            item_name: name.clone(),
            unit_price: *price,
            unit: None,
            store_id: None,
        })
        .collect();
    if let Err(e) = known_prices::bulk_upsert(&mut conn, &updates) {
        return core_error(e);
    }

    Json(EstimateResponse { prices }).into_response()
}
