//! Meal plan endpoints: the week grid, cell assignment, and AI week
//! suggestions.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi, ToSchema};

use larder_core::ai::{self, MealSuggestion};
use larder_core::meal_plan::{self, DayPlan, SlotCell};
use larder_core::models::PlannedMeal;
use larder_core::{pantry, recipes};

use crate::api::{ai_error, core_error, require_ai};
use crate::{get_conn, AppState};

#[derive(OpenApi)]
#[openapi(
    paths(week, set_meal, clear_meal, suggest),
    components(schemas(DayPlan, SlotCell, PlannedMeal, SetMealRequest, ClearMealRequest, SuggestRequest, MealSuggestion))
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/week", get(week))
        .route("/set", post(set_meal))
        .route("/clear", post(clear_meal))
        .route("/suggest", post(suggest))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct WeekQuery {
    /// Any date inside the wanted week; defaults to today. The grid starts
    /// on the Monday on or before it.
    pub date: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/meal-plan/week",
    tag = "meal_plan",
    params(WeekQuery),
    responses((status = 200, description = "Full 7-day grid, every slot present", body = Vec<DayPlan>))
)]
pub async fn week(State(state): State<AppState>, Query(query): Query<WeekQuery>) -> Response {
    let start = meal_plan::week_start(query.date);
    let mut conn = get_conn!(state);
    match meal_plan::get_week(&mut conn, start) {
        Ok(grid) => Json(grid).into_response(),
        Err(e) => core_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetMealRequest {
    pub date: NaiveDate,
    pub slot: String,
    pub recipe_id: Option<i32>,
    #[serde(default = "default_servings")]
    pub servings: i32,
    pub notes: Option<String>,
}

fn default_servings() -> i32 {
    1
}

#[utoipa::path(
    post,
    path = "/api/meal-plan/set",
    tag = "meal_plan",
    request_body = SetMealRequest,
    responses((status = 204, description = "Cell assigned or replaced"))
)]
pub async fn set_meal(
    State(state): State<AppState>,
    Json(request): Json<SetMealRequest>,
) -> Response {
    let mut conn = get_conn!(state);
    match meal_plan::set_meal(
        &mut conn,
        request.date,
        &request.slot,
        request.recipe_id,
        request.servings,
        request.notes.as_deref(),
    ) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClearMealRequest {
    pub date: NaiveDate,
    pub slot: String,
}

#[utoipa::path(
    post,
    path = "/api/meal-plan/clear",
    tag = "meal_plan",
    request_body = ClearMealRequest,
    responses((status = 204, description = "Cell cleared; clearing an empty cell is a no-op"))
)]
pub async fn clear_meal(
    State(state): State<AppState>,
    Json(request): Json<ClearMealRequest>,
) -> Response {
    let mut conn = get_conn!(state);
    match meal_plan::clear_meal(&mut conn, request.date, &request.slot) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SuggestRequest {
    #[serde(default)]
    pub preferences: String,
}

#[utoipa::path(
    post,
    path = "/api/meal-plan/suggest",
    tag = "meal_plan",
    request_body = SuggestRequest,
    responses(
        (status = 200, description = "Suggested meals for the week", body = Vec<MealSuggestion>),
        (status = 503, description = "AI not configured", body = crate::api::ErrorResponse)
    )
)]
pub async fn suggest(
    State(state): State<AppState>,
    Json(request): Json<SuggestRequest>,
) -> Response {
    let provider = match require_ai(&state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let mut conn = get_conn!(state);
    let summary = match pantry::summary(&mut conn) {
        Ok(summary) => summary,
        Err(e) => return core_error(e),
    };
    let saved = match recipes::get_all(&mut conn) {
        Ok(saved) => saved.into_iter().map(|r| r.recipe).collect::<Vec<_>>(),
        Err(e) => return core_error(e),
    };

    match ai::suggest_week(provider.as_ref(), &summary, &saved, &request.preferences).await {
        Ok(suggestions) => Json(suggestions).into_response(),
        Err(e) => ai_error(e),
    }
}
