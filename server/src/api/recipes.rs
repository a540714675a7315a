//! Recipe endpoints: CRUD, search, and the AI-backed parse, generate, and
//! normalize operations.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use larder_core::ai::{self, NormalizationResult};
use larder_core::models::{
    Recipe, RecipeIngredient, RecipeIngredientInput, RecipeInput, RecipeWithIngredients,
};
use larder_core::{pantry, recipes};

use crate::api::{ai_error, core_error, not_found, require_ai, ErrorResponse};
use crate::{get_conn, AppState};

#[derive(OpenApi)]
#[openapi(
    paths(
        list_recipes, get_recipe, create_recipe, update_recipe, delete_recipe,
        unnormalized, normalize_recipe, parse_text, parse_url, generate
    ),
    components(schemas(
        Recipe, RecipeIngredient, RecipeWithIngredients, RecipeInput,
        RecipeIngredientInput, NormalizationResult, CreatedResponse,
        ParseTextRequest, ParseUrlRequest, GenerateRequest
    ))
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route(
            "/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/unnormalized", get(unnormalized))
        .route("/{id}/normalize", post(normalize_recipe))
        .route("/parse", post(parse_text))
        .route("/parse-url", post(parse_url))
        .route("/generate", post(generate))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Search term matched against name, description, and tags.
    pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListQuery),
    responses((status = 200, description = "Recipes with ingredients", body = Vec<RecipeWithIngredients>))
)]
pub async fn list_recipes(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Response {
    let mut conn = get_conn!(state);
    let result = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => recipes::search(&mut conn, q),
        _ => recipes::get_all(&mut conn),
    };
    match result {
        Ok(all) => Json(all).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    responses(
        (status = 200, description = "Recipe", body = RecipeWithIngredients),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let mut conn = get_conn!(state);
    match recipes::get(&mut conn, id) {
        Ok(Some(recipe)) => Json(recipe).into_response(),
        Ok(None) => not_found("Recipe"),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = RecipeInput,
    responses(
        (status = 201, description = "Recipe created", body = CreatedResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(state): State<AppState>,
    Json(input): Json<RecipeInput>,
) -> Response {
    if input.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Name cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    let mut conn = get_conn!(state);
    match recipes::add(&mut conn, &input) {
        Ok(id) => (StatusCode::CREATED, Json(CreatedResponse { id })).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    request_body = RecipeInput,
    responses(
        (status = 204, description = "Recipe updated"),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<RecipeInput>,
) -> Response {
    let mut conn = get_conn!(state);
    match recipes::get(&mut conn, id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("Recipe"),
        Err(e) => return core_error(e),
    }
    match recipes::update(&mut conn, id, &input) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    responses((status = 204, description = "Recipe and its ingredients deleted"))
)]
pub async fn delete_recipe(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let mut conn = get_conn!(state);
    match recipes::delete(&mut conn, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/unnormalized",
    tag = "recipes",
    responses((status = 200, description = "Recipes with un-normalized ingredients", body = Vec<RecipeWithIngredients>))
)]
pub async fn unnormalized(State(state): State<AppState>) -> Response {
    let mut conn = get_conn!(state);
    match recipes::get_unnormalized(&mut conn) {
        Ok(all) => Json(all).into_response(),
        Err(e) => core_error(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/normalize",
    tag = "recipes",
    responses(
        (status = 200, description = "Recipe after normalization", body = RecipeWithIngredients),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 503, description = "AI not configured", body = ErrorResponse)
    )
)]
pub async fn normalize_recipe(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let provider = match require_ai(&state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let mut conn = get_conn!(state);
    let recipe = match recipes::get(&mut conn, id) {
        Ok(Some(recipe)) => recipe,
        Ok(None) => return not_found("Recipe"),
        Err(e) => return core_error(e),
    };

    let results = match ai::normalize_ingredients(provider.as_ref(), &recipe.ingredients).await {
        Ok(results) => results,
        Err(e) => return ai_error(e),
    };

    // Persist immediately after a successful call; an empty result writes
    // nothing and leaves any earlier normalization in place.
    if let Err(e) = recipes::apply_normalization(&mut conn, id, &results) {
        return core_error(e);
    }

    match recipes::get(&mut conn, id) {
        Ok(Some(recipe)) => Json(recipe).into_response(),
        Ok(None) => not_found("Recipe"),
        Err(e) => core_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ParseTextRequest {
    pub text: String,
}

#[utoipa::path(
    post,
    path = "/api/recipes/parse",
    tag = "recipes",
    request_body = ParseTextRequest,
    responses(
        (status = 200, description = "Parsed recipe draft, not yet saved", body = RecipeInput),
        (status = 422, description = "Response contained no usable recipe", body = ErrorResponse),
        (status = 503, description = "AI not configured", body = ErrorResponse)
    )
)]
pub async fn parse_text(
    State(state): State<AppState>,
    Json(request): Json<ParseTextRequest>,
) -> Response {
    let provider = match require_ai(&state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match ai::parse_recipe_text(provider.as_ref(), &request.text).await {
        Ok(Some(draft)) => Json(draft).into_response(),
        Ok(None) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "No recipe could be extracted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => ai_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ParseUrlRequest {
    pub url: String,
}

#[utoipa::path(
    post,
    path = "/api/recipes/parse-url",
    tag = "recipes",
    request_body = ParseUrlRequest,
    responses(
        (status = 200, description = "Parsed recipe draft, not yet saved", body = RecipeInput),
        (status = 422, description = "Response contained no usable recipe", body = ErrorResponse),
        (status = 503, description = "AI not configured", body = ErrorResponse)
    )
)]
pub async fn parse_url(
    State(state): State<AppState>,
    Json(request): Json<ParseUrlRequest>,
) -> Response {
    let provider = match require_ai(&state) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match ai::parse_recipe_url(provider.as_ref(), &request.url).await {
        Ok(Some(draft)) => Json(draft).into_response(),
        Ok(None) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "No recipe could be extracted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => ai_error(e),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    #[serde(default)]
    pub preferences: String,
}

#[utoipa::path(
    post,
    path = "/api/recipes/generate",
    tag = "recipes",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated recipe draft, not yet saved", body = RecipeInput),
        (status = 422, description = "Response contained no usable recipe", body = ErrorResponse),
        (status = 503, description = "AI not configured", body = ErrorResponse)
    )
)]
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
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

    match ai::generate_recipe(provider.as_ref(), &summary, &request.preferences).await {
        Ok(Some(draft)) => Json(draft).into_response(),
        Ok(None) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "No recipe could be generated".to_string(),
            }),
        )
            .into_response(),
        Err(e) => ai_error(e),
    }
}
