pub mod meal_plan;
pub mod pantry;
pub mod prices;
pub mod recipes;
pub mod shopping;
pub mod staples;
pub mod stores;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use larder_core::ai::{AiError, LlmProvider};
use larder_core::CoreError;

use crate::AppState;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Grab a pooled connection or bail out of the handler with a 500.
#[macro_export]
macro_rules! get_conn {
    ($state:expr) => {
        match $state.pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to get DB connection: {}", e);
                return (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json($crate::api::ErrorResponse {
                        error: "Database unavailable".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    };
}

/// Map a core error onto a response. Conflicts are the caller's problem;
/// everything else is logged and reported as a 500.
pub fn core_error(err: CoreError) -> Response {
    match &err {
        CoreError::AlreadyExists { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
        _ => {
            tracing::error!("request failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal error".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Map an AI boundary error onto a response.
pub fn ai_error(err: AiError) -> Response {
    tracing::error!("AI call failed: {}", err);
    let status = match err {
        AiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        AiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// The configured provider, or a 503 telling the user how to enable AI
/// features.
pub fn require_ai(state: &AppState) -> Result<Arc<dyn LlmProvider>, Response> {
    state.ai.clone().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "AI features not configured: set ANTHROPIC_API_KEY".to_string(),
            }),
        )
            .into_response()
    })
}

pub fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("{what} not found"),
        }),
    )
        .into_response()
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(components(schemas(ErrorResponse)))]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        pantry::ApiDoc::openapi(),
        stores::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        meal_plan::ApiDoc::openapi(),
        shopping::ApiDoc::openapi(),
        staples::ApiDoc::openapi(),
        prices::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);
        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
