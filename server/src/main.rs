mod api;

use axum::extract::MatchedPath;
use axum::http::Request;
use axum::Router;
use std::env;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa_swagger_ui::SwaggerUi;

use larder_core::ai::{AiConfig, ClaudeProvider, LlmProvider};
use larder_core::db::{self, DbPool};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    /// None when no API key is configured; AI endpoints return 503.
    pub ai: Option<Arc<dyn LlmProvider>>,
}

fn init_telemetry() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn database_url() -> String {
    env::var("DATABASE_URL")
        .unwrap_or_else(|_| db::default_database_path().to_string_lossy().into_owned())
}

#[tokio::main]
async fn main() {
    // Dump the OpenAPI spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi().to_pretty_json().unwrap();
        println!("{}", spec);
        return;
    }

    init_telemetry();

    let pool = db::create_pool(&database_url());

    // One-time copy of legacy pantry staple flags into the staples table
    if env::args().any(|arg| arg == "--migrate-staples") {
        let mut conn = pool.get().expect("Failed to get DB connection");
        let migrated = larder_core::staples::migrate_legacy_pantry_staples(&mut conn)
            .expect("Staple migration failed");
        println!("Migrated {} legacy staple(s)", migrated);
        return;
    }

    let ai: Option<Arc<dyn LlmProvider>> = match AiConfig::from_env() {
        Ok(config) => Some(Arc::new(ClaudeProvider::new(config))),
        Err(e) => {
            tracing::warn!("AI features disabled: {}", e);
            None
        }
    };

    let state = AppState { pool, ai };

    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    let app = Router::new()
        .nest("/api/pantry", api::pantry::router())
        .nest("/api/stores", api::stores::router())
        .nest("/api/recipes", api::recipes::router())
        .nest("/api/meal-plan", api::meal_plan::router())
        .nest("/api/shopping", api::shopping::router())
        .nest("/api/staples", api::staples::router())
        .nest("/api/prices", api::prices::router())
        .merge(swagger_ui)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                ),
        );

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());
    tracing::info!("Swagger UI available at http://localhost:{port}/swagger-ui/");

    axum::serve(listener, app).await.unwrap();
}
