// src/routes.rs

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

async fn health(State(app_state): State<AppState>) -> (StatusCode, &'static str) {
    match sqlx::query("SELECT 1").execute(&app_state.db_pool).await {
        Ok(_) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!("Health check sem banco: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "DB indisponível")
        }
    }
}

pub fn app(app_state: AppState) -> Router {
    let report_routes = Router::new()
        .route("/{kind}", get(handlers::reports::list_report))
        .route("/{kind}/generate", post(handlers::reports::generate_report))
        .route("/{kind}/export", post(handlers::reports::export_report))
        .route("/{kind}/audit", get(handlers::reports::audit_report))
        .route("/{kind}/rows", delete(handlers::reports::cleanup_report))
        .route("/{kind}/table", delete(handlers::reports::drop_report_table));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(health))
        .nest("/api/reports", report_routes)
        .with_state(app_state)
}
