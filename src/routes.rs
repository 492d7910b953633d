use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, AppResult};
use crate::services::hierarchy_service::MISSING_ORGANIZATION_ID;
use crate::services::HierarchyService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub hierarchy: HierarchyService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/GenerateJSONStructure/:organization_id",
            post(generate_json_structure),
        )
        .route("/GenerateJSONStructure", post(missing_organization_id))
        .route("/GenerateJSONStructure/", post(missing_organization_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn generate_json_structure(
    State(state): State<AppState>,
    Path(organization_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let body = state
        .hierarchy
        .generate_json_structure(&organization_id)
        .await?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

async fn missing_organization_id() -> AppError {
    AppError::InvalidInput(MISSING_ORGANIZATION_ID.to_string())
}
