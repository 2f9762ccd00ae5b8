pub mod analytics;
pub mod flashcards;
pub mod health;
pub mod performance;
pub mod planning;
pub mod reports;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::middleware::request_id;
use crate::response::AppError;
use crate::state::AppState;
use crate::validation::validate_user_id;

/// Maximum request body size: 256 KiB.
const MAX_BODY_SIZE: usize = 256 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(reports::router())
        .merge(performance::router())
        .merge(flashcards::router())
        .merge(planning::router())
        .nest("/analytics", analytics::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

/// Users are identified by path segment only.
pub(crate) fn require_user_id(user_id: &str) -> Result<(), AppError> {
    validate_user_id(user_id).map_err(|msg| AppError::bad_request("INVALID_USER_ID", msg))
}
