use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::analytics::extract::normalize_subject_name;
use crate::response::{ok, AppError};
use crate::routes::require_user_id;
use crate::services::performance;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/performance/dashboard", get(dashboard))
        .route("/users/:user_id/performance/trends", get(trends))
        .route("/users/:user_id/performance/predictions", get(predictions))
        .route("/users/:user_id/performance/subjects", get(subjects))
}

async fn dashboard(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    let view = performance::dashboard(
        state.store(),
        &user_id,
        state.config().analytics.score_cutoffs(),
        Utc::now(),
    )?;
    Ok(ok(view))
}

#[derive(Debug, Deserialize)]
struct TrendsQuery {
    subject: Option<String>,
}

async fn trends(
    Path(user_id): Path<String>,
    Query(q): Query<TrendsQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    let subject = q
        .subject
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(normalize_subject_name);
    let series = performance::trends(state.store(), &user_id, subject.as_deref())?;
    Ok(ok(series))
}

async fn predictions(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    Ok(ok(performance::predictions(state.store(), &user_id)?))
}

async fn subjects(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    Ok(ok(state.store().list_subject_performance(&user_id)?))
}
