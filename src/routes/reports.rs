use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::extract::extract_grades_from_text;
use crate::analytics::gpa::calculate_gpa;
use crate::analytics::report::{analyze_report, fallback_recommendations, ReportAnalysis};
use crate::constants::{DEFAULT_REPORT_LIMIT, MAX_EXTRACT_TEXT_LEN, MAX_LIST_LIMIT};
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::routes::require_user_id;
use crate::services::reports::{ingest_report, NewReport};
use crate::state::AppState;
use crate::validation::{validate_grades, validate_report_date, validate_term, validate_year};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/reports", post(create_report).get(list_reports))
        .route(
            "/users/:user_id/reports/:report_id/analysis",
            get(report_analysis),
        )
        .route("/reports/extract", post(extract_grades))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateReportRequest {
    term: u32,
    year: i32,
    report_date: Option<DateTime<Utc>>,
    grades: BTreeMap<String, String>,
}

async fn create_report(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    validate_term(req.term).map_err(|msg| AppError::bad_request("INVALID_TERM", msg))?;
    validate_year(req.year).map_err(|msg| AppError::bad_request("INVALID_YEAR", msg))?;
    let grades =
        validate_grades(&req.grades).map_err(|msg| AppError::bad_request("INVALID_GRADES", &msg))?;

    let now = Utc::now();
    let report_date = req.report_date.unwrap_or(now);
    validate_report_date(report_date)
        .map_err(|msg| AppError::bad_request("INVALID_REPORT_DATE", msg))?;

    let ingested = ingest_report(
        state.store(),
        NewReport {
            user_id,
            term: req.term,
            year: req.year,
            report_date,
            grades,
        },
        &state.config().analytics,
        now,
    )?;

    Ok(created(ingested))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_reports(
    Path(user_id): Path<String>,
    Query(q): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    let limit = q.limit.unwrap_or(DEFAULT_REPORT_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let reports = state.store().list_reports(&user_id, limit)?;
    Ok(ok(reports))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResponse {
    report_id: String,
    previous_report_id: Option<String>,
    analysis: ReportAnalysis,
    recommendations: Vec<String>,
    recommendation_source: &'static str,
}

async fn report_analysis(
    Path((user_id, report_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    let (report, previous) = state
        .store()
        .get_report_with_previous(&user_id, &report_id)?;

    let thresholds = &state.config().analytics;
    let analysis = analyze_report(
        &report.grades,
        previous.as_ref().map(|p| &p.grades),
        thresholds.strong_grade_threshold.as_str(),
        thresholds.weak_grade_threshold.as_str(),
    );

    let (recommendations, recommendation_source) =
        match state.generator().recommendations(&analysis).await {
            Ok(recs) => (recs, "generator"),
            Err(error) => {
                tracing::info!(error = %error, report_id = %report.id, "Falling back to rule-based recommendations");
                (
                    fallback_recommendations(&analysis.strong_subjects, &analysis.weak_subjects),
                    "rules",
                )
            }
        };

    Ok(ok(AnalysisResponse {
        report_id: report.id,
        previous_report_id: previous.map(|p| p.id),
        analysis,
        recommendations,
        recommendation_source,
    }))
}

#[derive(Debug, Deserialize)]
struct ExtractRequest {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractResponse {
    grades: BTreeMap<String, String>,
    subject_count: usize,
    overall_gpa: f64,
}

async fn extract_grades(JsonBody(req): JsonBody<ExtractRequest>) -> Result<impl IntoResponse, AppError> {
    if req.text.len() > MAX_EXTRACT_TEXT_LEN {
        return Err(AppError::bad_request(
            "TEXT_TOO_LONG",
            "report text exceeds the accepted length",
        ));
    }
    let grades = extract_grades_from_text(&req.text);
    if grades.is_empty() {
        tracing::debug!(text_len = req.text.len(), "No grades found in report text");
    }
    Ok(ok(ExtractResponse {
        subject_count: grades.len(),
        overall_gpa: calculate_gpa(&grades),
        grades,
    }))
}
