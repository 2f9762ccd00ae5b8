use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::performance::classify_weak;
use crate::constants::MAX_SUBJECTS_PER_REQUEST;
use crate::extractors::JsonBody;
use crate::planning::term::{term_dates, TermDates};
use crate::planning::{allocate, parse_active_days, study_window_days, StudyAllocation};
use crate::response::{created, ok, AppError};
use crate::routes::require_user_id;
use crate::services::study_plans::{generate_study_plan, NewStudyPlan};
use crate::state::AppState;
use crate::validation::{validate_subject, validate_year};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id/study-plan/allocation", post(allocation))
        .route(
            "/users/:user_id/study-plans",
            post(create_study_plan).get(list_study_plans),
        )
        .route("/users/:user_id/study-plans/:plan_id", get(get_study_plan))
        .route("/terms/:year/:term", get(term))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllocationRequest {
    weak_subjects: Option<Vec<String>>,
    grades: Option<BTreeMap<String, String>>,
    weights: Option<BTreeMap<String, f64>>,
    exam_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AllocationResponse {
    window_days: i64,
    total_weekly_hours: f64,
    based_on_report_id: Option<String>,
    allocations: Vec<StudyAllocation>,
}

const MAX_WEEKLY_HOURS: f64 = 168.0;

fn too_many_subjects() -> AppError {
    AppError::bad_request(
        "TOO_MANY_SUBJECTS",
        &format!("at most {MAX_SUBJECTS_PER_REQUEST} subjects are accepted"),
    )
}

fn normalize_keys<V: Clone>(map: &BTreeMap<String, V>) -> Result<BTreeMap<String, V>, AppError> {
    map.iter()
        .map(|(subject, value)| {
            let name = validate_subject(subject)
                .map_err(|msg| AppError::bad_request("INVALID_SUBJECT", msg))?;
            Ok((name, value.clone()))
        })
        .collect()
}

/// Weak subjects and grades default to the user's latest report.
async fn allocation(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AllocationRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;

    let latest = state.store().list_reports(&user_id, 1)?.into_iter().next();
    let grades = match &req.grades {
        Some(grades) => normalize_keys(grades)?,
        None => latest.as_ref().map(|r| r.grades.clone()).unwrap_or_default(),
    };
    let weights = req.weights.as_ref().map(normalize_keys).transpose()?;

    let weak_subjects = match &req.weak_subjects {
        Some(subjects) => subjects
            .iter()
            .map(|s| validate_subject(s).map_err(|msg| AppError::bad_request("INVALID_SUBJECT", msg)))
            .collect::<Result<Vec<_>, _>>()?,
        None => classify_weak(&grades, state.config().analytics.weak_grade_threshold.as_str()),
    };
    if weak_subjects.len() > MAX_SUBJECTS_PER_REQUEST {
        return Err(too_many_subjects());
    }

    let today = Utc::now().date_naive();
    let allocations = allocate(&weak_subjects, &grades, weights.as_ref(), req.exam_date, today);
    let total_weekly_hours = allocations.iter().map(|a| a.weekly_hours).sum();

    Ok(ok(AllocationResponse {
        window_days: study_window_days(req.exam_date, today),
        total_weekly_hours,
        based_on_report_id: latest.filter(|_| req.grades.is_none()).map(|r| r.id),
        allocations,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudyPlanRequest {
    #[serde(default)]
    subjects: Vec<String>,
    weekly_hours: Option<f64>,
    exam_date: Option<NaiveDate>,
    #[serde(default)]
    active_days: Vec<String>,
    #[serde(default)]
    focus_areas: BTreeMap<String, Vec<String>>,
}

/// Subjects default to everything the user has a performance record for.
async fn create_study_plan(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<StudyPlanRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    if req.subjects.len() > MAX_SUBJECTS_PER_REQUEST {
        return Err(too_many_subjects());
    }
    let mut subjects: Vec<String> = Vec::with_capacity(req.subjects.len());
    for raw in &req.subjects {
        let name = validate_subject(raw).map_err(|msg| AppError::bad_request("INVALID_SUBJECT", msg))?;
        if !subjects.contains(&name) {
            subjects.push(name);
        }
    }

    if let Some(hours) = req.weekly_hours {
        if !hours.is_finite() || hours <= 0.0 || hours > MAX_WEEKLY_HOURS {
            return Err(AppError::bad_request(
                "INVALID_WEEKLY_HOURS",
                &format!("weeklyHours must be greater than 0 and at most {MAX_WEEKLY_HOURS}"),
            ));
        }
    }
    let active_days = parse_active_days(&req.active_days)
        .map_err(|msg| AppError::bad_request("INVALID_ACTIVE_DAYS", &msg))?;
    let focus_topics = normalize_keys(&req.focus_areas)?;

    let plan = generate_study_plan(
        state.store(),
        state.generator(),
        NewStudyPlan {
            user_id,
            subjects,
            weekly_hours: req.weekly_hours,
            exam_date: req.exam_date,
            active_days,
            focus_topics,
        },
        &state.config().analytics,
        Utc::now(),
    )
    .await?;
    Ok(created(plan))
}

async fn list_study_plans(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    Ok(ok(state.store().list_study_plans(&user_id)?))
}

async fn get_study_plan(
    Path((user_id, plan_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    require_user_id(&user_id)?;
    Ok(ok(state.store().get_study_plan(&user_id, &plan_id)?))
}

async fn term(Path((year, term)): Path<(i32, u32)>) -> Result<impl IntoResponse, AppError> {
    validate_year(year).map_err(|msg| AppError::bad_request("INVALID_YEAR", msg))?;
    let dates: TermDates = term_dates(year, term)
        .ok_or_else(|| AppError::bad_request("INVALID_TERM", "term dates are not representable"))?;
    Ok(ok(dates))
}
