//! Stateless calculators over the grade, trend, flashcard and planning rules.

use std::collections::{BTreeMap, HashMap};

use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::career::{career_match_score, related_subjects};
use crate::analytics::gpa::{calculate_gpa, calculate_weighted_gpa};
use crate::analytics::trend::slope;
use crate::analytics::{
    analyze_trend, grade_to_gpa, grade_to_ordinal, ordinal_to_grade, predict_next,
    strength_score, LetterGrade, Trend,
};
use crate::constants::MAX_SUBJECTS_PER_REQUEST;
use crate::extractors::JsonBody;
use crate::flashcards::scheduler::interval_days;
use crate::flashcards::{adjust_difficulty, mastery, next_review_date, Difficulty};
use crate::planning::{hours_needed, prioritize, study_window_days};
use crate::response::{ok, AppError};
use crate::state::AppState;

const MAX_HISTORY_LEN: usize = 200;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/grades/convert", post(convert_grade))
        .route("/trend", post(trend))
        .route("/strength", post(strength))
        .route("/gpa", post(gpa))
        .route("/career-match", post(career_match))
        .route("/schedule", post(schedule))
        .route("/mastery", post(mastery_score))
        .route("/difficulty", post(difficulty))
        .route("/prioritize", post(prioritize_subjects))
        .route("/hours", post(hours))
}

fn check_subject_count(count: usize) -> Result<(), AppError> {
    if count > MAX_SUBJECTS_PER_REQUEST {
        return Err(AppError::bad_request(
            "TOO_MANY_SUBJECTS",
            &format!("at most {MAX_SUBJECTS_PER_REQUEST} subjects are accepted"),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ConvertRequest {
    grade: Option<String>,
    ordinal: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConvertResponse {
    grade: String,
    recognized: bool,
    ordinal: f64,
    gpa: f64,
}

async fn convert_grade(JsonBody(req): JsonBody<ConvertRequest>) -> Result<impl IntoResponse, AppError> {
    let response = match (req.grade, req.ordinal) {
        (Some(grade), _) => {
            let parsed = LetterGrade::parse(&grade);
            ConvertResponse {
                grade: parsed.map(|g| g.as_str().to_string()).unwrap_or_else(|| grade.clone()),
                recognized: parsed.is_some(),
                ordinal: grade_to_ordinal(&grade),
                gpa: grade_to_gpa(&grade),
            }
        }
        (None, Some(ordinal)) => {
            let grade = ordinal_to_grade(ordinal);
            ConvertResponse {
                ordinal: grade_to_ordinal(&grade),
                gpa: grade_to_gpa(&grade),
                recognized: true,
                grade,
            }
        }
        (None, None) => {
            return Err(AppError::bad_request(
                "INVALID_REQUEST_BODY",
                "either grade or ordinal is required",
            ))
        }
    };
    Ok(ok(response))
}

#[derive(Debug, Deserialize)]
struct TrendRequest {
    history: Vec<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrendResponse {
    trend: Trend,
    slope: f64,
    predicted_next: f64,
    predicted_grade: String,
}

async fn trend(JsonBody(req): JsonBody<TrendRequest>) -> Result<impl IntoResponse, AppError> {
    if req.history.len() > MAX_HISTORY_LEN {
        return Err(AppError::bad_request(
            "HISTORY_TOO_LONG",
            &format!("history accepts at most {MAX_HISTORY_LEN} values"),
        ));
    }
    if req.history.iter().any(|v| !v.is_finite()) {
        return Err(AppError::bad_request("INVALID_HISTORY", "history values must be finite"));
    }
    let predicted_next = predict_next(&req.history);
    Ok(ok(TrendResponse {
        trend: analyze_trend(&req.history),
        slope: if req.history.len() < 2 { 0.0 } else { slope(&req.history) },
        predicted_grade: ordinal_to_grade(predicted_next),
        predicted_next,
    }))
}

#[derive(Debug, Deserialize)]
struct StrengthRequest {
    grade: String,
    trend: Option<String>,
}

async fn strength(JsonBody(req): JsonBody<StrengthRequest>) -> Result<impl IntoResponse, AppError> {
    let trend = req.trend.as_deref().map(Trend::parse_lenient).unwrap_or_default();
    Ok(ok(serde_json::json!({
        "grade": req.grade,
        "trend": trend,
        "strengthScore": strength_score(&req.grade, trend),
    })))
}

#[derive(Debug, Deserialize)]
struct GpaRequest {
    grades: BTreeMap<String, String>,
    weights: Option<BTreeMap<String, f64>>,
}

async fn gpa(JsonBody(req): JsonBody<GpaRequest>) -> Result<impl IntoResponse, AppError> {
    check_subject_count(req.grades.len())?;
    Ok(ok(serde_json::json!({
        "gpa": calculate_gpa(&req.grades),
        "weightedGpa": calculate_weighted_gpa(&req.grades, req.weights.as_ref()),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CareerMatchRequest {
    subjects: Vec<String>,
    grades: BTreeMap<String, String>,
    career: String,
    required_subjects: Option<Vec<String>>,
}

async fn career_match(
    JsonBody(req): JsonBody<CareerMatchRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_subject_count(req.subjects.len().max(req.grades.len()))?;
    let score = career_match_score(
        &req.subjects,
        &req.grades,
        &req.career,
        req.required_subjects.as_deref(),
    );
    Ok(ok(serde_json::json!({
        "career": req.career,
        "score": score,
        "relatedSubjects": related_subjects(&req.career),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRequest {
    difficulty: Option<String>,
    correct: bool,
    prior_review_count: u32,
    reviewed_at: Option<DateTime<Utc>>,
}

async fn schedule(JsonBody(req): JsonBody<ScheduleRequest>) -> Result<impl IntoResponse, AppError> {
    let difficulty = req
        .difficulty
        .as_deref()
        .map(Difficulty::parse_lenient)
        .unwrap_or_default();
    let reviewed_at = req.reviewed_at.unwrap_or_else(Utc::now);
    Ok(ok(serde_json::json!({
        "difficulty": difficulty,
        "intervalDays": interval_days(difficulty, req.correct, req.prior_review_count),
        "nextReviewDate": next_review_date(reviewed_at, difficulty, req.correct, req.prior_review_count),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountersRequest {
    difficulty: Option<String>,
    times_reviewed: u32,
    times_correct: u32,
}

impl CountersRequest {
    fn difficulty(&self) -> Difficulty {
        self.difficulty
            .as_deref()
            .map(Difficulty::parse_lenient)
            .unwrap_or_default()
    }
}

async fn mastery_score(JsonBody(req): JsonBody<CountersRequest>) -> Result<impl IntoResponse, AppError> {
    let difficulty = req.difficulty();
    Ok(ok(serde_json::json!({
        "difficulty": difficulty,
        "mastery": mastery(req.times_reviewed, req.times_correct, difficulty),
    })))
}

async fn difficulty(JsonBody(req): JsonBody<CountersRequest>) -> Result<impl IntoResponse, AppError> {
    let current = req.difficulty();
    let adjusted = adjust_difficulty(current, req.times_reviewed, req.times_correct);
    Ok(ok(serde_json::json!({
        "previousDifficulty": current,
        "difficulty": adjusted,
        "changed": current != adjusted,
    })))
}

#[derive(Debug, Deserialize)]
struct PrioritizeRequest {
    subjects: Vec<String>,
    #[serde(default)]
    grades: BTreeMap<String, String>,
    weights: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Serialize)]
struct PriorityEntry {
    subject: String,
    score: i64,
}

async fn prioritize_subjects(
    JsonBody(req): JsonBody<PrioritizeRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_subject_count(req.subjects.len())?;
    let ranked: Vec<PriorityEntry> = prioritize(&req.subjects, &req.grades, req.weights.as_ref())
        .into_iter()
        .map(|(subject, score)| PriorityEntry { subject, score })
        .collect();
    Ok(ok(ranked))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoursRequest {
    subjects: Vec<String>,
    exam_date: Option<NaiveDate>,
}

async fn hours(JsonBody(req): JsonBody<HoursRequest>) -> Result<impl IntoResponse, AppError> {
    check_subject_count(req.subjects.len())?;
    let today = Utc::now().date_naive();
    let weekly: HashMap<String, f64> = hours_needed(&req.subjects, req.exam_date, today);
    let weekly: BTreeMap<String, f64> = weekly.into_iter().collect();
    Ok(ok(serde_json::json!({
        "windowDays": study_window_days(req.exam_date, today),
        "weeklyHours": weekly,
    })))
}
