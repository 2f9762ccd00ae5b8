use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::{json, Value};

use super::http::{request, response_json};

/// Posts a report and returns the `data` envelope.
pub async fn post_report(app: &Router, user_id: &str, report_date: &str, grades: Value) -> Value {
    let resp = request(
        app,
        Method::POST,
        &format!("/api/users/{user_id}/reports"),
        Some(json!({
            "term": 1,
            "year": 2024,
            "reportDate": report_date,
            "grades": grades,
        })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    body["data"].clone()
}

/// Creates one medium card and returns it.
pub async fn create_card(app: &Router, user_id: &str, subject: &str) -> Value {
    let resp = request(
        app,
        Method::POST,
        &format!("/api/users/{user_id}/flashcards"),
        Some(json!({
            "cards": [{
                "subject": subject,
                "topic": "Basics",
                "question": "What is 2 + 2?",
                "answer": "4",
            }]
        })),
        &[],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    body["data"][0].clone()
}
