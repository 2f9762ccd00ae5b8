mod common;

use serde_json::json;

use common::app::spawn_test_server;
use common::fixtures::{create_card, post_report};
use common::http::{assert_status_ok_json, get_json};

async fn seed(app: &axum::Router, user: &str) {
    post_report(app, user, "2024-01-15T00:00:00Z", json!({ "Mathematics": "C", "English": "A" })).await;
    post_report(app, user, "2024-05-15T00:00:00Z", json!({ "Mathematics": "B", "English": "B+" })).await;
    post_report(app, user, "2024-09-15T00:00:00Z", json!({ "Mathematics": "A-", "English": "B-" })).await;
}

#[tokio::test]
async fn it_dashboard_summarizes_subjects_and_cards() {
    let app = spawn_test_server().await;
    seed(&app.app, "d1").await;
    create_card(&app.app, "d1", "Mathematics").await;

    let (status, body) = get_json(&app.app, "/api/users/d1/performance/dashboard").await;
    assert_status_ok_json(status, &body);
    let data = &body["data"];
    assert_eq!(data["improvingSubjects"], json!(["Mathematics"]));
    assert_eq!(data["decliningSubjects"], json!(["English"]));
    assert_eq!(data["strongSubjects"][0]["subject"], "Mathematics");
    assert_eq!(data["recentReports"].as_array().unwrap().len(), 3);
    assert_eq!(data["recentReports"][0]["grades"]["Mathematics"], "A-");
    assert_eq!(data["flashcards"]["total"], 1);
    assert_eq!(data["flashcards"]["due"], 1);
}

#[tokio::test]
async fn it_trends_filter_by_subject_alias() {
    let app = spawn_test_server().await;
    seed(&app.app, "d2").await;

    let (status, body) = get_json(&app.app, "/api/users/d2/performance/trends?subject=maths").await;
    assert_status_ok_json(status, &body);
    let series = body["data"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["grades"], json!([6.0, 9.0, 11.0]));
    assert_eq!(series[0]["trend"], "improving");

    let (_, all) = get_json(&app.app, "/api/users/d2/performance/trends").await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn it_predictions_for_each_subject() {
    let app = spawn_test_server().await;
    seed(&app.app, "d3").await;

    let (status, body) = get_json(&app.app, "/api/users/d3/performance/predictions").await;
    assert_status_ok_json(status, &body);
    let preds = body["data"].as_array().unwrap();
    assert_eq!(preds.len(), 2);
    let english = preds.iter().find(|p| p["subject"] == "English").unwrap();
    assert_eq!(english["currentGrade"], "B-");
    assert_eq!(english["confidence"], 0.7);
}

#[tokio::test]
async fn it_dashboard_for_unknown_user_is_empty() {
    let app = spawn_test_server().await;
    let (status, body) = get_json(&app.app, "/api/users/ghost/performance/dashboard").await;
    assert_status_ok_json(status, &body);
    assert!(body["data"]["overallGpa"].is_null());
    assert_eq!(body["data"]["flashcards"]["total"], 0);
}
