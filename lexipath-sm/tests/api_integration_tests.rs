//! Integration tests for lexipath-sm API endpoints
//!
//! Drives the full router against an in-memory database with the scorer
//! pointed at a closed port, covering the end-to-end screening scenario
//! and the HTTP status mapping of client errors.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use lexipath_sm::db;
use lexipath_sm::models::Student;
use lexipath_sm::services::{MediaStore, ScorerClient};

/// Test helper: app with in-memory database and one seeded student
async fn create_test_app() -> (axum::Router, sqlx::SqlitePool, Uuid, tempfile::TempDir) {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    db::init_tables(&pool).await.expect("Failed to init tables");

    let student = Student::new("Asha".to_string(), 9, Some("4".to_string()));
    db::students::insert_student(&pool, &student).await.unwrap();

    let scorer = Arc::new(
        ScorerClient::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap(),
    );

    let media_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let media = MediaStore::new(media_dir.path().to_path_buf()).unwrap();

    let state = lexipath_sm::AppState::new(
        pool.clone(),
        scorer,
        media,
        "http://localhost:5810".to_string(),
    );
    let app = lexipath_sm::build_router(state);

    (app, pool, student.id, media_dir)
}

async fn post_json(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool, _student_id, _media_dir) = create_test_app().await;

    let (status, json) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "lexipath-sm");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_end_to_end_screening_flow() {
    let (app, _pool, student_id, _media_dir) = create_test_app().await;

    // Start: game 1 with the reading passage
    let (status, session) = post_json(
        &app,
        "/api/assessments/start",
        json!({"student_id": student_id, "language": "en"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["current_game"], 1);
    assert_eq!(session["total_games"], 5);
    assert_eq!(session["status"], "in_progress");
    assert!(session["game"]["content"]["passage"]
        .as_str()
        .unwrap()
        .contains("quick brown fox"));

    let assessment_id = session["assessment_id"].as_str().unwrap().to_string();

    // Game 1: eye tracking, scored via the degraded path
    let (status, submit) = post_json(
        &app,
        &format!("/api/assessments/{}/games/1", assessment_id),
        json!({
            "eye_tracking_data": {"raw_points": [{"x": 1.0, "y": 1.0, "timestamp": 1.0}]},
            "screen_dimensions": {"width": 1920.0, "height": 1080.0}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submit["is_last_game"], false);
    assert_eq!(submit["next_game"]["game_number"], 2);

    // Games 2-4: minimal valid payloads
    let (_, submit) = post_json(
        &app,
        &format!("/api/assessments/{}/games/2", assessment_id),
        json!({"speech_audio_url": "/media/audio/rec.webm"}),
    )
    .await;
    assert_eq!(submit["next_game"]["game_number"], 3);

    for game_number in 3..=4 {
        let (status, submit) = post_json(
            &app,
            &format!("/api/assessments/{}/games/{}", assessment_id, game_number),
            json!({"response_data": {"answers": []}}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(submit["next_game"]["game_number"], game_number + 1);
    }

    // Game 5 is the last: no next game
    let (status, submit) = post_json(
        &app,
        &format!("/api/assessments/{}/games/5", assessment_id),
        json!({"response_data": {"reaction_ms": [312, 280]}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submit["is_last_game"], true);
    assert!(submit["next_game"].is_null());

    // Complete
    let (status, completion) = post_json(
        &app,
        &format!("/api/assessments/{}/complete", assessment_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completion["status"], "completed");
    assert_eq!(completion["games_completed"], 5);
    assert!(completion["duration_seconds"].as_i64().unwrap() >= 0);

    // Detail view carries the overall prediction with a 0..=1 risk score
    let (status, detail) = get_json(&app, &format!("/api/assessments/{}", assessment_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "completed");
    assert_eq!(detail["student"]["name"], "Asha");
    assert_eq!(detail["games"].as_array().unwrap().len(), 5);

    let overall = detail["predictions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["prediction_type"] == "screening_overall")
        .expect("screening_overall prediction missing");
    let risk_score = overall["risk_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&risk_score));

    // History view lists the single completed attempt
    let (status, history) =
        get_json(&app, &format!("/api/students/{}/assessments", student_id)).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap().clone();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["games"].as_array().unwrap().len(), 5);

    // Start after completion is a no-op report
    let (status, session) = post_json(
        &app,
        "/api/assessments/start",
        json!({"student_id": student_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["status"], "completed");
    assert_eq!(session["current_game"], 5);
    assert!(session["game"].is_null());
}

#[tokio::test]
async fn test_start_unknown_student_is_404() {
    let (app, _pool, _student_id, _media_dir) = create_test_app().await;

    let (status, json) = post_json(
        &app,
        "/api/assessments/start",
        json!({"student_id": Uuid::new_v4()}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_game_number_is_400() {
    let (app, _pool, student_id, _media_dir) = create_test_app().await;

    let (_, session) = post_json(
        &app,
        "/api/assessments/start",
        json!({"student_id": student_id}),
    )
    .await;
    let assessment_id = session["assessment_id"].as_str().unwrap().to_string();

    for game_number in [0, 6] {
        let (status, json) = post_json(
            &app,
            &format!("/api/assessments/{}/games/{}", assessment_id, game_number),
            json!({}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_submit_to_unknown_assessment_is_404() {
    let (app, _pool, _student_id, _media_dir) = create_test_app().await;

    let (status, json) = post_json(
        &app,
        &format!("/api/assessments/{}/games/1", Uuid::new_v4()),
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_submit_after_completion_is_400() {
    let (app, _pool, student_id, _media_dir) = create_test_app().await;

    let (_, session) = post_json(
        &app,
        "/api/assessments/start",
        json!({"student_id": student_id}),
    )
    .await;
    let assessment_id = session["assessment_id"].as_str().unwrap().to_string();

    post_json(
        &app,
        &format!("/api/assessments/{}/games/1", assessment_id),
        json!({"response_data": {}}),
    )
    .await;
    post_json(
        &app,
        &format!("/api/assessments/{}/complete", assessment_id),
        json!({}),
    )
    .await;

    let (status, json) = post_json(
        &app,
        &format!("/api/assessments/{}/games/2", assessment_id),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["message"], "Assessment is not in progress");
}

#[tokio::test]
async fn test_complete_with_no_games_is_400() {
    let (app, _pool, student_id, _media_dir) = create_test_app().await;

    let (_, session) = post_json(
        &app,
        "/api/assessments/start",
        json!({"student_id": student_id}),
    )
    .await;
    let assessment_id = session["assessment_id"].as_str().unwrap().to_string();

    let (status, json) = post_json(
        &app,
        &format!("/api/assessments/{}/complete", assessment_id),
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["message"], "No games completed");
}

#[tokio::test]
async fn test_audio_upload_round_trip() {
    let (app, _pool, _student_id, _media_dir) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/media/audio")
                .header("content-type", "audio/webm;codecs=opus")
                .body(Body::from(&b"fake-webm-bytes"[..]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    let url = json["url"].as_str().unwrap();
    assert!(url.starts_with("/media/audio/"));
    assert!(url.ends_with(".webm"));

    // The stored blob is served back under /media
    let response = app
        .clone()
        .oneshot(Request::builder().uri(url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&served[..], b"fake-webm-bytes");
}

#[tokio::test]
async fn test_empty_audio_upload_returns_null_url() {
    let (app, _pool, _student_id, _media_dir) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/media/audio")
                .header("content-type", "audio/webm")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["url"].is_null());
}
