use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, Utc};
use mindmend_common::ScheduleStore;
use mindmend_config::{load_config_from, AppConfig};
use mindmend_scheduling::{routes, InMemoryScheduleStore, SchedulingState};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

// Router over an empty in-memory store with the default configuration
fn create_app() -> Router {
    create_app_with(AppConfig::default())
}

fn create_app_with(config: AppConfig) -> Router {
    let config = Arc::new(config);
    let store: Arc<dyn ScheduleStore> = Arc::new(InMemoryScheduleStore::new());
    let state = SchedulingState::new(config, store).expect("default refund policy is valid");
    routes(Arc::new(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn open_monday(app: &Router) {
    let (status, body) = send(
        app,
        "PUT",
        "/admin/therapists/t-1/availability/Mon",
        Some(json!({"start_time": "09:00", "end_time": "17:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["day_of_week"], "Mon");
}

#[tokio::test]
async fn test_free_slots_without_window() {
    let app = create_app();
    let (status, body) = send(&app, "GET", "/therapists/t-1/free-slots?date=2025-05-05", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"].as_array().unwrap().len(), 0);
    assert_eq!(body["unavailable"].as_array().unwrap().len(), 0);
    assert_eq!(body["interval_minutes"], 30);
}

#[tokio::test]
async fn test_booking_flow() {
    let app = create_app();
    open_monday(&app).await;

    let (status, block) = send(
        &app,
        "POST",
        "/admin/therapists/t-1/unavailability",
        Some(json!({
            "start_time": "2025-05-05T10:00:00Z",
            "end_time": "2025-05-05T11:00:00Z",
            "reason": "Client session",
            "appointment_id": "apt-1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(block["id"].is_i64());

    let (status, body) = send(
        &app,
        "GET",
        "/therapists/t-1/free-slots?date=2025-05-05&session_duration=60",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_duration_minutes"], 60);

    let unavailable = body["unavailable"].as_array().unwrap();
    let reasons: Vec<(&str, &str)> = unavailable
        .iter()
        .map(|slot| {
            (
                slot["start_time"].as_str().unwrap(),
                slot["reason"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("09:30", "Insufficient time"),
            ("10:00", "Client session"),
            ("10:30", "Client session"),
            ("16:30", "Insufficient time"),
        ]
    );
    assert_eq!(body["available"].as_array().unwrap().len(), 12);

    let (status, body) = send(&app, "DELETE", "/admin/appointments/apt-1/unavailability", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released"], 1);

    let (_, body) = send(&app, "GET", "/therapists/t-1/free-slots?date=2025-05-05", None).await;
    assert_eq!(body["available"].as_array().unwrap().len(), 16);
    assert!(body["unavailable"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_free_slots_rejects_bad_input() {
    let app = create_app();

    let (status, body) = send(
        &app,
        "GET",
        "/therapists/t-1/free-slots?date=2025-05-05&session_duration=45",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);

    let (status, _) = send(&app, "GET", "/therapists/t-1/free-slots?date=05/05/2025", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        "/therapists/t-1/free-slots?date=2025-05-05&interval=0&session_duration=30",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fine_interval_keeps_default_session_length() {
    let app = create_app();
    open_monday(&app).await;

    let (status, body) = send(
        &app,
        "GET",
        "/therapists/t-1/free-slots?date=2025-05-05&interval=15",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interval_minutes"], 15);
    assert_eq!(body["session_duration_minutes"], 30);
    let available = body["available"].as_array().unwrap();
    assert_eq!(available.first().unwrap()["start_time"], "09:00");
    assert_eq!(available.last().unwrap()["start_time"], "16:30");
    assert_eq!(available.len(), 31);
}

#[tokio::test]
async fn test_refund_quote() {
    let app = create_app();
    let appointment = Utc::now() + Duration::days(10);

    let (status, body) = send(
        &app,
        "POST",
        "/refunds/quote",
        Some(json!({
            "appointment_date": appointment.format("%Y-%m-%d").to_string(),
            "appointment_time": "10:00",
            "amount_minor_units": 10000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["percentage"], 80);
    assert_eq!(body["amount_minor_units"], 8000);

    let (status, _) = send(
        &app,
        "POST",
        "/refunds/quote",
        Some(json!({
            "appointment_date": appointment.format("%Y-%m-%d").to_string(),
            "appointment_time": "10:00",
            "amount_minor_units": -5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refund_quote_for_past_session() {
    let app = create_app();
    let (status, body) = send(
        &app,
        "POST",
        "/refunds/quote",
        Some(json!({
            "appointment_date": "2020-01-01",
            "appointment_time": "10:00",
            "amount_minor_units": 10000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["percentage"], 0);
    assert_eq!(body["reason_text"], "Session has already started: no refund");
}

#[tokio::test]
async fn test_admin_validation() {
    let app = create_app();

    let (status, _) = send(
        &app,
        "PUT",
        "/admin/therapists/t-1/availability/Someday",
        Some(json!({"start_time": "09:00", "end_time": "17:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PUT",
        "/admin/therapists/t-1/availability/Tue",
        Some(json!({"start_time": "17:00", "end_time": "09:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/admin/therapists/t-1/unavailability",
        Some(json!({"start_time": "tomorrow", "end_time": "2025-05-05T11:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "DELETE", "/admin/appointments/unknown/unavailability", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released"], 0);
}

#[tokio::test]
async fn test_refund_quote_for_offered_slot_uses_slot_time() {
    let config_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config");
    let app = create_app_with(load_config_from(&config_dir, "test").unwrap());

    // a slot just over 48 hours away must still earn the top tier
    let target = Utc::now() + Duration::hours(50);
    let date = target.date_naive();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/admin/therapists/t-1/availability/{}", date.weekday()),
        Some(json!({"start_time": "00:00", "end_time": "23:59"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/therapists/t-1/free-slots?date={}", date),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let target_time = target.format("%H:%M").to_string();
    let slot_start = body["available"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|slot| slot["start_time"].as_str())
        .filter(|start| *start <= target_time.as_str())
        .last()
        .expect("a slot at or before the target time")
        .to_string();

    let (status, quote) = send(
        &app,
        "POST",
        "/refunds/quote",
        Some(json!({
            "appointment_date": date.to_string(),
            "appointment_time": slot_start,
            "amount_minor_units": 10000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["percentage"], 80);
    assert!(quote["hours_before_session"].as_i64().unwrap() >= 48);
}
