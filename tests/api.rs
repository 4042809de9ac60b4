//! Router tests using a manual scheduler behind the HTTP surface.

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body, BodyDataStream},
    http::{header, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::Value;
use tower::ServiceExt;

use tea_timer::{
    create_router,
    state::AppState,
    tasks::{CountdownDriver, ManualScheduler},
};

fn app() -> (Router, ManualScheduler) {
    let state = Arc::new(AppState::new(20554, "127.0.0.1".to_string()));
    let scheduler = ManualScheduler::new();
    let driver = CountdownDriver::new(state, Arc::new(scheduler.clone()));
    (create_router(driver), scheduler)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn get_timer_starts_at_zero() {
    let (app, _) = app();
    let (status, body) = send(&app, "GET", "/timer", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["minutes"], 0);
    assert_eq!(body["seconds"], 0);
    assert_eq!(body["controls_visible"], true);
    assert_eq!(body["phase"], "idle");
    assert_eq!(body["start_enabled"], false);
}

#[tokio::test]
async fn adjust_endpoints_step_fields() {
    let (app, _) = app();
    send(&app, "POST", "/timer/minutes/increase", None).await;
    send(&app, "POST", "/timer/minutes/increase", None).await;
    send(&app, "POST", "/timer/minutes/decrease", None).await;
    let (status, body) = send(&app, "POST", "/timer/seconds/increase", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["timer"]["minutes"], 1);
    assert_eq!(body["timer"]["seconds"], 1);
}

#[tokio::test]
async fn unknown_adjustment_is_not_found() {
    let (app, _) = app();
    let (status, _) = send(&app, "POST", "/timer/hours/increase", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/timer/minutes/sideways", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn controls_toggle_without_body_and_set_with_body() {
    let (app, _) = app();

    let (_, body) = send(&app, "POST", "/timer/controls", None).await;
    assert_eq!(body["timer"]["controls_visible"], false);

    let (_, body) = send(&app, "POST", "/timer/controls", Some(r#"{"visible": false}"#)).await;
    assert_eq!(body["timer"]["controls_visible"], false);

    let (_, body) = send(&app, "POST", "/timer/controls", Some(r#"{"visible": true}"#)).await;
    assert_eq!(body["timer"]["controls_visible"], true);
}

#[tokio::test]
async fn malformed_controls_body_is_refused() {
    let (app, _) = app();

    let (status, _) = send(&app, "POST", "/timer/controls", Some(r#"{"visible":"false"}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "POST", "/timer/controls", Some(r#"{"visible": tru"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = send(&app, "GET", "/timer", None).await;
    assert_eq!(body["controls_visible"], true);
    let (_, body) = send(&app, "GET", "/status", None).await;
    assert_eq!(body["last_action"], Value::Null);
}

#[tokio::test]
async fn controls_body_without_field_toggles() {
    let (app, _) = app();
    let (status, body) = send(&app, "POST", "/timer/controls", Some("{}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["controls_visible"], false);
}

/// Read from an event stream until one complete `timer` event arrived and return its data
async fn next_timer_event(stream: &mut BodyDataStream, buffer: &mut String) -> Value {
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let frame: String = buffer.drain(..end + 2).collect();
            if !frame.lines().any(|line| line == "event: timer") {
                continue;
            }
            let data = frame
                .lines()
                .find_map(|line| line.strip_prefix("data: "))
                .expect("timer event without data");
            return serde_json::from_str(data).unwrap();
        }

        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("no event within timeout")
            .expect("event stream ended")
            .unwrap();
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

#[tokio::test]
async fn events_stream_current_and_updated_snapshots() {
    let (app, _) = app();
    let request = Request::builder().uri("/timer/events").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

    let mut stream = response.into_body().into_data_stream();
    let mut buffer = String::new();

    let first = next_timer_event(&mut stream, &mut buffer).await;
    assert_eq!(first["seconds"], 0);
    assert_eq!(first["controls_visible"], true);

    send(&app, "POST", "/timer/seconds/increase", None).await;

    let second = next_timer_event(&mut stream, &mut buffer).await;
    assert_eq!(second["seconds"], 1);
    assert_eq!(second["start_enabled"], true);
}

#[tokio::test]
async fn start_at_zero_conflicts() {
    let (app, scheduler) = app();
    let (status, body) = send(&app, "POST", "/timer/start", None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["timer"]["controls_visible"], true);
    assert_eq!(scheduler.pending(), 0);
}

#[tokio::test]
async fn start_runs_countdown() {
    let (app, scheduler) = app();
    send(&app, "POST", "/timer/seconds/increase", None).await;
    send(&app, "POST", "/timer/seconds/increase", None).await;

    let (status, body) = send(&app, "POST", "/timer/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["controls_visible"], false);
    assert_eq!(body["timer"]["phase"], "running");

    let (status, _) = send(&app, "POST", "/timer/seconds/increase", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    scheduler.run_until_idle();

    let (_, body) = send(&app, "GET", "/timer", None).await;
    assert_eq!(body["seconds"], 0);
    assert_eq!(body["controls_visible"], true);
    assert_eq!(body["phase"], "idle");
}

#[tokio::test]
async fn cancel_when_idle_conflicts() {
    let (app, _) = app();
    let (status, body) = send(&app, "POST", "/timer/cancel", None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "rejected");
}

#[tokio::test]
async fn status_reports_last_action() {
    let (app, _) = app();
    send(&app, "POST", "/timer/minutes/increase", None).await;

    let (status, body) = send(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remaining"], "01:00");
    assert_eq!(body["last_action"], "minutes-increase");
    assert_eq!(body["port"], 20554);
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _) = app();
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
