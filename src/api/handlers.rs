//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{error, info, warn};

use crate::{
    error::TimerError,
    state::{AppState, TimerSnapshot},
    tasks::CountdownDriver,
};
use super::responses::{ApiResponse, ControlsRequest, HealthResponse, StatusResponse};

type HandlerResult = Result<(StatusCode, Json<ApiResponse>), StatusCode>;

/// Turn the outcome of a state change into an HTTP response.
///
/// Refused requests answer 409 with the unchanged timer, lock failures 500.
fn respond(state: &AppState, message: &str, result: Result<TimerSnapshot, TimerError>) -> HandlerResult {
    match result {
        Ok(snapshot) => Ok((StatusCode::OK, Json(ApiResponse::ok(message.to_string(), snapshot)))),
        Err(e) if e.is_rejection() => {
            warn!("Request rejected: {}", e);
            match state.snapshot() {
                Ok(snapshot) => Ok((
                    StatusCode::CONFLICT,
                    Json(ApiResponse::rejected(e.to_string(), snapshot)),
                )),
                Err(e) => {
                    error!("Failed to read timer state: {}", e);
                    Err(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }
        Err(e) => {
            error!("Failed to update timer state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /timer - Return the current snapshot
pub async fn timer_handler(State(driver): State<Arc<CountdownDriver>>) -> Result<Json<TimerSnapshot>, StatusCode> {
    driver.state().snapshot().map(Json).map_err(|e| {
        error!("Failed to read timer state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle POST /timer/:field/:direction - Step minutes or seconds by one
pub async fn adjust_handler(
    State(driver): State<Arc<CountdownDriver>>,
    Path((field, direction)): Path<(String, String)>,
) -> HandlerResult {
    let increase = match direction.as_str() {
        "increase" => true,
        "decrease" => false,
        _ => return Err(StatusCode::NOT_FOUND),
    };

    let state = driver.state();
    let result = match field.as_str() {
        "minutes" => state.adjust_minutes(increase),
        "seconds" => state.adjust_seconds(increase),
        _ => return Err(StatusCode::NOT_FOUND),
    };

    respond(state, &format!("{} {}d", field, direction), result)
}

/// Handle POST /timer/controls - Toggle, or set when a `visible` value is sent
///
/// An empty body or a body without `visible` toggles. Anything else that is
/// not a valid request is refused with 422 and changes nothing.
pub async fn controls_handler(
    State(driver): State<Arc<CountdownDriver>>,
    body: Bytes,
) -> HandlerResult {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<ControlsRequest>(&body) {
            Ok(request) => request.visible,
            Err(e) => {
                warn!("Rejected controls request: {}", e);
                return Err(StatusCode::UNPROCESSABLE_ENTITY);
            }
        }
    };
    let state = driver.state();
    let result = state.toggle_or_set(value);

    let message = match &result {
        Ok(snapshot) if snapshot.controls_visible => "Controls shown",
        _ => "Controls hidden",
    };
    respond(state, message, result)
}

/// Handle POST /timer/start - Begin the countdown
pub async fn start_handler(State(driver): State<Arc<CountdownDriver>>) -> HandlerResult {
    let result = driver.start();
    if result.is_ok() {
        info!("Start endpoint called - countdown running");
    }
    respond(driver.state(), "Countdown started", result)
}

/// Handle POST /timer/cancel - Stop the countdown early
pub async fn cancel_handler(State(driver): State<Arc<CountdownDriver>>) -> HandlerResult {
    let result = driver.cancel();
    respond(driver.state(), "Countdown cancelled", result)
}

/// Handle GET /timer/events - Stream snapshots as server-sent events
pub async fn events_handler(
    State(driver): State<Arc<CountdownDriver>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = driver.state().subscribe();

    let events = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }

        let snapshot = *rx.borrow_and_update();
        let event = match Event::default().event("timer").json_data(snapshot) {
            Ok(event) => event,
            Err(e) => {
                warn!("Failed to encode timer event: {}", e);
                Event::default().comment("encoding failed")
            }
        };

        Some((Ok(event), (rx, false)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return timer and server status
pub async fn status_handler(State(driver): State<Arc<CountdownDriver>>) -> Result<Json<StatusResponse>, StatusCode> {
    let state = driver.state();
    let timer = match state.snapshot() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to read timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        remaining: timer.remaining(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
