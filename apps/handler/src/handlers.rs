use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use warden_application::EventOutcome;

use crate::error::ApiResult;
use crate::state::AppState;

pub const USERS_PATH: &str = "/bitwarden-manager/users";

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn event_handler(
    State(state): State<AppState>,
    Json(event): Json<Value>,
) -> ApiResult<Response> {
    let outcome = state.dispatch(&event).await?;
    Ok(outcome_response(outcome))
}

pub async fn users_handler(
    State(state): State<AppState>,
    Query(parameters): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let outcome = state.dispatch(&users_event(parameters)).await?;
    Ok(outcome_response(outcome))
}

/// Wraps query parameters the way path-routed events carry them.
pub fn users_event(parameters: HashMap<String, String>) -> Value {
    json!({
        "path": USERS_PATH,
        "queryStringParameters": parameters,
    })
}

pub fn outcome_response(outcome: EventOutcome) -> Response {
    match outcome {
        EventOutcome::Response { status, body } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(body),
        )
            .into_response(),
        outcome => (StatusCode::OK, Json(json!(outcome))).into_response(),
    }
}
