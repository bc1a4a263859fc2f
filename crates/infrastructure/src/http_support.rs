use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use warden_core::{AppError, AppResult};

/// Turns a non-success response into an error carrying its status and body.
pub(crate) async fn ensure_success(response: Response, context: &str) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<response body unavailable>".to_owned());

    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::Unauthorized(format!(
            "{context} was rejected with status {status}: {body}"
        )));
    }

    Err(AppError::Upstream(format!(
        "{context} failed with status {status}: {body}"
    )))
}

/// Reads a successful JSON response.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> AppResult<T> {
    ensure_success(response, context)
        .await?
        .json::<T>()
        .await
        .map_err(|error| AppError::Upstream(format!("failed to decode {context} response: {error}")))
}
