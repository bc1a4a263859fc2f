//! Warden event handler composition root.

#![forbid(unsafe_code)]

mod error;
mod handler_config;
mod handler_router;
mod handler_services;
mod handlers;
mod invoke;
mod middleware;
mod state;

use std::env;

use tracing::info;
use warden_application::EventDispatcher;
use warden_core::AppError;
use warden_infrastructure::LogRedactor;

use crate::handler_config::{HandlerConfig, init_tracing};
use crate::state::AppState;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Serve,
    Invoke(String),
}

fn parse_command(mut args: impl Iterator<Item = String>) -> Result<Command, AppError> {
    match args.next().as_deref() {
        None | Some("serve") => Ok(Command::Serve),
        Some("invoke") => args.next().map(Command::Invoke).ok_or_else(|| {
            AppError::Validation("usage: warden-handler invoke <event-file|->".to_owned())
        }),
        Some(other) => Err(AppError::Validation(format!(
            "unknown command '{other}', expected 'serve' or 'invoke'"
        ))),
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let command = parse_command(env::args().skip(1))?;
    let config = HandlerConfig::load()?;
    init_tracing(LogRedactor::new(&config.log_redaction_patterns)?);

    let dispatcher = handler_services::build_dispatcher(&config)?;
    match command {
        Command::Serve => serve(&config, dispatcher).await,
        Command::Invoke(source) => invoke::run(&dispatcher, &source).await,
    }
}

async fn serve(config: &HandlerConfig, dispatcher: EventDispatcher) -> Result<(), AppError> {
    let app_state = AppState::new(dispatcher, config.required_shared_secret()?);
    let app = handler_router::build_router(app_state);
    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "warden-handler listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("handler server error: {error}")))
}
