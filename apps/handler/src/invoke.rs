use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::info;
use warden_application::EventDispatcher;
use warden_core::AppError;

/// Reads one JSON event from a file, or from stdin when `source` is `-`.
pub async fn read_event(source: &str) -> Result<Value, AppError> {
    let raw = if source == "-" {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .map_err(|error| {
                AppError::Validation(format!("failed to read event from stdin: {error}"))
            })?;
        raw
    } else {
        tokio::fs::read_to_string(source).await.map_err(|error| {
            AppError::Validation(format!("failed to read event file '{source}': {error}"))
        })?
    };

    serde_json::from_str(&raw)
        .map_err(|error| AppError::Validation(format!("event is not valid JSON: {error}")))
}

pub async fn run(dispatcher: &EventDispatcher, source: &str) -> Result<(), AppError> {
    let event = read_event(source).await?;
    let outcome = dispatcher.dispatch(&event).await?;
    let rendered = serde_json::to_string_pretty(&outcome)
        .map_err(|error| AppError::Internal(format!("failed to render outcome: {error}")))?;

    info!("event invocation finished");
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use warden_core::AppError;

    use super::read_event;

    #[tokio::test]
    async fn event_is_read_from_a_file() {
        let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = directory.path().join("event.json");
        std::fs::write(&path, r#"{"event_name": "export_vault"}"#)
            .unwrap_or_else(|_| unreachable!());

        let event = read_event(&path.to_string_lossy()).await;

        assert_eq!(
            event.unwrap_or_else(|_| unreachable!()),
            json!({ "event_name": "export_vault" })
        );
    }

    #[tokio::test]
    async fn unreadable_or_malformed_events_are_rejected() {
        let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = directory.path().join("event.json");
        std::fs::write(&path, "{not json").unwrap_or_else(|_| unreachable!());

        let malformed = read_event(&path.to_string_lossy()).await;
        let missing = read_event(&directory.path().join("absent.json").to_string_lossy()).await;

        assert!(matches!(malformed, Err(AppError::Validation(_))));
        assert!(matches!(missing, Err(AppError::Validation(_))));
    }
}
