use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use warden_application::{EventDispatcher, EventOutcome};
use warden_core::AppResult;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: EventDispatcher,
    pub shared_secret: Arc<str>,
    dispatch_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(dispatcher: EventDispatcher, shared_secret: impl Into<Arc<str>>) -> Self {
        Self {
            dispatcher,
            shared_secret: shared_secret.into(),
            dispatch_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Dispatches one event at a time; the vault session is process-wide.
    pub async fn dispatch(&self, event: &Value) -> AppResult<EventOutcome> {
        let _guard = self.dispatch_lock.lock().await;
        self.dispatcher.dispatch(event).await
    }
}
