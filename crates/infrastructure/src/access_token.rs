//! Cached bearer tokens for the HTTP adapters.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use warden_core::AppResult;

/// Token issued by a login endpoint.
#[derive(Debug, Clone)]
pub(crate) struct IssuedToken {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl IssuedToken {
    fn is_usable(&self, now: DateTime<Utc>, grace_period: Duration) -> bool {
        self.expires_at
            .is_none_or(|expires_at| now + grace_period < expires_at)
    }
}

/// Holds one client's current token until it expires or is rejected.
#[derive(Debug)]
pub(crate) struct TokenCache {
    cached: RwLock<Option<IssuedToken>>,
    grace_period: Duration,
}

impl TokenCache {
    pub fn new() -> Self {
        Self {
            cached: RwLock::new(None),
            grace_period: Duration::seconds(60),
        }
    }

    /// Returns the cached token, or fetches one with `login`.
    pub async fn get_or_login<F, Fut>(&self, login: F) -> AppResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<IssuedToken>>,
    {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref()
                && token.is_usable(Utc::now(), self.grace_period)
            {
                return Ok(token.value.clone());
            }
        }

        let token = login().await?;
        let value = token.value.clone();
        *self.cached.write().await = Some(token);
        Ok(value)
    }

    /// Forgets the cached token so the next request logs in again.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}
