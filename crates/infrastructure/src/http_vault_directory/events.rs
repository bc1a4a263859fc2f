use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use tokio::time::Instant;
use tracing::info;
use warden_core::{AppError, AppResult};

use super::HttpVaultDirectory;
use super::payloads::EventPage;
use crate::http_support::read_json;

const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

impl HttpVaultDirectory {
    /// Walks every event page in the window, waiting out rate limits within the budget.
    pub(super) async fn collect_active_user_ids(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<BTreeSet<String>> {
        let url = self.url("/events");
        let start = start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let end = end.to_rfc3339_opts(SecondsFormat::Secs, true);
        let started_at = Instant::now();
        let mut continuation_token: Option<String> = None;
        let mut active_user_ids = BTreeSet::new();
        let mut pages = 0_u32;

        loop {
            let response = self
                .send("list events", |client| {
                    let mut query = vec![("start", start.as_str()), ("end", end.as_str())];
                    if let Some(token) = continuation_token.as_deref() {
                        query.push(("continuationToken", token));
                    }
                    client.get(url.as_str()).query(&query)
                })
                .await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let wait = retry_after(&response);
                if started_at.elapsed() + wait > self.config.events_retry_budget {
                    return Err(AppError::RateLimited(format!(
                        "event listing still throttled after {} seconds",
                        started_at.elapsed().as_secs()
                    )));
                }
                info!(wait_seconds = wait.as_secs(), "event listing throttled, waiting");
                tokio::time::sleep(wait).await;
                continue;
            }

            let page: EventPage = read_json(response, "list events").await?;
            pages += 1;
            active_user_ids.extend(
                page.data
                    .into_iter()
                    .filter_map(|event| event.acting_user_id),
            );

            match page.continuation_token.filter(|token| !token.is_empty()) {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        info!(pages, active_users = active_user_ids.len(), "event listing complete");
        Ok(active_user_ids)
    }
}

fn retry_after(response: &reqwest::Response) -> Duration {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map_or(DEFAULT_RETRY_AFTER, Duration::from_secs)
}
