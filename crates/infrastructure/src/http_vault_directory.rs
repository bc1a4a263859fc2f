//! Vault organisation public API client.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{info, warn};
use warden_application::{MemberInvite, NewGroup, VaultDirectory};
use warden_core::{AppError, AppResult};
use warden_domain::{Collection, Group, Member};

use crate::access_token::{IssuedToken, TokenCache};
use crate::http_support::{ensure_success, read_json};

mod events;
mod payloads;

use payloads::{
    CollectionUpdateBody, CreatedResponse, GroupCreateBody, GroupIdsBody, ListResponse,
    MemberInviteBody, MemberUpdateBody, TokenResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ALREADY_INVITED_MESSAGE: &str = "This user has already been invited.";

/// Connection settings for the vault public API.
#[derive(Debug, Clone)]
pub struct VaultApiConfig {
    /// Public API base URL, without trailing slash.
    pub api_url: String,
    /// OAuth token endpoint.
    pub identity_url: String,
    /// Organisation API client id.
    pub client_id: String,
    /// Organisation API client secret.
    pub client_secret: String,
    /// Longest total wait for rate-limited event pages.
    pub events_retry_budget: Duration,
}

/// HTTP implementation of the vault directory port.
pub struct HttpVaultDirectory {
    http_client: reqwest::Client,
    config: VaultApiConfig,
    tokens: TokenCache,
}

impl HttpVaultDirectory {
    /// Creates a client with its own token cache.
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: VaultApiConfig) -> Self {
        Self {
            http_client,
            config,
            tokens: TokenCache::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    async fn login(&self) -> AppResult<IssuedToken> {
        let response = self
            .http_client
            .post(self.config.identity_url.as_str())
            .timeout(REQUEST_TIMEOUT)
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", "api.organization"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("vault token request failed: {error}")))?;

        let token: TokenResponse = read_json(response, "vault token request")
            .await
            .map_err(|error| match error {
                AppError::Upstream(message) => AppError::Unauthorized(message),
                other => other,
            })?;

        Ok(IssuedToken {
            value: token.access_token,
            expires_at: token
                .expires_in
                .map(|seconds| Utc::now() + chrono::Duration::seconds(seconds)),
        })
    }

    /// Sends a request with the bearer token, logging in again once on 401.
    async fn send<F>(&self, context: &str, build: F) -> AppResult<Response>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let token = self.tokens.get_or_login(|| self.login()).await?;
        let response = self.send_with_token(context, &build, token.as_str()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        info!(context, "vault token rejected, logging in again");
        self.tokens.invalidate().await;
        let token = self.tokens.get_or_login(|| self.login()).await?;
        self.send_with_token(context, &build, token.as_str()).await
    }

    async fn send_with_token<F>(&self, context: &str, build: &F, token: &str) -> AppResult<Response>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        build(&self.http_client)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("{context} request failed: {error}")))
    }

    async fn find_member_id_by_email(&self, email: &str) -> AppResult<String> {
        self.list_members()
            .await?
            .into_iter()
            .find(|member| member.email.eq_ignore_ascii_case(email))
            .map(|member| member.id)
            .ok_or_else(|| AppError::NotFound(format!("no member with email {email}")))
    }
}

#[async_trait]
impl VaultDirectory for HttpVaultDirectory {
    async fn list_members(&self) -> AppResult<Vec<Member>> {
        let url = self.url("/members");
        let response = self
            .send("list members", |client| client.get(url.as_str()))
            .await?;
        let members: ListResponse<Member> = read_json(response, "list members").await?;
        Ok(members.data)
    }

    async fn get_member(&self, member_id: &str) -> AppResult<Member> {
        let url = self.url(&format!("/members/{member_id}"));
        let response = self
            .send("get member", |client| client.get(url.as_str()))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("member '{member_id}'")));
        }
        read_json(response, "get member").await
    }

    async fn invite_member(&self, invite: MemberInvite) -> AppResult<String> {
        let url = self.url("/members");
        let body = MemberInviteBody::from(&invite);
        let response = self
            .send("invite member", |client| client.post(url.as_str()).json(&body))
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body).ok().and_then(|value| {
                value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
            });
            if message.as_deref() == Some(ALREADY_INVITED_MESSAGE) {
                info!("user already invited, resolving existing member");
                return self.find_member_id_by_email(invite.email.as_str()).await;
            }
            return Err(AppError::Upstream(format!(
                "invite member failed with status 400 Bad Request: {body}"
            )));
        }

        let created: CreatedResponse = read_json(response, "invite member").await?;
        Ok(created.id)
    }

    async fn reinvite_member(&self, member_id: &str) -> AppResult<()> {
        let url = self.url(&format!("/members/{member_id}/reinvite"));
        let response = self
            .send("reinvite member", |client| client.post(url.as_str()))
            .await?;
        ensure_success(response, "reinvite member").await?;
        Ok(())
    }

    async fn remove_member(&self, member_id: &str) -> AppResult<()> {
        let url = self.url(&format!("/members/{member_id}"));
        let response = self
            .send("remove member", |client| client.delete(url.as_str()))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!(member_id, "member already absent from organisation");
            return Ok(());
        }
        ensure_success(response, "remove member").await?;
        Ok(())
    }

    async fn update_member(&self, member: &Member) -> AppResult<()> {
        let url = self.url(&format!("/members/{}", member.id));
        let body = MemberUpdateBody::from(member);
        let response = self
            .send("update member", |client| client.put(url.as_str()).json(&body))
            .await?;
        ensure_success(response, "update member").await?;
        Ok(())
    }

    async fn get_member_group_ids(&self, member_id: &str) -> AppResult<Vec<String>> {
        let url = self.url(&format!("/members/{member_id}/group-ids"));
        let response = self
            .send("get member groups", |client| client.get(url.as_str()))
            .await?;
        read_json(response, "get member groups").await
    }

    async fn update_member_group_ids(
        &self,
        member_id: &str,
        group_ids: &[String],
    ) -> AppResult<()> {
        let url = self.url(&format!("/members/{member_id}/group-ids"));
        let body = GroupIdsBody { group_ids };
        let response = self
            .send("update member groups", |client| {
                client.put(url.as_str()).json(&body)
            })
            .await?;
        ensure_success(response, "update member groups").await?;
        Ok(())
    }

    async fn list_groups(&self) -> AppResult<Vec<Group>> {
        let url = self.url("/groups");
        let response = self
            .send("list groups", |client| client.get(url.as_str()))
            .await?;
        let groups: ListResponse<Group> = read_json(response, "list groups").await?;
        Ok(groups.data)
    }

    async fn create_group(&self, group: NewGroup) -> AppResult<String> {
        let url = self.url("/groups");
        let body = GroupCreateBody::from(&group);
        let response = self
            .send("create group", |client| client.post(url.as_str()).json(&body))
            .await?;
        let created: CreatedResponse = read_json(response, "create group").await?;
        Ok(created.id)
    }

    async fn list_group_member_ids(&self, group_id: &str) -> AppResult<Vec<String>> {
        let url = self.url(&format!("/groups/{group_id}/member-ids"));
        let response = self
            .send("list group members", |client| client.get(url.as_str()))
            .await?;
        read_json(response, "list group members").await
    }

    async fn list_collections(&self) -> AppResult<Vec<Collection>> {
        let url = self.url("/collections");
        let response = self
            .send("list collections", |client| client.get(url.as_str()))
            .await?;
        let collections: ListResponse<Collection> =
            read_json(response, "list collections").await?;
        Ok(collections.data)
    }

    async fn get_collection(&self, collection_id: &str) -> AppResult<Collection> {
        let url = self.url(&format!("/collections/{collection_id}"));
        let response = self
            .send("get collection", |client| client.get(url.as_str()))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("collection '{collection_id}'")));
        }
        read_json(response, "get collection").await
    }

    async fn update_collection(&self, collection: &Collection) -> AppResult<()> {
        let url = self.url(&format!("/collections/{}", collection.id));
        let body = CollectionUpdateBody::from(collection);
        let response = self
            .send("update collection", |client| {
                client.put(url.as_str()).json(&body)
            })
            .await?;
        ensure_success(response, "update collection").await?;
        Ok(())
    }

    async fn list_active_user_ids(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<BTreeSet<String>> {
        self.collect_active_user_ids(start, end).await
    }
}
