//! Team directory HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use url::Url;
use warden_application::TeamDirectory;
use warden_core::{AppError, AppResult};
use warden_domain::DirectoryRole;

use crate::access_token::{IssuedToken, TokenCache};
use crate::http_support::read_json;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for the team directory.
#[derive(Debug, Clone)]
pub struct TeamDirectoryConfig {
    /// API base URL.
    pub api_url: String,
    /// Login endpoint.
    pub auth_url: String,
    /// Client id, also sent as the requester.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "Token")]
    token: String,
}

#[derive(Debug, Default, Deserialize)]
struct TeamsResponse {
    #[serde(default)]
    teams: Option<Vec<TeamEntry>>,
}

#[derive(Debug, Deserialize)]
struct TeamEntry {
    #[serde(default)]
    team: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MembersResponse {
    #[serde(default)]
    members: Option<Vec<TeamMemberEntry>>,
}

#[derive(Debug, Deserialize)]
struct TeamMemberEntry {
    username: String,
    #[serde(default)]
    role: Option<String>,
}

impl TeamsResponse {
    fn into_names(self) -> Vec<String> {
        self.teams
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| entry.team)
            .collect()
    }
}

/// HTTP implementation of the team directory port.
pub struct HttpTeamDirectory {
    http_client: reqwest::Client,
    config: TeamDirectoryConfig,
    tokens: TokenCache,
}

impl HttpTeamDirectory {
    /// Creates a client with its own token cache.
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: TeamDirectoryConfig) -> Self {
        Self {
            http_client,
            config,
            tokens: TokenCache::new(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(self.config.api_url.as_str()).map_err(|error| {
            AppError::Internal(format!("invalid team directory url: {error}"))
        })?;
        url.path_segments_mut()
            .map_err(|()| AppError::Internal("team directory url cannot be a base".to_owned()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn login(&self) -> AppResult<IssuedToken> {
        let response = self
            .http_client
            .post(self.config.auth_url.as_str())
            .timeout(LOGIN_TIMEOUT)
            .json(&json!({
                "username": self.config.client_id,
                "password": self.config.client_secret,
            }))
            .send()
            .await
            .map_err(|error| {
                AppError::Upstream(format!("team directory login request failed: {error}"))
            })?;

        let login: LoginResponse = read_json(response, "team directory login")
            .await
            .map_err(|error| AppError::Unauthorized(error.to_string()))?;
        Ok(IssuedToken {
            value: login.token,
            expires_at: None,
        })
    }

    async fn get(&self, context: &str, url: &Url) -> AppResult<Response> {
        let token = self.tokens.get_or_login(|| self.login()).await?;
        let response = self.get_with_token(context, url, token.as_str()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        info!(context, "team directory token rejected, logging in again");
        self.tokens.invalidate().await;
        let token = self.tokens.get_or_login(|| self.login()).await?;
        self.get_with_token(context, url, token.as_str()).await
    }

    async fn get_with_token(&self, context: &str, url: &Url, token: &str) -> AppResult<Response> {
        self.http_client
            .get(url.clone())
            .header("Token", token)
            .header("requester", self.config.client_id.as_str())
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("{context} request failed: {error}")))
    }

    async fn team_members(&self, team: &str) -> AppResult<Vec<TeamMemberEntry>> {
        let url = self.endpoint(&["organisations", "teams", team, "members"])?;
        let response = self.get("get team members", &url).await?;
        let members: MembersResponse =
            read_json(response, &format!("get team members of {team}")).await?;
        Ok(members.members.unwrap_or_default())
    }
}

#[async_trait]
impl TeamDirectory for HttpTeamDirectory {
    async fn get_user_teams(&self, username: &str) -> AppResult<Vec<String>> {
        let url = self.endpoint(&["organisations", "users", username, "teams"])?;
        let response = self.get("get user teams", &url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                info!(username, "user not found in team directory");
                return Ok(Vec::new());
            }
            StatusCode::UNPROCESSABLE_ENTITY => {
                info!(username, "team directory rejected username as invalid");
                return Ok(Vec::new());
            }
            _ => {}
        }

        let teams: TeamsResponse = read_json(response, "get user teams").await?;
        let teams = teams.into_names();
        info!(username, teams = ?teams, "fetched user teams");
        Ok(teams)
    }

    async fn get_teams(&self) -> AppResult<Vec<String>> {
        let url = self.endpoint(&["organisations", "teams"])?;
        let response = self.get("get teams", &url).await?;
        let teams: TeamsResponse = read_json(response, "get teams").await?;
        Ok(teams.into_names())
    }

    async fn get_user_role_by_team(
        &self,
        username: &str,
        team: &str,
    ) -> AppResult<Option<DirectoryRole>> {
        Ok(self
            .team_members(team)
            .await?
            .into_iter()
            .find(|member| member.username == username)
            .map(|member| DirectoryRole::from_directory(member.role.as_deref().unwrap_or_default())))
    }

    async fn get_team_admin_users(&self, teams: &[String]) -> AppResult<Vec<String>> {
        let mut admins: Vec<String> = Vec::new();
        for team in teams {
            for member in self.team_members(team).await? {
                let role = DirectoryRole::from_directory(member.role.as_deref().unwrap_or_default());
                if role.can_manage_team_collection() && !admins.contains(&member.username) {
                    admins.push(member.username);
                }
            }
        }
        Ok(admins)
    }
}
