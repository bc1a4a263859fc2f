//! Vault session backed by the vault command line client.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{info, warn};
use warden_application::{PendingMember, SessionCollection, VaultItem, VaultSession};
use warden_core::{AppError, AppResult};
use warden_domain::{MemberStatus, external_id_for_team};

/// Settings for the vault command line client.
#[derive(Debug, Clone)]
pub struct VaultCliConfig {
    /// Path of the CLI executable.
    pub cli_path: PathBuf,
    /// Organisation all commands operate on.
    pub organisation_id: String,
    /// API key client id.
    pub client_id: String,
    /// API key client secret.
    pub client_secret: String,
    /// Master password used to unlock the vault.
    pub password: String,
    /// Password protecting exported archives.
    pub export_password: String,
    /// Upper bound for a single CLI invocation.
    pub timeout: Duration,
    /// Directory for temporary export files.
    pub scratch_directory: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ListedCollection {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ListedItem {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ListedMember {
    id: String,
    email: String,
    status: i32,
}

#[derive(Debug, Default)]
struct SessionState {
    logged_in: bool,
    token: Option<String>,
}

/// [`VaultSession`] that shells out to the CLI, unlocking lazily.
pub struct CliVaultSession {
    config: VaultCliConfig,
    state: Mutex<SessionState>,
}

impl CliVaultSession {
    /// Creates a session that logs in on first use.
    #[must_use]
    pub fn new(config: VaultCliConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SessionState::default()),
        }
    }

    async fn run(&self, args: &[&str], envs: &[(&str, &str)]) -> AppResult<String> {
        let subcommand = subcommand(args);
        let mut command = Command::new(&self.config.cli_path);
        command
            .args(args)
            .envs(envs.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.config.timeout, command.output())
            .await
            .map_err(|_| {
                AppError::Upstream(format!(
                    "vault cli {subcommand} timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            })?
            .map_err(|error| {
                AppError::Upstream(format!("vault cli {subcommand} could not start: {error}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Upstream(format!(
                "vault cli {subcommand} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout).map_err(|error| {
            AppError::Upstream(format!("vault cli {subcommand} returned invalid utf-8: {error}"))
        })
    }

    /// Returns the session token, logging in and unlocking if needed.
    async fn session(&self) -> AppResult<String> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.token.as_ref() {
            return Ok(token.clone());
        }

        if !state.logged_in {
            self.run(
                &["login", "--apikey"],
                &[
                    ("BW_CLIENTID", self.config.client_id.as_str()),
                    ("BW_CLIENTSECRET", self.config.client_secret.as_str()),
                ],
            )
            .await?;
            state.logged_in = true;
            info!("logged in to vault cli");
        }

        let unlocked = self
            .run(
                &["unlock", "--passwordenv", "BW_PASSWORD", "--raw"],
                &[("BW_PASSWORD", self.config.password.as_str())],
            )
            .await?;
        let token = unlocked.trim().to_owned();
        if token.is_empty() {
            return Err(AppError::Unauthorized(
                "vault cli unlock returned no session token".to_owned(),
            ));
        }
        info!("unlocked vault cli");

        state.token = Some(token.clone());
        Ok(token)
    }

    async fn run_in_session(&self, args: &[&str]) -> AppResult<String> {
        let token = self.session().await?;
        self.run(args, &[("BW_SESSION", token.as_str())]).await
    }

    async fn list<T: DeserializeOwned>(&self, args: &[&str]) -> AppResult<Vec<T>> {
        let output = self.run_in_session(args).await?;
        serde_json::from_str(&output).map_err(|error| {
            AppError::Upstream(format!(
                "vault cli {} returned invalid json: {error}",
                subcommand(args)
            ))
        })
    }

    fn export_path(&self) -> PathBuf {
        self.config.scratch_directory.join(format!(
            "vault_export_{}_{}.json",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }
}

fn subcommand(args: &[&str]) -> String {
    args.iter().take(2).copied().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl VaultSession for CliVaultSession {
    async fn export(&self) -> AppResult<Vec<u8>> {
        let output_path = self.export_path();
        let output = output_path.to_string_lossy().into_owned();
        let organisation_id = self.config.organisation_id.as_str();

        let exported = self
            .run_in_session(&[
                "export",
                "--format",
                "encrypted_json",
                "--password",
                self.config.export_password.as_str(),
                "--output",
                output.as_str(),
                "--organizationid",
                organisation_id,
            ])
            .await;

        let bytes = match exported {
            Ok(_) => tokio::fs::read(&output_path).await.map_err(|error| {
                AppError::Upstream(format!("failed to read vault export: {error}"))
            }),
            Err(error) => Err(error),
        };

        if let Err(error) = tokio::fs::remove_file(&output_path).await
            && error.kind() != std::io::ErrorKind::NotFound
        {
            warn!(error = %error, "failed to remove temporary vault export");
        }

        let bytes = bytes?;
        info!(bytes = bytes.len(), "exported vault");
        Ok(bytes)
    }

    async fn create_collections(&self, teams: &[String]) -> AppResult<()> {
        let organisation_id = self.config.organisation_id.as_str();
        for team in teams {
            let payload = json!({
                "organizationId": organisation_id,
                "name": team,
                "externalId": external_id_for_team(team),
                "groups": [],
            });
            let encoded = STANDARD.encode(payload.to_string());
            self.run_in_session(&[
                "create",
                "org-collection",
                "--organizationid",
                organisation_id,
                encoded.as_str(),
            ])
            .await?;
            info!(team = %team, "created collection");
        }
        Ok(())
    }

    async fn list_collections(&self) -> AppResult<Vec<SessionCollection>> {
        let collections: Vec<ListedCollection> = self
            .list(&[
                "list",
                "org-collections",
                "--organizationid",
                self.config.organisation_id.as_str(),
            ])
            .await?;
        Ok(collections
            .into_iter()
            .map(|collection| SessionCollection {
                id: collection.id,
                name: collection.name,
            })
            .collect())
    }

    async fn list_items(&self, collection_id: &str) -> AppResult<Vec<VaultItem>> {
        let items: Vec<ListedItem> = self
            .list(&["list", "items", "--collectionid", collection_id])
            .await?;
        Ok(items
            .into_iter()
            .map(|item| VaultItem {
                id: item.id,
                name: item.name,
            })
            .collect())
    }

    async fn list_unconfirmed_members(&self) -> AppResult<Vec<PendingMember>> {
        let members: Vec<ListedMember> = self
            .list(&[
                "list",
                "org-members",
                "--organizationid",
                self.config.organisation_id.as_str(),
            ])
            .await?;
        Ok(members
            .into_iter()
            .filter(|member| member.status == i32::from(MemberStatus::Accepted))
            .map(|member| PendingMember {
                id: member.id,
                email: member.email,
            })
            .collect())
    }

    async fn confirm_member(&self, member_id: &str) -> AppResult<()> {
        self.run_in_session(&[
            "confirm",
            "org-member",
            member_id,
            "--organizationid",
            self.config.organisation_id.as_str(),
        ])
        .await?;
        info!(member_id, "confirmed member");
        Ok(())
    }

    async fn logout(&self) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !std::mem::take(&mut *state).logged_in {
            return Ok(());
        }

        self.run(&["logout"], &[]).await?;
        info!("logged out of vault cli");
        Ok(())
    }
}
