use std::sync::Arc;

use warden_application::{
    BlobStore, EventDispatcher, InviteStore, LifecycleService, MaintenanceService,
    ReconciliationService, TeamDirectory, VaultDirectory, VaultSession,
};
use warden_core::AppError;
use warden_infrastructure::{
    CliVaultSession, FilesystemBlobStore, HttpTeamDirectory, HttpVaultDirectory, RedisInviteStore,
};

use crate::handler_config::HandlerConfig;

pub fn build_dispatcher(config: &HandlerConfig) -> Result<EventDispatcher, AppError> {
    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build http client: {error}")))?;
    let redis_client = redis::Client::open(config.redis_url.as_str())
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;

    let team_directory: Arc<dyn TeamDirectory> = Arc::new(HttpTeamDirectory::new(
        http_client.clone(),
        config.team_directory.clone(),
    ));
    let vault_directory: Arc<dyn VaultDirectory> = Arc::new(HttpVaultDirectory::new(
        http_client,
        config.vault_api.clone(),
    ));
    let vault_session: Arc<dyn VaultSession> =
        Arc::new(CliVaultSession::new(config.vault_cli.clone()));
    let invite_store: Arc<dyn InviteStore> = Arc::new(RedisInviteStore::new(
        redis_client,
        config.invite_key_prefix.clone(),
    ));
    let blob_store: Arc<dyn BlobStore> =
        Arc::new(FilesystemBlobStore::new(config.export_directory.clone()));

    let reconciliation = ReconciliationService::new(
        team_directory.clone(),
        vault_directory.clone(),
        vault_session.clone(),
        config.maintenance.support_admin_team.clone(),
    );
    let lifecycle = LifecycleService::new(
        vault_directory.clone(),
        vault_session.clone(),
        invite_store,
        reconciliation.clone(),
    );
    let maintenance = MaintenanceService::new(
        team_directory,
        vault_directory,
        vault_session.clone(),
        blob_store,
        config.maintenance.clone(),
    );

    Ok(EventDispatcher::new(
        reconciliation,
        lifecycle,
        maintenance,
        vault_session,
    ))
}
