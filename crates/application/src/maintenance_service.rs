//! Organisation-wide maintenance: backups, inactive members and lookups.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use warden_core::{AppError, AppResult};
use warden_domain::{CollectionAccess, Member, MemberPermissions};

use crate::directory_ports::TeamDirectory;
use crate::vault_ports::{BlobStore, VaultDirectory, VaultSession};

mod inactive_members;
mod lookups;

/// Names of the organisation entities that protect members from removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceSettings {
    /// Members with access to this collection are never offboarded.
    pub protected_collection_name: String,
    /// Members of this group are never offboarded.
    pub protected_group_name: String,
    /// Administrators of this directory team are never offboarded.
    pub support_admin_team: String,
    /// Only log what inactive-member offboarding would remove.
    pub dry_run: bool,
}

/// Outcome of an inactive-member sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InactiveMemberReport {
    /// Accounts with activity in the window.
    pub active_users: usize,
    /// Inactive member ids.
    pub inactive_members: Vec<String>,
    /// Inactive member ids kept because they are protected.
    pub protected_members: Vec<String>,
    /// Member ids removed, empty on a dry run.
    pub removed_members: Vec<String>,
    /// Whether removal was skipped.
    pub dry_run: bool,
}

/// Member details reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetails {
    /// Email address.
    pub email: String,
    /// Whether two-factor authentication is enabled.
    pub two_factor_enabled: bool,
    /// Membership status name.
    pub status: String,
    /// Role name.
    #[serde(rename = "type")]
    pub member_type: String,
    /// Direct collection access.
    pub collections: Vec<CollectionAccess>,
    /// Directory username.
    pub external_id: Option<String>,
    /// Custom permissions.
    pub permissions: Option<MemberPermissions>,
}

impl From<Member> for MemberDetails {
    fn from(member: Member) -> Self {
        Self {
            email: member.email,
            two_factor_enabled: member.two_factor_enabled,
            status: member.status.as_str().to_owned(),
            member_type: member.member_type.as_str().to_owned(),
            collections: member.collections,
            external_id: member.external_id,
            permissions: member.permissions,
        }
    }
}

/// Item names of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionItems {
    /// Collection name.
    pub collection: String,
    /// Item names.
    pub items: Vec<String>,
}

/// Application service for organisation-wide maintenance tasks.
#[derive(Clone)]
pub struct MaintenanceService {
    team_directory: Arc<dyn TeamDirectory>,
    vault_directory: Arc<dyn VaultDirectory>,
    vault_session: Arc<dyn VaultSession>,
    blob_store: Arc<dyn BlobStore>,
    settings: MaintenanceSettings,
}

impl MaintenanceService {
    /// Creates a new maintenance service.
    #[must_use]
    pub fn new(
        team_directory: Arc<dyn TeamDirectory>,
        vault_directory: Arc<dyn VaultDirectory>,
        vault_session: Arc<dyn VaultSession>,
        blob_store: Arc<dyn BlobStore>,
        settings: MaintenanceSettings,
    ) -> Self {
        Self {
            team_directory,
            vault_directory,
            vault_session,
            blob_store,
            settings,
        }
    }

    /// Stores an encrypted export of the vault and returns its key.
    pub async fn export_vault(&self, now: DateTime<Utc>) -> AppResult<String> {
        let bytes = self.vault_session.export().await?;
        if bytes.is_empty() {
            return Err(AppError::Upstream("vault export produced no data".to_owned()));
        }

        let key = format!("vault_export_{}.json", now.format("%Y-%m-%dT%H-%M-%SZ"));
        let size = bytes.len();
        self.blob_store.put(key.as_str(), bytes).await?;
        info!(key = %key, bytes = size, "vault export stored");
        Ok(key)
    }
}
