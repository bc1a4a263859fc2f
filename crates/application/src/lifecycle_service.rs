//! Member lifecycle: onboarding, offboarding, invitations and confirmation.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use warden_core::{AppError, AppResult};
use warden_domain::{InviteRecord, MemberStatus, ReinviteDecision};

use crate::ReconciliationService;
use crate::vault_ports::{InviteStore, MemberInvite, VaultDirectory, VaultSession};

mod confirmation;
mod invitations;

/// Application service for joining and leaving the organisation.
#[derive(Clone)]
pub struct LifecycleService {
    vault_directory: Arc<dyn VaultDirectory>,
    vault_session: Arc<dyn VaultSession>,
    invite_store: Arc<dyn InviteStore>,
    reconciliation: ReconciliationService,
}

impl LifecycleService {
    /// Creates a new lifecycle service.
    #[must_use]
    pub fn new(
        vault_directory: Arc<dyn VaultDirectory>,
        vault_session: Arc<dyn VaultSession>,
        invite_store: Arc<dyn InviteStore>,
        reconciliation: ReconciliationService,
    ) -> Self {
        Self {
            vault_directory,
            vault_session,
            invite_store,
            reconciliation,
        }
    }

    /// Invites a directory user and grants their team access.
    ///
    /// Returns the member id.
    pub async fn onboard(&self, username: &str, email: &str, today: NaiveDate) -> AppResult<String> {
        let member_id = self
            .vault_directory
            .invite_member(MemberInvite::regular_user(username, email))
            .await?;
        info!(username, member_id = %member_id, "member invited");

        self.invite_store
            .put(&InviteRecord::first(username, today))
            .await?;

        self.reconciliation
            .reconcile_member(member_id.as_str(), username, email)
            .await?;
        Ok(member_id)
    }

    /// Removes the member provisioned for `username` and forgets their invitations.
    ///
    /// Returns `false` when no such member exists.
    pub async fn offboard(&self, username: &str) -> AppResult<bool> {
        let members = self.vault_directory.list_members().await?;
        let member = members
            .into_iter()
            .find(|member| member.has_external_id(username));

        let removed = match member {
            Some(member) => {
                self.vault_directory
                    .remove_member(member.id.as_str())
                    .await?;
                info!(username, member_id = %member.id, "member removed from organisation");
                true
            }
            None => {
                info!(username, "user not found in the vault organisation");
                false
            }
        };

        self.invite_store.delete(username).await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests;
