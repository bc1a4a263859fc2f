//! Group and collection reconciliation for directory users.
//!
//! A member's vault groups are recomputed from their directory teams on every
//! run: each team owns one collection and one group sharing the team's
//! external identifier. Missing ones are created, duplicates abort the run,
//! manually created collections and custom groups are left alone.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};
use warden_core::{AppError, AppResult};
use warden_domain::{
    CollectionAccess, CollectionRef, DirectoryUser, Member, MemberPermissions, MemberType,
    TeamIndex, custom_group_ids, external_id_for_team, final_group_ids,
    qualifies_for_support_permissions, validate_group_name,
};

use crate::directory_ports::TeamDirectory;
use crate::vault_ports::{NewGroup, VaultDirectory, VaultSession};

mod collections;
mod groups;
mod permissions;

/// Application service reconciling vault access with directory teams.
#[derive(Clone)]
pub struct ReconciliationService {
    team_directory: Arc<dyn TeamDirectory>,
    vault_directory: Arc<dyn VaultDirectory>,
    vault_session: Arc<dyn VaultSession>,
    support_admin_team: String,
}

impl ReconciliationService {
    /// Creates a new reconciliation service.
    #[must_use]
    pub fn new(
        team_directory: Arc<dyn TeamDirectory>,
        vault_directory: Arc<dyn VaultDirectory>,
        vault_session: Arc<dyn VaultSession>,
        support_admin_team: impl Into<String>,
    ) -> Self {
        Self {
            team_directory,
            vault_directory,
            vault_session,
            support_admin_team: support_admin_team.into(),
        }
    }

    /// Reconciles the member registered under `email` with the user's teams.
    ///
    /// Returns `false` when no member has that email.
    pub async fn update_user_groups(&self, username: &str, email: &str) -> AppResult<bool> {
        let members = self.vault_directory.list_members().await?;
        let Some(member) = members
            .into_iter()
            .find(|member| member.email.eq_ignore_ascii_case(email))
        else {
            info!(username, "no vault member found for email, skipping group update");
            return Ok(false);
        };

        self.reconcile_member(member.id.as_str(), username, email)
            .await?;
        Ok(true)
    }

    /// Reconciles every member that carries a directory username.
    ///
    /// Failures are collected per member and reported together.
    pub async fn reconcile_all_members(&self) -> AppResult<()> {
        let members = self.vault_directory.list_members().await?;
        let mut failures = Vec::new();

        for member in members {
            let Some(username) = member
                .external_id
                .as_deref()
                .filter(|username| !username.trim().is_empty())
            else {
                info!(member_id = %member.id, "member has no external id, skipping");
                continue;
            };

            if let Err(error) = self
                .reconcile_member(member.id.as_str(), username, member.email.as_str())
                .await
            {
                warn!(member_id = %member.id, username, error = %error, "member reconciliation failed");
                failures.push(AppError::Upstream(format!("{username}: {error}")));
            }
        }

        AppError::from_failures("associate users to groups", failures)
    }

    /// Runs the full reconciliation for one member.
    pub async fn reconcile_member(
        &self,
        member_id: &str,
        username: &str,
        email: &str,
    ) -> AppResult<()> {
        let teams = self.team_directory.get_user_teams(username).await?;
        let user = self.directory_user(username, email, &teams).await?;

        let groups = self.list_existing_groups(&teams).await?;
        let collections = self.list_existing_collections(&teams).await?;
        ensure_no_duplicates(&teams, &groups, &collections)?;

        self.create_missing_collections(&collections.missing_teams(&teams))
            .await?;
        let collections = self.list_existing_collections(&teams).await?;

        let managed_group_ids = self
            .collate_user_group_ids(&teams, &groups, &collections)
            .await?;
        let custom_group_ids = self.custom_group_ids().await?;
        self.associate_user_to_groups(member_id, &managed_group_ids, &custom_group_ids)
            .await?;

        let member = self.vault_directory.get_member(member_id).await?;
        let member = self
            .grant_manage_permission_to_team_collections(member, &user, &teams, &collections)
            .await?;
        self.assign_custom_permissions_to_support_admin(member, &teams)
            .await?;

        info!(username, team_count = teams.len(), "member reconciled");
        Ok(())
    }

    async fn directory_user(
        &self,
        username: &str,
        email: &str,
        teams: &[String],
    ) -> AppResult<DirectoryUser> {
        let mut roles_by_team = BTreeMap::new();
        for team in teams {
            if let Some(role) = self
                .team_directory
                .get_user_role_by_team(username, team)
                .await?
            {
                roles_by_team.insert(team.clone(), role);
            }
        }

        Ok(DirectoryUser {
            username: username.to_owned(),
            email: email.to_owned(),
            roles_by_team,
        })
    }
}

fn ensure_no_duplicates(
    teams: &[String],
    groups: &TeamIndex<String>,
    collections: &TeamIndex<CollectionRef>,
) -> AppResult<()> {
    if let Some(team) = collections.first_duplicate(teams) {
        return Err(AppError::Duplicate(format!(
            "more than one collection carries the external id of team '{team}'"
        )));
    }

    if let Some(team) = groups.first_duplicate(teams) {
        return Err(AppError::Duplicate(format!(
            "more than one group carries the external id of team '{team}'"
        )));
    }

    Ok(())
}
