use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_core::AppResult;
use warden_domain::{Collection, CollectionAccess, Group, Member, MemberType};

/// Invitation sent to a new organisation member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInvite {
    /// Email address to invite.
    pub email: String,
    /// Directory username stored as external identifier.
    pub external_id: String,
    /// Initial role.
    pub member_type: MemberType,
    /// Account recovery enrollment.
    pub reset_password_enrolled: bool,
    /// Initial direct collection access.
    pub collections: Vec<CollectionAccess>,
}

impl MemberInvite {
    /// Regular-user invitation for a directory user.
    #[must_use]
    pub fn regular_user(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            external_id: username.into(),
            member_type: MemberType::User,
            reset_password_enrolled: true,
            collections: Vec::new(),
        }
    }
}

/// New team group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    /// Display name, the team name.
    pub name: String,
    /// Team external identifier.
    pub external_id: String,
    /// Collections granted on creation.
    pub collections: Vec<CollectionAccess>,
}

/// Port for the vault organisation public API.
#[async_trait]
pub trait VaultDirectory: Send + Sync {
    /// Lists organisation members.
    async fn list_members(&self) -> AppResult<Vec<Member>>;

    /// Reads one member with its collections.
    async fn get_member(&self, member_id: &str) -> AppResult<Member>;

    /// Invites a member and returns its identifier.
    ///
    /// An address that was already invited resolves to the existing member.
    async fn invite_member(&self, invite: MemberInvite) -> AppResult<String>;

    /// Re-sends a pending invitation.
    async fn reinvite_member(&self, member_id: &str) -> AppResult<()>;

    /// Removes a member from the organisation.
    async fn remove_member(&self, member_id: &str) -> AppResult<()>;

    /// Replaces a member's role, permissions, and direct collections.
    async fn update_member(&self, member: &Member) -> AppResult<()>;

    /// Returns the ids of the groups the member belongs to.
    async fn get_member_group_ids(&self, member_id: &str) -> AppResult<Vec<String>>;

    /// Replaces the member's group list.
    async fn update_member_group_ids(&self, member_id: &str, group_ids: &[String])
    -> AppResult<()>;

    /// Lists organisation groups.
    async fn list_groups(&self) -> AppResult<Vec<Group>>;

    /// Creates a group and returns its identifier.
    async fn create_group(&self, group: NewGroup) -> AppResult<String>;

    /// Returns the member ids of a group.
    async fn list_group_member_ids(&self, group_id: &str) -> AppResult<Vec<String>>;

    /// Lists organisation collections.
    async fn list_collections(&self) -> AppResult<Vec<Collection>>;

    /// Reads one collection with its groups.
    async fn get_collection(&self, collection_id: &str) -> AppResult<Collection>;

    /// Replaces a collection's group access, keeping its external identifier.
    async fn update_collection(&self, collection: &Collection) -> AppResult<()>;

    /// Returns the account ids that acted in the organisation within the window.
    async fn list_active_user_ids(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<BTreeSet<String>>;
}
