//! Vault organisation entities as exchanged with the vault public API.

use serde::{Deserialize, Deserializer, Serialize};
use warden_core::AppError;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Access entry linking a group or member to a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionAccess {
    /// Group, member, or collection identifier depending on the owner.
    pub id: String,
    /// Read-only access.
    #[serde(default)]
    pub read_only: bool,
    /// Hides item passwords.
    #[serde(default)]
    pub hide_passwords: bool,
    /// Allows managing the collection.
    #[serde(default)]
    pub manage: bool,
}

impl CollectionAccess {
    /// Read-write access without manage rights.
    #[must_use]
    pub fn read_write(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            read_only: false,
            hide_passwords: false,
            manage: false,
        }
    }

    /// Read-write access with manage rights.
    #[must_use]
    pub fn managing(id: impl Into<String>) -> Self {
        Self {
            manage: true,
            ..Self::read_write(id)
        }
    }
}

/// Vault group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Group identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// External identifier, set for directory-managed groups.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Collections the group can access.
    #[serde(default, deserialize_with = "null_as_default")]
    pub collections: Vec<CollectionAccess>,
}

/// Vault collection with its group access list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Collection identifier.
    pub id: String,
    /// External identifier, absent or blank for manually created collections.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Groups with access to the collection.
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<CollectionAccess>,
}

impl Collection {
    /// Returns whether the collection was created by hand rather than by reconciliation.
    #[must_use]
    pub fn is_manually_created(&self) -> bool {
        self.external_id
            .as_deref()
            .is_none_or(|external_id| external_id.trim().is_empty())
    }

    /// Returns whether the group already has an access entry.
    #[must_use]
    pub fn has_group(&self, group_id: &str) -> bool {
        self.groups.iter().any(|access| access.id == group_id)
    }
}

/// Resolved team collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    /// Collection identifier.
    pub id: String,
    /// Team external identifier.
    pub external_id: String,
}

/// Organisation member role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum MemberType {
    /// Organisation owner.
    Owner,
    /// Organisation administrator.
    Admin,
    /// Regular user.
    User,
    /// Legacy manager role.
    Manager,
    /// Role with an explicit permission set.
    Custom,
}

impl MemberType {
    /// Returns the name reported to callers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::User => "REGULAR_USER",
            Self::Manager => "MANAGER",
            Self::Custom => "CUSTOM",
        }
    }
}

impl TryFrom<i32> for MemberType {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Owner),
            1 => Ok(Self::Admin),
            2 => Ok(Self::User),
            3 => Ok(Self::Manager),
            4 => Ok(Self::Custom),
            _ => Err(AppError::Validation(format!("unknown member type {value}"))),
        }
    }
}

impl From<MemberType> for i32 {
    fn from(value: MemberType) -> Self {
        match value {
            MemberType::Owner => 0,
            MemberType::Admin => 1,
            MemberType::User => 2,
            MemberType::Manager => 3,
            MemberType::Custom => 4,
        }
    }
}

/// Organisation membership state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum MemberStatus {
    /// Invitation sent, not yet accepted.
    Invited,
    /// Invitation accepted, awaiting confirmation.
    Accepted,
    /// Confirmed member.
    Confirmed,
    /// Access revoked.
    Revoked,
}

impl MemberStatus {
    /// Returns the name reported to callers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invited => "INVITED",
            Self::Accepted => "ACCEPTED",
            Self::Confirmed => "CONFIRMED",
            Self::Revoked => "REVOKED",
        }
    }
}

impl TryFrom<i32> for MemberStatus {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Invited),
            1 => Ok(Self::Accepted),
            2 => Ok(Self::Confirmed),
            -1 => Ok(Self::Revoked),
            _ => Err(AppError::Validation(format!(
                "unknown member status {value}"
            ))),
        }
    }
}

impl From<MemberStatus> for i32 {
    fn from(value: MemberStatus) -> Self {
        match value {
            MemberStatus::Invited => 0,
            MemberStatus::Accepted => 1,
            MemberStatus::Confirmed => 2,
            MemberStatus::Revoked => -1,
        }
    }
}

/// Fine-grained permissions of a custom-role member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberPermissions {
    /// Event log access.
    pub access_event_logs: bool,
    /// Import and export access.
    pub access_import_export: bool,
    /// Report access.
    pub access_reports: bool,
    /// Collection creation.
    pub create_new_collections: bool,
    /// Edit any collection.
    pub edit_any_collection: bool,
    /// Delete any collection.
    pub delete_any_collection: bool,
    /// Group management.
    pub manage_groups: bool,
    /// Policy management.
    pub manage_policies: bool,
    /// Single sign-on management.
    pub manage_sso: bool,
    /// Member management.
    pub manage_users: bool,
    /// Account recovery management.
    pub manage_reset_password: bool,
    /// SCIM management.
    pub manage_scim: bool,
}

impl MemberPermissions {
    /// Permission set granted to support administrators.
    #[must_use]
    pub fn support_admin() -> Self {
        Self {
            access_event_logs: true,
            access_reports: true,
            manage_users: true,
            ..Self::default()
        }
    }
}

/// Organisation member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Member identifier within the organisation.
    pub id: String,
    /// Account identifier, absent until the invitation is accepted.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Whether two-factor authentication is enabled.
    #[serde(default)]
    pub two_factor_enabled: bool,
    /// Membership status.
    pub status: MemberStatus,
    /// Member role.
    #[serde(rename = "type")]
    pub member_type: MemberType,
    /// Directory username.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Whether account recovery enrollment is set.
    #[serde(default)]
    pub reset_password_enrolled: bool,
    /// Custom permissions, if any.
    #[serde(default)]
    pub permissions: Option<MemberPermissions>,
    /// Direct collection access.
    #[serde(default, deserialize_with = "null_as_default")]
    pub collections: Vec<CollectionAccess>,
}

impl Member {
    /// Returns whether the member was provisioned for this directory username.
    #[must_use]
    pub fn has_external_id(&self, username: &str) -> bool {
        self.external_id.as_deref() == Some(username)
    }
}
