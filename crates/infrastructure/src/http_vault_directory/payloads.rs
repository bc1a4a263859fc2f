use serde::{Deserialize, Serialize};
use warden_application::{MemberInvite, NewGroup};
use warden_domain::{Collection, CollectionAccess, Member, MemberPermissions, MemberType};

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MemberInviteBody<'a> {
    #[serde(rename = "type")]
    pub member_type: MemberType,
    pub access_all: bool,
    pub reset_password_enrolled: bool,
    pub external_id: &'a str,
    pub email: &'a str,
    pub collections: &'a [CollectionAccess],
}

impl<'a> From<&'a MemberInvite> for MemberInviteBody<'a> {
    fn from(invite: &'a MemberInvite) -> Self {
        Self {
            member_type: invite.member_type,
            access_all: false,
            reset_password_enrolled: invite.reset_password_enrolled,
            external_id: invite.external_id.as_str(),
            email: invite.email.as_str(),
            collections: &invite.collections,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MemberUpdateBody<'a> {
    #[serde(rename = "type")]
    pub member_type: MemberType,
    pub external_id: Option<&'a str>,
    pub reset_password_enrolled: bool,
    pub permissions: Option<&'a MemberPermissions>,
    pub collections: &'a [CollectionAccess],
}

impl<'a> From<&'a Member> for MemberUpdateBody<'a> {
    fn from(member: &'a Member) -> Self {
        Self {
            member_type: member.member_type,
            external_id: member.external_id.as_deref(),
            reset_password_enrolled: member.reset_password_enrolled,
            permissions: member.permissions.as_ref(),
            collections: &member.collections,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GroupIdsBody<'a> {
    pub group_ids: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GroupCreateBody<'a> {
    pub name: &'a str,
    pub access_all: bool,
    pub external_id: &'a str,
    pub collections: &'a [CollectionAccess],
}

impl<'a> From<&'a NewGroup> for GroupCreateBody<'a> {
    fn from(group: &'a NewGroup) -> Self {
        Self {
            name: group.name.as_str(),
            access_all: false,
            external_id: group.external_id.as_str(),
            collections: &group.collections,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CollectionUpdateBody<'a> {
    pub external_id: Option<&'a str>,
    pub groups: &'a [CollectionAccess],
}

impl<'a> From<&'a Collection> for CollectionUpdateBody<'a> {
    fn from(collection: &'a Collection) -> Self {
        Self {
            external_id: collection.external_id.as_deref(),
            groups: &collection.groups,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EventPage {
    #[serde(default)]
    pub data: Vec<VaultEvent>,
    #[serde(default)]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VaultEvent {
    #[serde(default)]
    pub acting_user_id: Option<String>,
}
