//! Domain entities and reconciliation rules.

#![forbid(unsafe_code)]

mod directory;
mod invite;
mod membership;
mod resolution;
mod team;
mod vault;

pub use directory::{DirectoryRole, DirectoryUser};
pub use invite::{
    INVITE_VALID_DURATION_DAYS, InviteRecord, MAX_REINVITES, MAX_TOTAL_INVITES, ReinviteDecision,
};
pub use membership::{custom_group_ids, final_group_ids, qualifies_for_support_permissions};
pub use resolution::{Resolution, TeamIndex};
pub use team::{GROUP_NAME_MAX_LENGTH, external_id_for_team, validate_group_name};
pub use vault::{
    Collection, CollectionAccess, CollectionRef, Group, Member, MemberPermissions, MemberStatus,
    MemberType,
};
