//! Pure rules deciding a member's group list.

use crate::{Group, MemberType};

/// Ids of groups whose name is not a directory team name.
#[must_use]
pub fn custom_group_ids(groups: &[Group], team_names: &[String]) -> Vec<String> {
    groups
        .iter()
        .filter(|group| !team_names.contains(&group.name))
        .map(|group| group.id.clone())
        .collect()
}

/// Group list a member should end up with.
///
/// Managed ids come first in their given order, followed by the member's
/// existing custom groups in their existing order.
#[must_use]
pub fn final_group_ids(managed: &[String], existing: &[String], custom: &[String]) -> Vec<String> {
    let mut ids: Vec<String> = managed.to_vec();
    for group_id in existing {
        if custom.contains(group_id) && !ids.contains(group_id) {
            ids.push(group_id.clone());
        }
    }
    ids
}

/// Returns whether the member should receive the support administrator role.
#[must_use]
pub fn qualifies_for_support_permissions(
    teams: &[String],
    support_team: &str,
    member_type: MemberType,
) -> bool {
    teams.iter().any(|team| team == support_team)
        && matches!(member_type, MemberType::User | MemberType::Custom)
}
