//! Team naming rules shared by vault groups and collections.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use warden_core::{AppError, AppResult};

/// Longest group name the vault accepts.
pub const GROUP_NAME_MAX_LENGTH: usize = 100;

/// Returns the external identifier shared by a team's group and collection.
#[must_use]
pub fn external_id_for_team(team: &str) -> String {
    STANDARD.encode(team.as_bytes())
}

/// Checks that a team name can be used as a vault group name.
pub fn validate_group_name(name: &str) -> AppResult<()> {
    let length = name.chars().count();
    if length == 0 || length > GROUP_NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "group name '{name}' must be between 1 and {GROUP_NAME_MAX_LENGTH} characters, got {length}"
        )));
    }

    Ok(())
}
