//! Team directory users and their roles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Team membership role reported by the team directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryRole {
    /// Regular team member.
    User,
    /// Platform-wide administrator without collection management rights.
    SuperAdmin,
    /// Administrator of a single team.
    TeamAdmin,
    /// Administrator of every team.
    AllTeamAdmin,
}

impl DirectoryRole {
    /// Parses a directory role string. Unknown roles are treated as [`Self::User`].
    #[must_use]
    pub fn from_directory(value: &str) -> Self {
        match value {
            "super_admin" => Self::SuperAdmin,
            "team_admin" => Self::TeamAdmin,
            "all_team_admin" => Self::AllTeamAdmin,
            _ => Self::User,
        }
    }

    /// Returns the directory role string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::SuperAdmin => "super_admin",
            Self::TeamAdmin => "team_admin",
            Self::AllTeamAdmin => "all_team_admin",
        }
    }

    /// Returns whether this role may manage the team's collection.
    #[must_use]
    pub fn can_manage_team_collection(&self) -> bool {
        match self {
            Self::User | Self::SuperAdmin => false,
            Self::TeamAdmin | Self::AllTeamAdmin => true,
        }
    }
}

/// Directory user with the roles held in each of their teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    /// Directory username, also the vault member external identifier.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Role per team name.
    pub roles_by_team: BTreeMap<String, DirectoryRole>,
}

impl DirectoryUser {
    /// Returns whether the user can manage the given team's collection.
    #[must_use]
    pub fn can_manage_team_collection(&self, team: &str) -> bool {
        self.roles_by_team
            .get(team)
            .is_some_and(DirectoryRole::can_manage_team_collection)
    }
}
