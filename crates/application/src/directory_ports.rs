use async_trait::async_trait;
use warden_core::AppResult;
use warden_domain::DirectoryRole;

/// Port for the team directory service.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// Returns the names of the teams the user belongs to.
    ///
    /// Unknown users yield an empty list.
    async fn get_user_teams(&self, username: &str) -> AppResult<Vec<String>>;

    /// Returns every team name known to the directory.
    async fn get_teams(&self) -> AppResult<Vec<String>>;

    /// Returns the user's role in a team, or `None` when they are not a member.
    async fn get_user_role_by_team(
        &self,
        username: &str,
        team: &str,
    ) -> AppResult<Option<DirectoryRole>>;

    /// Returns usernames of members able to manage any of the given teams, first seen first.
    async fn get_team_admin_users(&self, teams: &[String]) -> AppResult<Vec<String>>;
}
