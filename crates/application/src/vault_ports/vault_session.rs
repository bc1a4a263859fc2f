use async_trait::async_trait;
use warden_core::AppResult;

/// Collection as listed by the vault client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCollection {
    /// Collection identifier.
    pub id: String,
    /// Decrypted collection name.
    pub name: String,
}

/// Vault item summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultItem {
    /// Item identifier.
    pub id: String,
    /// Decrypted item name.
    pub name: String,
}

/// Member that accepted an invitation and awaits confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMember {
    /// Member identifier.
    pub id: String,
    /// Email address.
    pub email: String,
}

/// Port for an authenticated vault client session.
///
/// Implementations log in lazily on first use; [`VaultSession::logout`]
/// ends the session and the next call logs in again.
#[async_trait]
pub trait VaultSession: Send + Sync {
    /// Exports the organisation vault as encrypted JSON.
    async fn export(&self) -> AppResult<Vec<u8>>;

    /// Creates one collection per team, named after the team.
    async fn create_collections(&self, teams: &[String]) -> AppResult<()>;

    /// Lists organisation collections with decrypted names.
    async fn list_collections(&self) -> AppResult<Vec<SessionCollection>>;

    /// Lists the items of a collection.
    async fn list_items(&self, collection_id: &str) -> AppResult<Vec<VaultItem>>;

    /// Lists accepted members awaiting confirmation.
    async fn list_unconfirmed_members(&self) -> AppResult<Vec<PendingMember>>;

    /// Confirms an accepted member.
    async fn confirm_member(&self, member_id: &str) -> AppResult<()>;

    /// Ends the session.
    async fn logout(&self) -> AppResult<()>;
}
