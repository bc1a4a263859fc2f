use async_trait::async_trait;
use warden_core::AppResult;
use warden_domain::InviteRecord;

/// Port for invitation history keyed by username.
#[async_trait]
pub trait InviteStore: Send + Sync {
    /// Reads the record for a username.
    async fn get(&self, username: &str) -> AppResult<Option<InviteRecord>>;

    /// Creates or replaces a record.
    async fn put(&self, record: &InviteRecord) -> AppResult<()>;

    /// Deletes the record for a username, if any.
    async fn delete(&self, username: &str) -> AppResult<()>;
}

/// Port for write-only backup storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores bytes under a key.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> AppResult<()>;
}
