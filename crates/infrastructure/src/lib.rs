//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod access_token;
mod cli_vault_session;
mod filesystem_blob_store;
mod http_support;
mod http_team_directory;
mod http_vault_directory;
mod log_redaction;
mod redis_invite_store;

pub use cli_vault_session::{CliVaultSession, VaultCliConfig};
pub use filesystem_blob_store::FilesystemBlobStore;
pub use http_team_directory::{HttpTeamDirectory, TeamDirectoryConfig};
pub use http_vault_directory::{HttpVaultDirectory, VaultApiConfig};
pub use log_redaction::{
    DEFAULT_REDACTION_PATTERNS, LogRedactor, REDACTED, RedactingMakeWriter, RedactingWriter,
};
pub use redis_invite_store::RedisInviteStore;
