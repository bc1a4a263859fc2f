mod storage;
mod vault_directory;
mod vault_session;

pub use storage::{BlobStore, InviteStore};
pub use vault_directory::{MemberInvite, NewGroup, VaultDirectory};
pub use vault_session::{PendingMember, SessionCollection, VaultItem, VaultSession};
