//! Application services and ports.

#![forbid(unsafe_code)]

mod directory_ports;
mod event_dispatcher;
mod lifecycle_service;
mod maintenance_service;
mod reconciliation_service;
mod vault_ports;

#[cfg(test)]
mod test_support;

pub use directory_ports::TeamDirectory;
pub use event_dispatcher::{EventDispatcher, EventOutcome, ManagerEvent};
pub use lifecycle_service::LifecycleService;
pub use maintenance_service::{
    CollectionItems, InactiveMemberReport, MaintenanceService, MaintenanceSettings, MemberDetails,
};
pub use reconciliation_service::ReconciliationService;
pub use vault_ports::{
    BlobStore, InviteStore, MemberInvite, NewGroup, PendingMember, SessionCollection,
    VaultDirectory, VaultItem, VaultSession,
};
