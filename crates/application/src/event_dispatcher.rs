//! Routes one incoming event to the operation that handles it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use warden_core::AppResult;

use crate::vault_ports::VaultSession;
use crate::{LifecycleService, MaintenanceService, ReconciliationService};

mod events;

pub use events::ManagerEvent;

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    /// The operation ran to completion.
    Completed {
        /// Handled event name.
        event_name: String,
    },
    /// No operation handles this event name.
    Ignored {
        /// Received event name.
        event_name: String,
    },
    /// The operation produced a response for the caller.
    Response {
        /// HTTP-style status code.
        status: u16,
        /// Response body.
        body: Value,
    },
}

/// Validates events and dispatches them to the application services.
#[derive(Clone)]
pub struct EventDispatcher {
    reconciliation: ReconciliationService,
    lifecycle: LifecycleService,
    maintenance: MaintenanceService,
    vault_session: Arc<dyn VaultSession>,
}

impl EventDispatcher {
    /// Creates a new dispatcher.
    #[must_use]
    pub fn new(
        reconciliation: ReconciliationService,
        lifecycle: LifecycleService,
        maintenance: MaintenanceService,
        vault_session: Arc<dyn VaultSession>,
    ) -> Self {
        Self {
            reconciliation,
            lifecycle,
            maintenance,
            vault_session,
        }
    }

    /// Handles one event now.
    pub async fn dispatch(&self, event: &Value) -> AppResult<EventOutcome> {
        self.dispatch_at(event, Utc::now()).await
    }

    /// Handles one event as of `now`, then ends the vault session.
    pub async fn dispatch_at(&self, event: &Value, now: DateTime<Utc>) -> AppResult<EventOutcome> {
        let outcome = self.route(event, now).await;

        if let Err(error) = self.vault_session.logout().await {
            warn!(error = %error, "vault session logout failed");
        }

        outcome
    }

    async fn route(&self, event: &Value, now: DateTime<Utc>) -> AppResult<EventOutcome> {
        let event_name = events::event_name(event)?;
        let Some(parsed) = ManagerEvent::parse(event_name.as_str(), event)? else {
            info!(event_name = %event_name, "ignoring unknown event");
            return Ok(EventOutcome::Ignored { event_name });
        };
        info!(event_name = %event_name, "handling event");

        match parsed {
            ManagerEvent::NewUser { username, email } => {
                self.lifecycle
                    .onboard(username.as_str(), email.as_str(), now.date_naive())
                    .await?;
            }
            ManagerEvent::RemoveUser { username } => {
                self.lifecycle.offboard(username.as_str()).await?;
            }
            ManagerEvent::UpdateUserGroups { username, email } => {
                self.reconciliation
                    .update_user_groups(username.as_str(), email.as_str())
                    .await?;
            }
            ManagerEvent::AssociateUsersToGroups => {
                self.reconciliation.reconcile_all_members().await?;
            }
            ManagerEvent::ReinviteUsers => {
                self.lifecycle
                    .reinvite_pending_members(now.date_naive())
                    .await?;
            }
            ManagerEvent::ConfirmUser { allowed_domains } => {
                self.lifecycle.confirm_members(&allowed_domains).await?;
            }
            ManagerEvent::ExportVault => {
                self.maintenance.export_vault(now).await?;
            }
            ManagerEvent::OffboardInactiveUsers {
                inactivity_duration,
            } => {
                let report = self
                    .maintenance
                    .offboard_inactive_members(inactivity_duration, now)
                    .await?;
                info!(
                    inactive = report.inactive_members.len(),
                    removed = report.removed_members.len(),
                    dry_run = report.dry_run,
                    "inactive member sweep finished"
                );
            }
            ManagerEvent::ListCollectionItems { collection_name } => {
                return Ok(
                    match self
                        .maintenance
                        .list_collection_items(collection_name.as_str())
                        .await?
                    {
                        Some(items) => EventOutcome::Response {
                            status: 200,
                            body: json!(items),
                        },
                        None => EventOutcome::Response {
                            status: 404,
                            body: json!({
                                "ERROR": format!("Collection {collection_name} not found")
                            }),
                        },
                    },
                );
            }
            ManagerEvent::UserDetails { username } => {
                return Ok(
                    match self.maintenance.user_details(username.as_str()).await? {
                        Some(details) => EventOutcome::Response {
                            status: 200,
                            body: json!(details),
                        },
                        None => EventOutcome::Response {
                            status: 404,
                            body: json!({ "ERROR": format!("Username {username} not found") }),
                        },
                    },
                );
            }
        }

        Ok(EventOutcome::Completed { event_name })
    }
}
