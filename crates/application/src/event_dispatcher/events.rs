use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use warden_core::{AppError, AppResult, NonEmptyString};

const EMAIL_PATTERN: &str = "^(.+)@(.+)$";

/// Validated event accepted by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    /// Invite and provision a directory user.
    NewUser {
        /// Directory username.
        username: String,
        /// Work email address.
        email: String,
    },
    /// Remove a directory user from the organisation.
    RemoveUser {
        /// Directory username.
        username: String,
    },
    /// Reconcile one user's groups and collections.
    UpdateUserGroups {
        /// Directory username.
        username: String,
        /// Work email address.
        email: String,
    },
    /// Reconcile every member.
    AssociateUsersToGroups,
    /// Re-send or withdraw expired invitations.
    ReinviteUsers,
    /// Confirm accepted members from allowed email domains.
    ConfirmUser {
        /// Email domains allowed to join.
        allowed_domains: Vec<String>,
    },
    /// Back up the vault.
    ExportVault,
    /// Remove members without recent activity.
    OffboardInactiveUsers {
        /// Days without activity.
        inactivity_duration: u32,
    },
    /// List the items of a named collection.
    ListCollectionItems {
        /// Collection name.
        collection_name: String,
    },
    /// Report a member's details.
    UserDetails {
        /// Directory username.
        username: String,
    },
}

#[derive(Deserialize)]
struct UsernamePayload {
    username: String,
}

#[derive(Deserialize)]
struct UserPayload {
    username: String,
    email: String,
}

#[derive(Deserialize)]
struct ConfirmPayload {
    allowed_domains: Vec<String>,
}

#[derive(Deserialize)]
struct InactivityPayload {
    inactivity_duration: i64,
}

#[derive(Deserialize)]
struct CollectionPayload {
    collection_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryPayload {
    query_string_parameters: UsernamePayload,
}

impl ManagerEvent {
    /// Validates the event fields required by `event_name`.
    ///
    /// Returns `None` for event names no operation handles.
    pub fn parse(event_name: &str, event: &Value) -> AppResult<Option<Self>> {
        let parsed = match event_name {
            "new_user" => {
                let payload: UserPayload = payload(event_name, event)?;
                Self::NewUser {
                    username: required(event_name, "username", payload.username)?,
                    email: email(event_name, payload.email)?,
                }
            }
            "remove_user" => {
                let payload: UsernamePayload = payload(event_name, event)?;
                Self::RemoveUser {
                    username: required(event_name, "username", payload.username)?,
                }
            }
            "update_user_groups" => {
                let payload: UserPayload = payload(event_name, event)?;
                Self::UpdateUserGroups {
                    username: required(event_name, "username", payload.username)?,
                    email: email(event_name, payload.email)?,
                }
            }
            "associate_users_to_groups" => Self::AssociateUsersToGroups,
            "reinvite_users" => Self::ReinviteUsers,
            "confirm_user" => {
                let payload: ConfirmPayload = payload(event_name, event)?;
                Self::ConfirmUser {
                    allowed_domains: payload.allowed_domains,
                }
            }
            "export_vault" => Self::ExportVault,
            "offboard_inactive_users" => {
                let payload: InactivityPayload = payload(event_name, event)?;
                let inactivity_duration = u32::try_from(payload.inactivity_duration)
                    .ok()
                    .filter(|days| *days >= 1)
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "invalid {event_name} event: inactivity_duration must be a positive number of days, got {}",
                            payload.inactivity_duration
                        ))
                    })?;
                Self::OffboardInactiveUsers {
                    inactivity_duration,
                }
            }
            "list_collection_items" => {
                let payload: CollectionPayload = payload(event_name, event)?;
                Self::ListCollectionItems {
                    collection_name: required(
                        event_name,
                        "collection_name",
                        payload.collection_name,
                    )?,
                }
            }
            "users" | "check_user" => {
                let payload: QueryPayload = payload(event_name, event)?;
                Self::UserDetails {
                    username: required(
                        event_name,
                        "username",
                        payload.query_string_parameters.username,
                    )?,
                }
            }
            _ => return Ok(None),
        };

        Ok(Some(parsed))
    }
}

/// Returns the event's name, falling back to the last segment of its request path.
pub(super) fn event_name(event: &Value) -> AppResult<String> {
    if let Some(event_name) = event.get("event_name").and_then(Value::as_str) {
        return Ok(event_name.to_owned());
    }

    let segment = event
        .get("path")
        .and_then(Value::as_str)
        .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| {
            AppError::Validation("event has neither an event_name nor a path".to_owned())
        })?;

    Ok(segment.replace('-', "_"))
}

fn payload<T: DeserializeOwned>(event_name: &str, event: &Value) -> AppResult<T> {
    T::deserialize(event)
        .map_err(|error| AppError::Validation(format!("invalid {event_name} event: {error}")))
}

fn required(event_name: &str, field: &str, value: String) -> AppResult<String> {
    NonEmptyString::new(value)
        .map(String::from)
        .map_err(|error| AppError::Validation(format!("invalid {event_name} event: {field} {error}")))
}

fn email(event_name: &str, value: String) -> AppResult<String> {
    let pattern = Regex::new(EMAIL_PATTERN)
        .map_err(|error| AppError::Internal(format!("invalid email pattern: {error}")))?;
    if !pattern.is_match(value.as_str()) {
        return Err(AppError::Validation(format!(
            "invalid {event_name} event: '{value}' is not an email address"
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ManagerEvent, event_name};

    #[test]
    fn event_name_falls_back_to_path_segment() {
        let name = event_name(&json!({ "path": "/bitwarden-manager/check-user/" }));
        assert!(matches!(name.as_deref(), Ok("check_user")));
    }

    #[test]
    fn event_without_name_or_path_is_rejected() {
        assert!(event_name(&json!({ "username": "user.one" })).is_err());
    }

    #[test]
    fn new_user_requires_email_shape() {
        let result = ManagerEvent::parse(
            "new_user",
            &json!({ "username": "user.one", "email": "not-an-email" }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn inactivity_duration_must_be_positive_integer() {
        for value in [json!(0), json!(-3), json!(2.5), json!("7")] {
            let result = ManagerEvent::parse(
                "offboard_inactive_users",
                &json!({ "inactivity_duration": value }),
            );
            assert!(result.is_err());
        }

        let result = ManagerEvent::parse(
            "offboard_inactive_users",
            &json!({ "inactivity_duration": 90 }),
        );
        assert_eq!(
            result.unwrap_or_else(|_| unreachable!()),
            Some(ManagerEvent::OffboardInactiveUsers {
                inactivity_duration: 90
            })
        );
    }

    #[test]
    fn confirm_user_requires_domain_list() {
        let result = ManagerEvent::parse(
            "confirm_user",
            &json!({ "allowed_domains": "example.com" }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn user_details_read_query_parameters() {
        let result = ManagerEvent::parse(
            "users",
            &json!({ "queryStringParameters": { "username": "user.one" } }),
        );
        assert_eq!(
            result.unwrap_or_else(|_| unreachable!()),
            Some(ManagerEvent::UserDetails {
                username: "user.one".to_owned()
            })
        );
    }

    #[test]
    fn unknown_event_is_not_an_error() {
        let result = ManagerEvent::parse("rotate_keys", &json!({}));
        assert!(matches!(result, Ok(None)));
    }
}
