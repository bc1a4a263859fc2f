//! Redis-backed invite store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use warden_application::InviteStore;
use warden_core::{AppError, AppResult};
use warden_domain::InviteRecord;

const INVITE_DATE_FIELD: &str = "invite_date";
const REINVITES_FIELD: &str = "reinvites";
const TOTAL_INVITES_FIELD: &str = "total_invites";

/// Redis implementation of the invite store port, one hash per username.
#[derive(Clone)]
pub struct RedisInviteStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisInviteStore {
    /// Creates a store with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, username: &str) -> String {
        format!("{}:{username}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

fn record_fields(record: &InviteRecord) -> Vec<(&'static str, String)> {
    vec![
        (
            INVITE_DATE_FIELD,
            record.invite_date.format("%Y-%m-%d").to_string(),
        ),
        (REINVITES_FIELD, record.reinvites.to_string()),
        (TOTAL_INVITES_FIELD, record.total_invites.to_string()),
    ]
}

fn record_from_fields(
    username: &str,
    fields: &HashMap<String, String>,
) -> AppResult<Option<InviteRecord>> {
    if fields.is_empty() {
        return Ok(None);
    }

    let field = |name: &str| {
        fields.get(name).ok_or_else(|| {
            AppError::Internal(format!("invite record for {username} is missing {name}"))
        })
    };
    let counter = |name: &str| {
        field(name)?.parse::<u32>().map_err(|error| {
            AppError::Internal(format!("invalid {name} in invite record for {username}: {error}"))
        })
    };

    let invite_date = NaiveDate::parse_from_str(field(INVITE_DATE_FIELD)?, "%Y-%m-%d").map_err(
        |error| AppError::Internal(format!("invalid invite date for {username}: {error}")),
    )?;

    Ok(Some(InviteRecord {
        username: username.to_owned(),
        invite_date,
        reinvites: counter(REINVITES_FIELD)?,
        total_invites: counter(TOTAL_INVITES_FIELD)?,
    }))
}

#[async_trait]
impl InviteStore for RedisInviteStore {
    async fn get(&self, username: &str) -> AppResult<Option<InviteRecord>> {
        let mut connection = self.connection().await?;
        let fields: HashMap<String, String> = connection
            .hgetall(self.key_for(username))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read invite record from redis: {error}"))
            })?;

        record_from_fields(username, &fields)
    }

    async fn put(&self, record: &InviteRecord) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let () = connection
            .hset_multiple(self.key_for(&record.username), &record_fields(record))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write invite record to redis: {error}"))
            })?;
        Ok(())
    }

    async fn delete(&self, username: &str) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let _: i64 = connection
            .del(self.key_for(username))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete invite record from redis: {error}"))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use warden_domain::InviteRecord;

    use super::{RedisInviteStore, record_fields, record_from_fields};

    fn record() -> InviteRecord {
        InviteRecord {
            username: "user.one".to_owned(),
            invite_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_else(|| unreachable!()),
            reinvites: 1,
            total_invites: 2,
        }
    }

    #[test]
    fn keys_are_prefixed_with_the_configured_namespace() {
        let client = redis::Client::open("redis://127.0.0.1/").unwrap_or_else(|_| unreachable!());
        let store = RedisInviteStore::new(client, "warden:invites");

        assert_eq!(store.key_for("user.one"), "warden:invites:user.one");
    }

    #[test]
    fn record_is_written_as_hash_fields() {
        assert_eq!(
            record_fields(&record()),
            vec![
                ("invite_date", "2024-03-01".to_owned()),
                ("reinvites", "1".to_owned()),
                ("total_invites", "2".to_owned()),
            ]
        );
    }

    #[test]
    fn hash_fields_are_read_back_into_a_record() {
        let fields: HashMap<String, String> = record_fields(&record())
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value))
            .collect();

        let result = record_from_fields("user.one", &fields);

        assert_eq!(result.unwrap_or_else(|_| unreachable!()), Some(record()));
    }

    #[test]
    fn missing_hash_means_no_record() {
        let result = record_from_fields("user.one", &HashMap::new());

        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn malformed_counter_is_an_error() {
        let fields = HashMap::from([
            ("invite_date".to_owned(), "2024-03-01".to_owned()),
            ("reinvites".to_owned(), "many".to_owned()),
            ("total_invites".to_owned(), "2".to_owned()),
        ]);

        assert!(record_from_fields("user.one", &fields).is_err());
    }
}
