use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use warden_application::MaintenanceSettings;
use warden_core::AppError;
use warden_infrastructure::{
    LogRedactor, RedactingMakeWriter, TeamDirectoryConfig, VaultApiConfig, VaultCliConfig,
};

#[derive(Debug, Clone)]
pub struct HandlerConfig {
    pub vault_api: VaultApiConfig,
    pub vault_cli: VaultCliConfig,
    pub team_directory: TeamDirectoryConfig,
    pub redis_url: String,
    pub invite_key_prefix: String,
    pub export_directory: PathBuf,
    pub maintenance: MaintenanceSettings,
    pub handler_host: String,
    pub handler_port: u16,
    pub event_shared_secret: Option<String>,
    pub log_redaction_patterns: Vec<String>,
}

impl HandlerConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let env = EnvReader { lookup };

        let vault_api = VaultApiConfig {
            api_url: env.required("VAULT_API_URL")?,
            identity_url: env.required("VAULT_IDENTITY_URL")?,
            client_id: env.required("VAULT_API_CLIENT_ID")?,
            client_secret: env.required("VAULT_API_CLIENT_SECRET")?,
            events_retry_budget: Duration::from_secs(
                env.parse_or("EVENTS_RETRY_BUDGET_SECONDS", 600_u64)?,
            ),
        };

        let cli_timeout_seconds = env.parse_or("VAULT_CLI_TIMEOUT_SECONDS", 20_u64)?;
        if cli_timeout_seconds == 0 {
            return Err(AppError::Validation(
                "VAULT_CLI_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let vault_cli = VaultCliConfig {
            cli_path: PathBuf::from(
                env.optional("VAULT_CLI_PATH")
                    .unwrap_or_else(|| "bw".to_owned()),
            ),
            organisation_id: env.required("VAULT_ORGANISATION_ID")?,
            client_id: env.required("VAULT_CLI_CLIENT_ID")?,
            client_secret: env.required("VAULT_CLI_CLIENT_SECRET")?,
            password: env.required("VAULT_CLI_PASSWORD")?,
            export_password: env.required("VAULT_EXPORT_PASSWORD")?,
            timeout: Duration::from_secs(cli_timeout_seconds),
            scratch_directory: env::temp_dir(),
        };

        let team_directory = TeamDirectoryConfig {
            api_url: env.required("DIRECTORY_API_URL")?,
            auth_url: env.required("DIRECTORY_AUTH_URL")?,
            client_id: env.required("DIRECTORY_CLIENT_ID")?,
            client_secret: env.required("DIRECTORY_CLIENT_SECRET")?,
        };

        let maintenance = MaintenanceSettings {
            protected_collection_name: env.required("PROTECTED_COLLECTION_NAME")?,
            protected_group_name: env.required("PROTECTED_GROUP_NAME")?,
            support_admin_team: env.required("SUPPORT_ADMIN_TEAM")?,
            dry_run: env.parse_bool_or("OFFBOARD_DRY_RUN", true)?,
        };

        let log_redaction_patterns = match env.optional("LOG_REDACTION_PATTERNS") {
            Some(value) => serde_json::from_str::<Vec<String>>(&value).map_err(|error| {
                AppError::Validation(format!(
                    "LOG_REDACTION_PATTERNS must be a JSON array of strings: {error}"
                ))
            })?,
            None => Vec::new(),
        };

        Ok(Self {
            vault_api,
            vault_cli,
            team_directory,
            redis_url: env.required("REDIS_URL")?,
            invite_key_prefix: env
                .optional("INVITE_KEY_PREFIX")
                .unwrap_or_else(|| "warden:invites".to_owned()),
            export_directory: PathBuf::from(
                env.optional("EXPORT_DIRECTORY")
                    .unwrap_or_else(|| "exports".to_owned()),
            ),
            maintenance,
            handler_host: env
                .optional("HANDLER_HOST")
                .unwrap_or_else(|| "127.0.0.1".to_owned()),
            handler_port: env.parse_or("HANDLER_PORT", 3002_u16)?,
            event_shared_secret: env.optional("EVENT_SHARED_SECRET"),
            log_redaction_patterns,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.handler_host).map_err(|error| {
            AppError::Validation(format!(
                "invalid HANDLER_HOST '{}': {error}",
                self.handler_host
            ))
        })?;
        Ok(SocketAddr::from((host, self.handler_port)))
    }

    pub fn required_shared_secret(&self) -> Result<String, AppError> {
        let secret = self.event_shared_secret.clone().ok_or_else(|| {
            AppError::Validation("EVENT_SHARED_SECRET is required to serve events".to_owned())
        })?;
        if secret.len() < 32 {
            return Err(AppError::Validation(
                "EVENT_SHARED_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        Ok(secret)
    }
}

pub fn init_tracing(redactor: LogRedactor) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(RedactingMakeWriter::new(std::io::stderr, redactor))
        .compact()
        .init();
}

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String, AppError> {
        self.optional(name)
            .ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }

    fn parse_or<T>(&self, name: &str, default: T) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(name)
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
            })
            .transpose()
            .map(|value| value.unwrap_or(default))
    }

    fn parse_bool_or(&self, name: &str, default: bool) -> Result<bool, AppError> {
        match self.optional(name) {
            None => Ok(default),
            Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
            Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
            Some(value) => Err(AppError::Validation(format!(
                "{name} must be 'true' or 'false', got '{value}'"
            ))),
        }
    }
}
