use config::ConfigError;
use lettre::address::AddressError;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::ConnectOptions;
use std::path::PathBuf;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    /// Connection options for the server itself, without selecting a logical database. Used to
    /// create databases before migrating them.
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            // Try an encrypted connection, fallback to unencrypted if it fails
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        let mut options = self.without_db().database(&self.database_name);
        // Statements are noisy at `info`, demote them to `trace`.
        options.log_statements(tracing::log::LevelFilter::Trace);
        options
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub smtp_host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub smtp_port: u16,
    pub username: String,
    pub password: Secret<String>,
    /// Falls back to `username` when absent, which is what most relays expect.
    #[serde(default)]
    pub sender_email: Option<String>,
    pub attachment_path: PathBuf,
    pub attachment_filename: String,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<Mailbox, AddressError> {
        self.sender_email
            .as_deref()
            .unwrap_or(&self.username)
            .parse()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.username.clone(),
            self.password.expose_secret().to_owned(),
        )
    }
}

/// The possible runtime environment for our application.
#[derive(Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. Use either `local` or `production`."
            )),
        }
    }
}

/// Flat variables used by the existing deployment, mapped onto their hierarchical keys. They take
/// precedence over every other source.
const DEPLOYMENT_VARIABLES: [(&str, &str); 12] = [
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_USER", "database.username"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.database_name"),
    ("SMTP_HOST", "email_client.smtp_host"),
    ("SMTP_PORT", "email_client.smtp_port"),
    ("EMAIL_USER", "email_client.username"),
    ("EMAIL_PASSWORD", "email_client.password"),
    ("EMAIL_FROM", "email_client.sender_email"),
    ("PDF_PATH", "email_client.attachment_path"),
    ("PORT", "application.port"),
];

/// Layers, from lowest to highest priority:
/// * `configuration/base.yaml`;
/// * `configuration/{APP_ENVIRONMENT}.yaml`, `local` when unset;
/// * `APP_`-prefixed variables, e.g. `APP_APPLICATION__PORT=5001` sets `Settings.application.port`;
/// * the flat deployment variables listed in [`DEPLOYMENT_VARIABLES`].
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let mut builder = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        );

    for (variable, key) in DEPLOYMENT_VARIABLES {
        builder = builder.set_override_option(key, std::env::var(variable).ok())?;
    }

    builder.build()?.try_deserialize::<Settings>()
}
