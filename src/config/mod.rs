//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_REDIS_OP_TIMEOUT_MS: u64 = 500;
const DEFAULT_LOCAL_STALENESS_SECS: u64 = 300;
const DEFAULT_SESSION_CAPACITY: usize = 512;
const DEFAULT_FLIGHT_WAIT_SECS: u64 = 15;
const DEFAULT_PROFILE_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina profile-page server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the Vetrina HTTP service.
    Serve(Box<ServeArgs>),
    /// Apply pending database migrations and exit.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the Redis URL for the distributed cache tier.
    #[arg(long = "cache-redis-url", value_name = "URL")]
    pub cache_redis_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct MigrateArgs {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// When absent, the service runs on the local tier alone.
    pub redis_url: Option<String>,
    pub redis_op_timeout: Duration,
    pub local_staleness: Duration,
    pub session_capacity: usize,
    pub flight_wait_cap: Duration,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub profile_lookup_cap: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Parse CLI arguments and load settings in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder =
        Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Migrate(args)) => raw.apply_database_override(args.database_url.as_deref()),
        None => {}
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
    auth: RawAuthSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    redis_url: Option<String>,
    redis_op_timeout_ms: Option<u64>,
    local_staleness_seconds: Option<u64>,
    session_capacity: Option<usize>,
    flight_wait_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuthSettings {
    profile_lookup_timeout_seconds: Option<u64>,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(url) = overrides.cache_redis_url.as_ref() {
            self.cache.redis_url = Some(url.clone());
        }
    }

    fn apply_database_override(&mut self, url: Option<&str>) {
        if let Some(url) = url {
            self.database.url = Some(url.to_string());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            cache,
            auth,
        } = raw;

        let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = server.port.unwrap_or(DEFAULT_PORT);
        let addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|err| LoadError::invalid("server.host", err.to_string()))?;

        let level = match logging.level {
            Some(raw_level) => LevelFilter::from_str(&raw_level)
                .map_err(|err| LoadError::invalid("logging.level", err.to_string()))?,
            None => LevelFilter::INFO,
        };
        let format = if logging.json.unwrap_or(false) {
            LogFormat::Json
        } else {
            LogFormat::Compact
        };

        let max_connections = database.max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let max_connections = NonZeroU32::new(max_connections).ok_or_else(|| {
            LoadError::invalid("database.max_connections", "must be greater than zero")
        })?;

        let session_capacity = cache.session_capacity.unwrap_or(DEFAULT_SESSION_CAPACITY);
        if session_capacity == 0 {
            return Err(LoadError::invalid(
                "cache.session_capacity",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            server: ServerSettings { addr },
            logging: LoggingSettings { level, format },
            database: DatabaseSettings {
                url: database.url,
                max_connections,
            },
            cache: CacheSettings {
                redis_url: cache.redis_url,
                redis_op_timeout: Duration::from_millis(
                    cache.redis_op_timeout_ms.unwrap_or(DEFAULT_REDIS_OP_TIMEOUT_MS),
                ),
                local_staleness: Duration::from_secs(
                    cache
                        .local_staleness_seconds
                        .unwrap_or(DEFAULT_LOCAL_STALENESS_SECS),
                ),
                session_capacity,
                flight_wait_cap: Duration::from_secs(
                    cache.flight_wait_seconds.unwrap_or(DEFAULT_FLIGHT_WAIT_SECS),
                ),
            },
            auth: AuthSettings {
                profile_lookup_cap: Duration::from_secs(
                    auth.profile_lookup_timeout_seconds
                        .unwrap_or(DEFAULT_PROFILE_LOOKUP_TIMEOUT_SECS),
                ),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_a_complete_configuration() {
        let settings = Settings::from_raw(RawSettings::default()).expect("defaults are valid");

        assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
        assert!(settings.database.url.is_none());
        assert!(settings.cache.redis_url.is_none());
        assert_eq!(settings.cache.flight_wait_cap, Duration::from_secs(15));
        assert_eq!(settings.cache.local_staleness, Duration::from_secs(300));
        assert_eq!(settings.auth.profile_lookup_cap, Duration::from_secs(5));
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let raw = RawSettings {
            logging: RawLoggingSettings {
                level: Some("verbose".to_string()),
                json: None,
            },
            ..RawSettings::default()
        };
        assert!(matches!(
            Settings::from_raw(raw),
            Err(LoadError::Invalid { key: "logging.level", .. })
        ));
    }

    #[test]
    fn zero_connection_pool_is_rejected() {
        let raw = RawSettings {
            database: RawDatabaseSettings {
                url: None,
                max_connections: Some(0),
            },
            ..RawSettings::default()
        };
        assert!(Settings::from_raw(raw).is_err());
    }

    #[test]
    fn serve_overrides_take_precedence() {
        let mut raw = RawSettings::default();
        raw.apply_serve_overrides(&ServeOverrides {
            server_host: Some("0.0.0.0".to_string()),
            server_port: Some(9000),
            log_level: Some("debug".to_string()),
            log_json: Some(true),
            database_url: Some("postgres://db/vetrina".to_string()),
            cache_redis_url: Some("redis://cache:6379".to_string()),
        });

        let settings = Settings::from_raw(raw).expect("valid overrides");
        assert_eq!(settings.server.addr.port(), 9000);
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
        assert!(matches!(settings.logging.format, LogFormat::Json));
        assert_eq!(settings.database.url.as_deref(), Some("postgres://db/vetrina"));
        assert_eq!(settings.cache.redis_url.as_deref(), Some("redis://cache:6379"));
    }
}
