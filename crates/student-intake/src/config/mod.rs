use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::registration::{
    AdminAccess, CodeIssuer, CodeStrategy, CollisionPolicy, MediaLocator, RegistrationSettings,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub registration: RegistrationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::parse(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        )?;

        let registration = RegistrationConfig::from_env()?;
        if environment == AppEnvironment::Production && registration.admin_token.is_none() {
            return Err(ConfigError::MissingAdminToken);
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            registration,
        })
    }

    /// Public base URL used for absolute media links; defaults to the bound address.
    pub fn public_url(&self) -> String {
        self.registration
            .public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.server.host, self.server.port))
    }

    pub fn registration_settings(&self) -> RegistrationSettings {
        RegistrationSettings {
            codes: CodeIssuer::new(
                self.registration.code_strategy,
                self.registration.collision_policy,
            ),
            media: MediaLocator::new(self.public_url(), self.registration.media_prefix.clone()),
        }
    }

    pub fn admin_access(&self) -> AdminAccess {
        AdminAccess::from_token(self.registration.admin_token.clone())
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing output controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
    }
}

/// Intake-specific settings.
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    pub public_url: Option<String>,
    pub media_prefix: String,
    pub admin_token: Option<String>,
    pub data_file: Option<PathBuf>,
    pub code_strategy: CodeStrategy,
    pub collision_policy: CollisionPolicy,
}

impl RegistrationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let code_strategy = match env::var("APP_CODE_STRATEGY")
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "" | "matric" => CodeStrategy::MatricDigits,
            "random" => CodeStrategy::Random,
            other => return Err(ConfigError::InvalidCodeStrategy(other.to_string())),
        };

        let collision_policy = match env::var("APP_CODE_COLLISION")
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "" | "retry" => CollisionPolicy::Retry,
            "single-pass" | "single_pass" => CollisionPolicy::SinglePass,
            other => return Err(ConfigError::InvalidCollisionPolicy(other.to_string())),
        };

        Ok(Self {
            public_url: non_empty_var("APP_PUBLIC_URL"),
            media_prefix: non_empty_var("APP_MEDIA_PREFIX").unwrap_or_else(|| "/media/".to_string()),
            admin_token: non_empty_var("APP_ADMIN_TOKEN"),
            data_file: non_empty_var("APP_DATA_FILE").map(PathBuf::from),
            code_strategy,
            collision_policy,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidCodeStrategy(String),
    InvalidCollisionPolicy(String),
    MissingAdminToken,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be compact or json (found '{value}')")
            }
            ConfigError::InvalidCodeStrategy(value) => {
                write!(f, "APP_CODE_STRATEGY must be matric or random (found '{value}')")
            }
            ConfigError::InvalidCollisionPolicy(value) => write!(
                f,
                "APP_CODE_COLLISION must be retry or single-pass (found '{value}')"
            ),
            ConfigError::MissingAdminToken => {
                write!(f, "APP_ADMIN_TOKEN is required when APP_ENV is production")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
