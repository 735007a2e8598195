use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::analysis::ReportSchema;

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
    pub report_schema: ReportSchema,
    pub llm: LlmConfig,
    pub notification: NotificationConfig,
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

        let report_schema = match optional_var("REPORT_SCHEMA") {
            Some(raw) => raw
                .parse::<ReportSchema>()
                .map_err(|_| ConfigError::InvalidReportSchema { value: raw })?,
            None => ReportSchema::default(),
        };

        let llm_defaults = LlmConfig::default();
        let llm = LlmConfig {
            api_key: optional_var("ANTHROPIC_API_KEY"),
            base_url: optional_var("ANTHROPIC_BASE_URL").unwrap_or(llm_defaults.base_url),
            model: optional_var("ANTHROPIC_MODEL").unwrap_or(llm_defaults.model),
            max_tokens: parsed_var("ANTHROPIC_MAX_TOKENS")?.unwrap_or(llm_defaults.max_tokens),
            temperature: parsed_var("ANTHROPIC_TEMPERATURE")?
                .unwrap_or(llm_defaults.temperature),
        };

        let notify_defaults = NotificationConfig::default();
        let notification = NotificationConfig {
            api_key: optional_var("RESEND_API_KEY"),
            base_url: optional_var("RESEND_BASE_URL").unwrap_or(notify_defaults.base_url),
            admin_email: optional_var("ADMIN_EMAIL"),
            from_address: optional_var("NOTIFY_FROM").unwrap_or(notify_defaults.from_address),
            result_base_url: optional_var("RESULT_BASE_URL")
                .unwrap_or(notify_defaults.result_base_url),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            report_schema,
            llm,
            notification,
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    optional_var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber { name, value: raw })
        })
        .transpose()
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Generation parameters for the analysis model.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 8000,
            temperature: 0.7,
        }
    }
}

/// Admin e-mail notification settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub admin_email: Option<String>,
    pub from_address: String,
    pub result_base_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.resend.com".to_string(),
            admin_email: None,
            from_address: "delivered@resend.dev".to_string(),
            result_base_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    InvalidReportSchema { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be numeric, got '{value}'")
            }
            ConfigError::InvalidReportSchema { value } => {
                write!(f, "REPORT_SCHEMA must be 'v1' or 'v2', got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidReportSchema { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "REPORT_SCHEMA",
            "ANTHROPIC_API_KEY",
            "ANTHROPIC_BASE_URL",
            "ANTHROPIC_MODEL",
            "ANTHROPIC_MAX_TOKENS",
            "ANTHROPIC_TEMPERATURE",
            "RESEND_API_KEY",
            "RESEND_BASE_URL",
            "ADMIN_EMAIL",
            "NOTIFY_FROM",
            "RESULT_BASE_URL",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.report_schema, ReportSchema::V2);
        assert_eq!(config.llm.max_tokens, 8000);
        assert!(config.notification.admin_email.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn reads_model_and_schema_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REPORT_SCHEMA", "v1");
        env::set_var("ANTHROPIC_MAX_TOKENS", "4000");
        env::set_var("ANTHROPIC_TEMPERATURE", "0.2");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.report_schema, ReportSchema::V1);
        assert_eq!(config.llm.max_tokens, 4000);
        assert!((config.llm.temperature - 0.2).abs() < f64::EPSILON);
        reset_env();
    }

    #[test]
    fn rejects_invalid_numbers_and_schema() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ANTHROPIC_MAX_TOKENS", "lots");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                name: "ANTHROPIC_MAX_TOKENS",
                ..
            })
        ));

        reset_env();
        env::set_var("REPORT_SCHEMA", "v9");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidReportSchema { .. })
        ));
        reset_env();
    }
}
