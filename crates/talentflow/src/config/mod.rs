use std::env;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::assessment::DEFAULT_GRACE_MINUTES;

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
    pub workflow: WorkflowConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            workflow: WorkflowConfig::from_env()?,
        })
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the hiring workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Minutes added on top of a test's duration when sizing an assignment window.
    pub test_grace_minutes: u32,
    /// Passing percentage applied to tests created without one.
    pub default_passing_marks: u8,
    /// Upper bound on mark writes in flight during a bulk save.
    pub bulk_mark_concurrency: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            test_grace_minutes: DEFAULT_GRACE_MINUTES,
            default_passing_marks: 60,
            bulk_mark_concurrency: 8,
        }
    }
}

impl WorkflowConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let test_grace_minutes = match env::var("ATS_TEST_GRACE_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidGraceMinutes)?,
            Err(_) => defaults.test_grace_minutes,
        };

        let default_passing_marks = match env::var("ATS_DEFAULT_PASSING_MARKS") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|value| *value <= 100)
                .ok_or(ConfigError::InvalidPassingMarks)?,
            Err(_) => defaults.default_passing_marks,
        };

        let bulk_mark_concurrency = match env::var("ATS_BULK_MARK_CONCURRENCY") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidConcurrency)?,
            Err(_) => defaults.bulk_mark_concurrency,
        };

        Ok(Self {
            test_grace_minutes,
            default_passing_marks,
            bulk_mark_concurrency,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("ATS_TEST_GRACE_MINUTES must be a non-negative whole number of minutes")]
    InvalidGraceMinutes,
    #[error("ATS_DEFAULT_PASSING_MARKS must be a percentage between 0 and 100")]
    InvalidPassingMarks,
    #[error("ATS_BULK_MARK_CONCURRENCY must be at least 1")]
    InvalidConcurrency,
}
