use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::workflows::money;

pub const DEFAULT_PDC_DUE_WINDOW_DAYS: i64 = 7;
pub const MAX_PDC_DUE_WINDOW_DAYS: i64 = 366;
pub const DEFAULT_REFUND_APPROVAL_THRESHOLD: i64 = 5_000;

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
    pub workflows: WorkflowConfig,
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
            workflows: WorkflowConfig::from_env()?,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Business dials shared by the cheque and move-out workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Days before a cheque's date during which it may move from received to due.
    pub pdc_due_window_days: i64,
    /// Net refunds strictly above this amount need a second approver.
    pub refund_approval_threshold: Decimal,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            pdc_due_window_days: DEFAULT_PDC_DUE_WINDOW_DAYS,
            refund_approval_threshold: Decimal::from(DEFAULT_REFUND_APPROVAL_THRESHOLD),
        }
    }
}

impl WorkflowConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let pdc_due_window_days = match env::var("PDC_DUE_WINDOW_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|days| (0..=MAX_PDC_DUE_WINDOW_DAYS).contains(days))
                .ok_or(ConfigError::InvalidDueWindow(raw))?,
            Err(_) => defaults.pdc_due_window_days,
        };

        let refund_approval_threshold = match env::var("REFUND_APPROVAL_THRESHOLD") {
            Ok(raw) => Decimal::from_str(raw.trim())
                .ok()
                .filter(|amount| !amount.is_sign_negative())
                .map(money::round)
                .ok_or(ConfigError::InvalidApprovalThreshold(raw))?,
            Err(_) => defaults.refund_approval_threshold,
        };

        Ok(Self {
            pdc_due_window_days,
            refund_approval_threshold,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDueWindow(String),
    InvalidApprovalThreshold(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDueWindow(raw) => write!(
                f,
                "PDC_DUE_WINDOW_DAYS must be 0..={MAX_PDC_DUE_WINDOW_DAYS} days (found '{raw}')"
            ),
            ConfigError::InvalidApprovalThreshold(raw) => write!(
                f,
                "REFUND_APPROVAL_THRESHOLD must be a non-negative decimal amount (found '{raw}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidDueWindow(_)
            | ConfigError::InvalidApprovalThreshold(_) => None,
        }
    }
}
