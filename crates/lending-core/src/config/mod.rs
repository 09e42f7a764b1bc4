use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

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
    pub progression: ProgressionConfig,
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
            progression: ProgressionConfig::from_env()?,
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

/// Knobs for the borrower dashboard and the scoring leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionConfig {
    pub repayment_target: Decimal,
    pub leaderboard_size: usize,
    pub reminder_lead_days: i64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            repayment_target: dec!(100),
            leaderboard_size: 10,
            reminder_lead_days: 7,
        }
    }
}

impl ProgressionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let repayment_target = match env::var("APP_REPAYMENT_TARGET") {
            Ok(raw) => Decimal::from_str(raw.trim())
                .ok()
                .filter(|target| *target > Decimal::ZERO)
                .ok_or(ConfigError::InvalidRepaymentTarget)?,
            Err(_) => defaults.repayment_target,
        };

        let leaderboard_size = match env::var("APP_LEADERBOARD_SIZE") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidLeaderboardSize)?,
            Err(_) => defaults.leaderboard_size,
        };

        let reminder_lead_days = match env::var("APP_REMINDER_LEAD_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|days| *days >= 0)
                .ok_or(ConfigError::InvalidReminderLeadDays)?,
            Err(_) => defaults.reminder_lead_days,
        };

        Ok(Self {
            repayment_target,
            leaderboard_size,
            reminder_lead_days,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRepaymentTarget,
    InvalidLeaderboardSize,
    InvalidReminderLeadDays,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRepaymentTarget => {
                write!(f, "APP_REPAYMENT_TARGET must be a positive decimal amount")
            }
            ConfigError::InvalidLeaderboardSize => {
                write!(f, "APP_LEADERBOARD_SIZE must be a positive integer")
            }
            ConfigError::InvalidReminderLeadDays => {
                write!(f, "APP_REMINDER_LEAD_DAYS must be a non-negative number of days")
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
