//! API configuration
//!
//! Read from `API_*` environment variables (after loading `.env`), with a
//! default for every field.

use serde::Deserialize;

use core_kernel::{Currency, Timezone};
use domain_fees::AdmissionFeeRule;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Administrator login accepted by `/auth/login`
    pub admin_username: String,
    pub admin_password: String,
    /// Database URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Log level, used when `RUST_LOG` is not set
    pub log_level: String,
    pub log_format: LogFormat,
    /// Timezone that decides which calendar day "today" is
    pub school_timezone: Timezone,
    /// Currency all fees and expenses are kept in
    pub currency: Currency,
    /// Which month carries the admission fee
    pub admission_fee_attribution: AdmissionFeeRule,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            admin_username: "admin".to_string(),
            admin_password: "change-me".to_string(),
            database_url: "postgres://localhost/school_fees".to_string(),
            db_max_connections: 10,
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            school_timezone: Timezone::default(),
            currency: Currency::INR,
            admission_fee_attribution: AdmissionFeeRule::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the environment, reading `.env` first
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(config::Environment::with_prefix("API").try_parsing(true))
    }

    /// Loads configuration from any `config` source layered over the defaults
    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
