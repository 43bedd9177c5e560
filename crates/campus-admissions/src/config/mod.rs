use std::env;
use std::net::{IpAddr, SocketAddr};

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
    pub admissions: AdmissionsConfig,
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

        let student_id_prefix = env::var("APP_STUDENT_ID_PREFIX")
            .unwrap_or_else(|_| DEFAULT_STUDENT_ID_PREFIX.to_string())
            .trim()
            .to_string();
        if student_id_prefix.is_empty() {
            return Err(ConfigError::BlankStudentIdPrefix);
        }

        let offer_validity_days = match env::var("APP_OFFER_VALIDITY_DAYS") {
            Ok(raw) => match raw.trim().parse::<u32>() {
                Ok(days) if (1..=MAX_OFFER_VALIDITY_DAYS).contains(&days) => days,
                _ => return Err(ConfigError::InvalidOfferValidity(raw)),
            },
            Err(_) => DEFAULT_OFFER_VALIDITY_DAYS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            admissions: AdmissionsConfig {
                student_id_prefix,
                offer_validity_days,
            },
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

pub const DEFAULT_STUDENT_ID_PREFIX: &str = "STU";
pub const DEFAULT_OFFER_VALIDITY_DAYS: u32 = 30;
pub const MAX_OFFER_VALIDITY_DAYS: u32 = 3_650;

/// Knobs for identity minting and catalog-priced offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionsConfig {
    pub student_id_prefix: String,
    pub offer_validity_days: u32,
}

impl Default for AdmissionsConfig {
    fn default() -> Self {
        Self {
            student_id_prefix: DEFAULT_STUDENT_ID_PREFIX.to_string(),
            offer_validity_days: DEFAULT_OFFER_VALIDITY_DAYS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error("APP_STUDENT_ID_PREFIX must not be blank")]
    BlankStudentIdPrefix,
    #[error("APP_OFFER_VALIDITY_DAYS must be between 1 and 3650 days (found '{0}')")]
    InvalidOfferValidity(String),
}
