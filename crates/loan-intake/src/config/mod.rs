use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::loans::domain::CountryCode;

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
    pub admission: AdmissionConfig,
    pub geoip: GeoIpConfig,
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

        let default_country = env::var("LOAN_DEFAULT_COUNTRY").unwrap_or_else(|_| "lv".to_string());
        let default_country =
            CountryCode::parse(&default_country).ok_or(ConfigError::BlankDefaultCountry)?;

        let admission = AdmissionConfig {
            window_ms: parse_var("LOAN_APPLICATION_PERIOD_MS", 60_000)?,
            count_limit: parse_var("LOAN_COUNTRY_COUNT_LIMIT", 10)?,
            default_country,
            blacklist_path: env::var_os("LOAN_BLACKLIST_PATH").map(PathBuf::from),
        };

        let geoip = GeoIpConfig {
            endpoint: env::var("GEOIP_ENDPOINT").unwrap_or_else(|_| "https://ipapi.co".to_string()),
            timeout_ms: parse_var("GEOIP_TIMEOUT_MS", 2_000)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            admission,
            geoip,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            variable: name,
            value: raw,
        }),
        Err(_) => Ok(default),
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

/// Rate window, ceiling and fallback country used by the admission pipeline.
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    pub window_ms: u64,
    pub count_limit: u64,
    pub default_country: CountryCode,
    pub blacklist_path: Option<PathBuf>,
}

impl AdmissionConfig {
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.window_ms).unwrap_or(i64::MAX))
    }
}

/// Location and deadline of the external country lookup.
#[derive(Debug, Clone)]
pub struct GeoIpConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl GeoIpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str, value: String },
    BlankDefaultCountry,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be a non-negative integer, found '{value}'")
            }
            ConfigError::BlankDefaultCountry => {
                write!(f, "LOAN_DEFAULT_COUNTRY must not be blank")
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
            | ConfigError::BlankDefaultCountry => None,
        }
    }
}
