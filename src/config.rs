use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const NASA_POWER_DAILY_POINT_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_base_url() -> String { NASA_POWER_DAILY_POINT_URL.to_string() }
fn default_community() -> String { "RE".to_string() }
fn default_panel_area() -> f64 { 2.5 }
fn default_efficiency() -> f64 { 0.18 }
fn default_static_dir() -> String { "static".to_string() }
fn default_export_dir() -> String { "exports".to_string() }

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub nasa_power: NasaPowerConfig,
    #[serde(default)]
    pub defaults: PanelDefaults,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Root for server-side CSV exports; requested names resolve inside it.
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Loopback unless configured otherwise
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Remote irradiance endpoint settings.
#[derive(Debug, Deserialize, Clone)]
pub struct NasaPowerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_community")]
    pub community: String,
    /// No timeout unless set; the transport default applies.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for NasaPowerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            community: default_community(),
            timeout_secs: None,
        }
    }
}

/// Values pre-filled in the form's panel fields.
#[derive(Debug, Deserialize, Serialize, Clone, ToSchema)]
pub struct PanelDefaults {
    #[serde(default = "default_panel_area")]
    pub panel_area_m2: f64,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
}

impl Default for PanelDefaults {
    fn default() -> Self {
        Self {
            panel_area_m2: default_panel_area(),
            efficiency: default_efficiency(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Json {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}
