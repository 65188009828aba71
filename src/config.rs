use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub unraid: UnraidConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub ups: UpsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UnraidConfig {
    pub host: String,
    /// Defaults to 443 for TLS, 80 for plain HTTP.
    #[serde(default)]
    pub port: Option<u16>,
    pub api_key: SecretString,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl UnraidConfig {
    /// Base URL of the Unraid GraphQL endpoint.
    pub fn endpoint(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        let port = self
            .port
            .unwrap_or(if self.use_tls { 443 } else { 80 });
        format!("{}://{}:{}/graphql", scheme, self.host, port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

/// Per-tier polling intervals. The three tiers are scheduled independently.
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_system_interval")]
    pub system_interval_seconds: u64,
    #[serde(default = "default_storage_interval")]
    pub storage_interval_seconds: u64,
    #[serde(default = "default_infrastructure_interval")]
    pub infrastructure_interval_seconds: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            system_interval_seconds: default_system_interval(),
            storage_interval_seconds: default_storage_interval(),
            infrastructure_interval_seconds: default_infrastructure_interval(),
        }
    }
}

/// UPS options. Only meaningful when UPS hardware shows up in the system
/// snapshot; used to derive absolute power/energy from reported percentages.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct UpsConfig {
    pub battery_capacity_ah: Option<f64>,
    pub nominal_power_watts: Option<f64>,
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9630
}

fn default_use_tls() -> bool {
    true
}

fn default_verify_ssl() -> bool {
    false
}

fn default_timeout() -> u64 {
    30
}

fn default_system_interval() -> u64 {
    30
}

fn default_storage_interval() -> u64 {
    300
}

fn default_infrastructure_interval() -> u64 {
    900
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("UNRAID_MONITOR").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
