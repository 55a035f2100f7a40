use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use atelier_common::config::StorageAppConfig;
use atelier_common::normalize::DEFAULT_MAX_INPUT_BYTES;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins. Empty means any origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

fn default_cors_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Connection pool size. Default: 20.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    20
}

/// One entry of the fixed login roster.
#[derive(Debug, Deserialize, Clone)]
pub struct UserEntry {
    pub username: String,
    /// Display name carried in issued tokens.
    pub name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens, in hours. Default: 24.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    #[serde(default)]
    pub users: Vec<UserEntry>,
}

fn default_token_ttl_hours() -> i64 {
    24
}

/// Image generation provider (OpenAI-compatible images API).
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// API key. Absent or blank disables the provider entirely.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    #[serde(default = "default_create_model")]
    pub create_model: String,
    #[serde(default = "default_edit_model")]
    pub edit_model: String,
    /// Download provider-hosted URLs instead of passing them through. Default: true.
    #[serde(default = "default_fetch_remote")]
    pub fetch_remote: bool,
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    /// Largest provider-hosted artifact that will be downloaded. Default: 20 MiB.
    #[serde(default = "default_max_download_bytes")]
    pub max_download_bytes: usize,
}

fn default_provider_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_create_model() -> String {
    "dall-e-3".into()
}
fn default_edit_model() -> String {
    "dall-e-2".into()
}
fn default_fetch_remote() -> bool {
    true
}
fn default_provider_timeout_secs() -> u64 {
    30
}
fn default_download_timeout_secs() -> u64 {
    30
}
fn default_max_download_bytes() -> usize {
    20 * 1024 * 1024
}

impl ProviderConfig {
    /// The API key, if one is actually configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_provider_base_url(),
            create_model: default_create_model(),
            edit_model: default_edit_model(),
            fetch_remote: default_fetch_remote(),
            timeout_secs: default_provider_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
            max_download_bytes: default_max_download_bytes(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Largest accepted source image, in bytes. Default: 20 MiB.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Answer 207 instead of 200 when the history record could not be written.
    #[serde(default)]
    pub partial_success_status: bool,
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            partial_success_status: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageAppConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("ATELIER_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., ATELIER__PROVIDER__API_KEY)
            .add_source(Environment::with_prefix("ATELIER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
