//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VERDANT_API_BASE_URL` - Base URL of the storefront REST API
//!   (e.g., `http://localhost:8000/api`)
//!
//! ## Optional
//! - `VERDANT_DATA_DIR` - Directory for durable client state (guest cart,
//!   session token). Defaults to `verdant/` under the platform data-local dir.
//! - `VERDANT_USER_AGENT` - User-Agent header sent with every request.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default User-Agent when `VERDANT_USER_AGENT` is unset.
const DEFAULT_USER_AGENT: &str = concat!("verdant-client/", env!("CARGO_PKG_VERSION"));

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("No data directory available; set VERDANT_DATA_DIR")]
    NoDataDir,
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront REST API.
    pub base_url: Url,
    /// Directory holding durable client state (guest cart, session token).
    pub data_dir: PathBuf,
    /// User-Agent header value.
    pub user_agent: String,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `VERDANT_API_BASE_URL` is missing or not a
    /// valid URL, or if no data directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_required_env("VERDANT_API_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("VERDANT_API_BASE_URL".to_string(), e.to_string())
        })?;

        let data_dir = match get_optional_env("VERDANT_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let user_agent =
            get_optional_env("VERDANT_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

        Ok(Self {
            base_url,
            data_dir,
            user_agent,
        })
    }

    /// Build a configuration directly, for embedding and tests.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid URL.
    pub fn new(base_url: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("base_url".to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            data_dir: data_dir.into(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }
}

/// Platform-local data directory for the client (`~/.local/share/verdant` on
/// Linux).
fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join("verdant"))
        .ok_or(ConfigError::NoDataDir)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
