//! Configuration management for the Workboard client
//!
//! Settings are layered with the `config` crate:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`--config path`)
//! 3. Environment variables prefixed with `WORKBOARD_`
//!
//! A `.env` file in the working directory is loaded first when present.
//!
//! # Environment Variables
//!
//! - `WORKBOARD_API_URL`: Backend base URL (default: `http://localhost:8000/api`)
//! - `WORKBOARD_API__BASE_URL`: Same as above, in nested form
//! - `WORKBOARD_API__REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 10)
//! - `WORKBOARD_API__PING_TIMEOUT_SECS`: Reachability check timeout (default: 5)
//! - `WORKBOARD_SESSION__STORE_PATH`: Session file (default: platform data dir)
//! - `WORKBOARD_SESSION__RESTORE_TIMEOUT_SECS`: Startup identity check timeout (default: 10)
//! - `RUST_LOG`: Log filter (default: `workboard_client=info`)
//!
//! # Example
//!
//! ```no_run
//! use workboard_client::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Talking to {}", config.api.base_url);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable prefix
const ENV_PREFIX: &str = "WORKBOARD";

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend API configuration
    pub api: ApiConfig,

    /// Session persistence configuration
    pub session: SessionConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,

    /// Timeout applied to every request
    pub request_timeout_secs: u64,

    /// Timeout for the reachability check
    pub ping_timeout_secs: u64,
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File holding the token and last-known profile
    pub store_path: PathBuf,

    /// Timeout for resolving the current user at startup
    pub restore_timeout_secs: u64,
}

impl Config {
    /// Loads configuration from defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable has an invalid value or
    /// the resulting configuration fails validation.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load(None)
    }

    /// Loads configuration, optionally layering a TOML file under the environment
    ///
    /// # Arguments
    ///
    /// * `file` - Optional configuration file; it must exist when given
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file is missing or malformed
    /// - Environment variables have invalid values
    /// - Validation fails (see [`Config::validate`])
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.request_timeout_secs", 10_i64)?
            .set_default("api.ping_timeout_secs", 5_i64)?
            .set_default(
                "session.store_path",
                default_store_path().to_string_lossy().to_string(),
            )?
            .set_default("session.restore_timeout_secs", 10_i64)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.base_url", env::var("WORKBOARD_API_URL").ok())?;

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Checks that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL or a timeout is zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("api.base_url must start with http:// or https:// (got '{}')", url);
        }

        if self.api.request_timeout_secs == 0 || self.api.ping_timeout_secs == 0 {
            anyhow::bail!("API timeouts must be greater than zero");
        }

        if self.session.restore_timeout_secs == 0 {
            anyhow::bail!("session.restore_timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim().trim_end_matches('/')
    }
}

impl ApiConfig {
    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reachability check timeout
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }
}

impl SessionConfig {
    /// Startup identity check timeout
    pub fn restore_timeout(&self) -> Duration {
        Duration::from_secs(self.restore_timeout_secs)
    }
}

/// Platform-specific default location of the session file
pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("workboard").join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".workboard-session.json"))
}
