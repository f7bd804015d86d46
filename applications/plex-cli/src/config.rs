/// CLI configuration
use plex_account::{AccountError, ClientConfig, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "plex.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub client: ClientConfig,

    /// Stored session token
    #[serde(default)]
    pub token: Option<String>,
}

impl CliConfig {
    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; otherwise `plex.toml` is read when
    /// present. `PLEX_*` variables override file values, with `__`
    /// separating nested keys (`PLEX_CLIENT__BASE_URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables (prefixed with PLEX_)
        settings = settings.add_source(
            config::Environment::with_prefix("PLEX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| AccountError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AccountError::Config(e.to_string()))
    }
}
