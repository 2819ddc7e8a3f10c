//! Application configuration schemas.
//!
//! All configuration structs are deserialized from a TOML file via the
//! `config` crate, overlaid with `THEDAY__`-prefixed environment variables.
//! Every section has defaults so an empty configuration is valid.

pub mod logging;
pub mod remote;
pub mod session;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
pub use self::remote::RemoteConfig;
pub use self::session::{SyncConfig, TranscriptConfig};
pub use self::store::StoreConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote materials service settings.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Client-side key-value store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Transcript session settings.
    #[serde(default)]
    pub transcript: TranscriptConfig,
    /// Subject sync settings.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional; environment variables prefixed with `THEDAY`
    /// (separator `__`, e.g. `THEDAY__REMOTE__BASE_URL`) take precedence.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("THEDAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
