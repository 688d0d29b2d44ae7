//! Configuration loading
//!
//! The binary carries `maglev.toml` as its default configuration. Setting
//! `MAGLEV_CONFIG` to a file path replaces it entirely; there is no merging
//! of the two.

use std::fmt;
use std::path::PathBuf;

use maglev_core::choreography::{Routine, RoutineError};
use maglev_core::config::{BringUpConfig, DispatchConfig};
use maglev_core::motion::{OptionsError, TableGeometry};
use maglev_sim::SimConfig;
use serde::Deserialize;
use tracing::{debug, info};

/// Embedded default configuration (compiled into the binary)
pub const EMBEDDED_CONFIG: &str = include_str!("../maglev.toml");

/// Environment variable naming an external configuration file
pub const CONFIG_ENV: &str = "MAGLEV_CONFIG";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// TOML syntax or schema error
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Default motion options out of range
    #[error("invalid dispatch motion options: {0}")]
    Motion(#[from] OptionsError),
    /// Routine cannot run on the configured table
    #[error("invalid choreography: {0}")]
    Routine(#[from] RoutineError),
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Embedded,
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => f.write_str("embedded maglev.toml"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ControlConfig {
    #[serde(default)]
    pub geometry: TableGeometry,
    #[serde(default)]
    pub bring_up: BringUpConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    pub choreography: Routine,
    #[serde(default)]
    pub simulator: SimConfig,
}

impl ControlConfig {
    /// Parse and validate a TOML document
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dispatch.motion.validate()?;
        self.choreography.validate(&self.geometry)?;
        Ok(())
    }

    /// Load from `MAGLEV_CONFIG` if set, otherwise the embedded default
    pub fn load() -> Result<(Self, ConfigSource), ConfigError> {
        Self::load_from(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    /// Load from a file, or the embedded default when there is none
    pub fn load_from(path: Option<PathBuf>) -> Result<(Self, ConfigSource), ConfigError> {
        match path {
            Some(path) => {
                info!(path = %path.display(), "loading configuration file");
                let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok((Self::parse(&text)?, ConfigSource::File(path)))
            }
            None => {
                debug!("{} not set, using embedded configuration", CONFIG_ENV);
                Ok((Self::parse(EMBEDDED_CONFIG)?, ConfigSource::Embedded))
            }
        }
    }
}
