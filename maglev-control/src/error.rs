//! Application error type

use maglev_core::registry::RegistryError;

use crate::bringup::BringUpFailure;
use crate::config::ConfigError;

/// Any error that ends the control process
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    BringUp(#[from] BringUpFailure),
    #[error("mover registration failed: {0}")]
    Registry(#[from] RegistryError),
}
