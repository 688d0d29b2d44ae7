//! Maglev - planar mover table control
//!
//! Async application layer on embassy. Brings the table up from a cold
//! controller to levitating movers, then drives motion concurrently:
//!
//! - [`bringup`] - startup orchestrator running the bring-up state machine
//! - [`dispatch`] - non-blocking per-mover motion with settle timing
//! - [`choreography`] - beat-by-beat routine driver
//! - [`config`] - TOML configuration with an embedded default
//!
//! The hardware link is borrowed, never owned: one link instance is shared
//! by the orchestrator, the registry and the dispatcher.

pub mod bringup;
pub mod channels;
pub mod choreography;
pub mod config;
pub mod dispatch;
pub mod error;

pub use bringup::{BringUp, BringUpFailure, BringUpReport};
pub use choreography::{Choreographer, ChoreographyReport};
pub use config::{ConfigError, ControlConfig};
pub use dispatch::{DispatchError, MotionDispatcher, MoveReceipt};
pub use error::ControlError;
