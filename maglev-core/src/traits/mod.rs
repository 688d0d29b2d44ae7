//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and the motor controller driver.

pub mod link;
pub mod status;

pub use link::{
    HardwareLink, InvalidMoverId, LevitateOption, LinearMotion, MoverId, MoverIdReport, Scope,
    MAX_MOVERS,
};
pub use status::{ControllerMode, LevitationClass, ModeClass, MoverState, ResultCode};
