//! Motion types
//!
//! Positions, point-to-point motion options, and the table geometry that
//! bounds where movers may be sent.

pub mod command;
pub mod geometry;
pub mod position;

pub use command::{MotionCommand, MotionOptions, OptionsError};
pub use geometry::{TableGeometry, OUTER_CORNERS, TEST_STATIONS};
pub use position::{PathType, Position, PositionMode};
