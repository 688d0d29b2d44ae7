//! Configuration types
//!
//! Plain structures shared by the bring-up driver and the dispatcher. The
//! application crate deserializes them from TOML.

pub mod types;

pub use types::*;
