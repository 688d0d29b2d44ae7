//! Board-agnostic core logic for the planar mover table
//!
//! This crate contains all application logic that does not depend on
//! a specific motor controller driver or async runtime:
//!
//! - Hardware link trait (controller commands and status queries)
//! - Bring-up state machine and levitation survey
//! - Retry-once command interlocks
//! - Mover registry
//! - Motion value types and table geometry
//! - Choreography routine schedule
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod choreography;
pub mod config;
pub mod motion;
pub mod registry;
pub mod safety;
pub mod state;
pub mod traits;
