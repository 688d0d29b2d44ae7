//! Host-side hardware links for the planar mover table
//!
//! Two implementations of [`HardwareLink`]:
//!
//! - [`SimTable`] - behavioural simulation of a controller and its movers.
//!   Booting, activation, discovery and motion each take a configurable
//!   number of status reads to complete, so the bring-up polling loops
//!   see realistic transitional states.
//! - [`ScriptedLink`] - replays scripted responses and records every call.
//!   Used by tests to drive exact sequences and to count commands.
//!
//! Both keep their state behind a critical-section mutex so a single
//! instance can be shared by reference from a `static`.
//!
//! [`HardwareLink`]: maglev_core::traits::HardwareLink

pub mod scripted;
pub mod table;

pub use scripted::{CallLog, ScriptedLink};
pub use table::{SimConfig, SimTable};
