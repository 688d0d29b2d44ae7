//! Configuration type definitions
//!
//! Intervals are in milliseconds so the types stay independent of any
//! particular timer crate.

use crate::motion::MotionOptions;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default controller mode poll interval (ms)
pub const DEFAULT_MODE_POLL_MS: u32 = 1000;

/// Default levitation survey interval (ms)
pub const DEFAULT_LEVITATION_POLL_MS: u32 = 500;

/// Default settle time after a motion command (ms)
pub const DEFAULT_SETTLE_MS: u32 = 1000;

/// Bring-up configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BringUpConfig {
    /// Mover count the controller must report; None skips the check
    pub expected_movers: Option<u8>,
    /// Sleep between controller mode reads while it transitions (ms)
    pub mode_poll_ms: u32,
    /// Sleep between levitation survey passes (ms)
    pub levitation_poll_ms: u32,
    /// Wall-clock bound on the whole bring-up; None waits forever
    pub max_duration_ms: Option<u32>,
}

impl Default for BringUpConfig {
    fn default() -> Self {
        Self {
            expected_movers: None,
            mode_poll_ms: DEFAULT_MODE_POLL_MS,
            levitation_poll_ms: DEFAULT_LEVITATION_POLL_MS,
            max_duration_ms: None,
        }
    }
}

/// Motion dispatch configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DispatchConfig {
    /// Wait after issuing each motion command (ms)
    pub settle_ms: u32,
    /// Options used when a caller has none of its own
    pub motion: MotionOptions,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
            motion: MotionOptions::default(),
        }
    }
}
