//! Process-wide signals
//!
//! Uses embassy-sync primitives so any task can stop bring-up without
//! holding a reference to it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Signal type used to abort a bring-up run
pub type AbortSignal = Signal<CriticalSectionRawMutex, ()>;

/// Abort signal for the bring-up run started by the binary
pub static ABORT: AbortSignal = Signal::new();
