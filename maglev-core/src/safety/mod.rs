//! Safety interlocks
//!
//! Bounds how often bring-up may command the hardware.

pub mod interlock;

pub use interlock::CommandInterlock;
