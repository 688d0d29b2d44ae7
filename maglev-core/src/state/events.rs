//! Bring-up events

use super::machine::FailReason;

/// Events that drive the bring-up state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Controller connection established
    LinkEstablished,
    /// Mastership granted
    AuthorityGained,
    /// Controller reported a ready mode
    Operational,
    /// Mover ids read, count checked, motion stopped
    PopulationVerified,
    /// First levitation pass started
    LevitationStarted,
    /// Every mover reported levitated
    AllLevitated,
    /// Bring-up cannot continue
    Fault(FailReason),
}

impl Event {
    /// Check if this event ends the run in failure
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}
