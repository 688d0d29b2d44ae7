//! Bring-up state machine definition
//!
//! The bring-up sequence only ever moves forward. Polling loops may sit in
//! the same state for many reads, but no event moves the machine back to
//! an earlier stage, and Ready and Failed are absorbing.

use super::events::Event;
use crate::traits::{ControllerMode, MoverId, MoverState, ResultCode};

/// Bring-up states, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpState {
    /// No connection to the controller
    Disconnected,
    /// Controller found and connected
    LinkEstablished,
    /// Mastership granted to this process
    AuthorityGained,
    /// Controller in full or intelligent control
    Operational,
    /// Mover population read and checked, all motion stopped
    PopulationVerified,
    /// Waiting for every mover to levitate
    Levitating,
    /// All movers levitating; ready to accept motion commands
    Ready,
    /// Bring-up aborted; terminal for this run
    Failed(FailReason),
}

/// Why bring-up failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FailReason {
    #[error("controller unreachable")]
    ConnectError,
    #[error("mastership request rejected ({code:?})")]
    AuthorityError { code: ResultCode },
    #[error("mover activation rejected ({code:?})")]
    ActivationError { code: ResultCode },
    #[error("controller still inactive after activation")]
    ActivationExhausted,
    #[error("unexpected controller mode {mode:?}")]
    UnexpectedMode { mode: ControllerMode },
    #[error("mover id query failed ({code:?})")]
    ReadIdsError { code: ResultCode },
    #[error("expected {expected} movers, controller reports {actual}")]
    PopulationMismatch { expected: u8, actual: u8 },
    #[error("mover {mover} blocked in state {state:?}")]
    BlockedState { mover: MoverId, state: MoverState },
    #[error("mover {mover} is disabled")]
    DisabledState { mover: MoverId },
    #[error("mover {mover} in unexpected state {state:?}")]
    UnexpectedState { mover: MoverId, state: MoverState },
    #[error("levitation command rejected ({code:?})")]
    LevitationError { code: ResultCode },
    #[error("movers still landed after levitation command")]
    LevitationExhausted,
    #[error("bring-up aborted")]
    Cancelled,
    #[error("bring-up exceeded {limit_ms} ms")]
    TimedOut { limit_ms: u32 },
}

/// Failure families, for supervisors deciding whether to retry or escalate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailCategory {
    Connectivity,
    Authority,
    Mode,
    Population,
    Levitation,
    /// Stopped from outside (abort signal or wall-clock bound)
    Aborted,
}

impl FailReason {
    /// Failure family of this reason
    pub const fn category(&self) -> FailCategory {
        match self {
            Self::ConnectError => FailCategory::Connectivity,
            Self::AuthorityError { .. } => FailCategory::Authority,
            Self::ActivationError { .. } | Self::ActivationExhausted | Self::UnexpectedMode { .. } => {
                FailCategory::Mode
            }
            Self::ReadIdsError { .. } | Self::PopulationMismatch { .. } => FailCategory::Population,
            Self::BlockedState { .. }
            | Self::DisabledState { .. }
            | Self::UnexpectedState { .. }
            | Self::LevitationError { .. }
            | Self::LevitationExhausted => FailCategory::Levitation,
            Self::Cancelled | Self::TimedOut { .. } => FailCategory::Aborted,
        }
    }
}

impl BringUpState {
    /// Position in the bring-up order; Failed ranks after everything
    pub const fn stage(&self) -> u8 {
        match self {
            Self::Disconnected => 0,
            Self::LinkEstablished => 1,
            Self::AuthorityGained => 2,
            Self::Operational => 3,
            Self::PopulationVerified => 4,
            Self::Levitating => 5,
            Self::Ready => 6,
            Self::Failed(_) => 7,
        }
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }

    /// Check if this is a failure state
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Failure reason, if failed
    pub fn failure(&self) -> Option<FailReason> {
        match self {
            Self::Failed(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Process an event and return the next state
    ///
    /// Events that do not apply to the current state leave it unchanged.
    pub fn transition(self, event: Event) -> Self {
        use BringUpState::*;

        match (self, event) {
            (Disconnected, Event::LinkEstablished) => LinkEstablished,
            (LinkEstablished, Event::AuthorityGained) => AuthorityGained,
            (AuthorityGained, Event::Operational) => Operational,
            (Operational, Event::PopulationVerified) => PopulationVerified,
            (PopulationVerified, Event::LevitationStarted) => Levitating,
            (Levitating, Event::AllLevitated) => Ready,

            // Any stage short of Ready can fail
            (state, Event::Fault(reason)) if !state.is_terminal() => Failed(reason),

            // Default: stay in current state
            _ => self,
        }
    }
}
