//! Controller and mover status values
//!
//! Closed enumerations of the values the motor controller reports. Every
//! enumeration carries an `Unrecognized` arm holding the raw wire value so
//! that firmware revisions introducing new values fail loudly instead of
//! being silently mapped onto a known variant.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Return code of a controller command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResultCode {
    /// Command accepted
    AllOk,
    /// Generic controller-side failure
    SystemError,
    /// A parameter was out of range or referred to an unknown mover
    InvalidParameter,
    /// This client does not hold mastership
    NoMastership,
    /// Controller is in a mode that does not accept the command
    WrongControllerState,
    /// Target mover is in a state that does not accept the command
    WrongMoverState,
    /// Controller did not answer in time
    Timeout,
    /// Raw code not known to this build
    Unrecognized(u16),
}

impl ResultCode {
    /// Decode a raw return code
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Self::AllOk,
            1 => Self::SystemError,
            2 => Self::InvalidParameter,
            3 => Self::NoMastership,
            4 => Self::WrongControllerState,
            5 => Self::WrongMoverState,
            6 => Self::Timeout,
            other => Self::Unrecognized(other),
        }
    }

    /// Raw wire value
    pub const fn raw(self) -> u16 {
        match self {
            Self::AllOk => 0,
            Self::SystemError => 1,
            Self::InvalidParameter => 2,
            Self::NoMastership => 3,
            Self::WrongControllerState => 4,
            Self::WrongMoverState => 5,
            Self::Timeout => 6,
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Check if the command was accepted
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::AllOk)
    }
}

/// How the bring-up sequence treats a controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeClass {
    /// Full or intelligent control; movers can be commanded
    Ready,
    /// Controller is moving between modes on its own; wait and re-poll
    Transitional,
    /// Inactive or error; movers must be activated
    NeedsActivation,
    /// Not a mode this build knows how to handle
    Unrecognized,
}

/// Controller operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControllerMode {
    Booting,
    Inactive,
    Activating,
    Error,
    Deactivating,
    ErrorHandling,
    FullControl,
    IntelligentControl,
    /// Raw mode not known to this build
    Unrecognized(u8),
}

impl ControllerMode {
    /// Decode a raw controller mode
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Booting,
            1 => Self::Inactive,
            2 => Self::Activating,
            3 => Self::Error,
            4 => Self::Deactivating,
            5 => Self::ErrorHandling,
            6 => Self::FullControl,
            7 => Self::IntelligentControl,
            other => Self::Unrecognized(other),
        }
    }

    /// Classify the mode for the bring-up polling loop
    pub const fn class(self) -> ModeClass {
        match self {
            Self::FullControl | Self::IntelligentControl => ModeClass::Ready,
            Self::Booting | Self::Activating | Self::Deactivating | Self::ErrorHandling => {
                ModeClass::Transitional
            }
            Self::Inactive | Self::Error => ModeClass::NeedsActivation,
            Self::Unrecognized(_) => ModeClass::Unrecognized,
        }
    }

    /// Check if movers can be commanded in this mode
    pub const fn is_ready(self) -> bool {
        matches!(self.class(), ModeClass::Ready)
    }
}

/// How the levitation wait treats a mover state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevitationClass {
    /// Resting on the surface; a levitate command will lift it
    Grounded,
    /// Changing state on its own; wait without re-issuing levitate
    Transitioning,
    /// Idle or stopped; already up and ready to move
    Settled,
    /// Held by the controller (wait, obstacle, hold position)
    Blocked,
    /// Disabled and cannot be levitated
    Disabled,
    /// Any state with no rule in the levitation wait
    Unexpected,
}

/// Mover state as reported by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoverState {
    Discovering,
    Landed,
    Idle,
    Disabled,
    InMotion,
    Wait,
    Stopping,
    ObstacleDetected,
    HoldPosition,
    Stopped,
    Jogging,
    Error,
    /// Raw state not known to this build
    Unrecognized(u8),
}

impl MoverState {
    /// Decode a raw mover state
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Discovering,
            2 => Self::Landed,
            3 => Self::Idle,
            4 => Self::Disabled,
            5 => Self::InMotion,
            6 => Self::Wait,
            7 => Self::Stopping,
            8 => Self::ObstacleDetected,
            9 => Self::HoldPosition,
            10 => Self::Stopped,
            13 => Self::Jogging,
            14 => Self::Error,
            other => Self::Unrecognized(other),
        }
    }

    /// Classify the state for the levitation wait
    pub const fn levitation(self) -> LevitationClass {
        match self {
            Self::Landed => LevitationClass::Grounded,
            Self::Stopping | Self::Discovering | Self::InMotion => LevitationClass::Transitioning,
            Self::Idle | Self::Stopped => LevitationClass::Settled,
            Self::Wait | Self::ObstacleDetected | Self::HoldPosition => LevitationClass::Blocked,
            Self::Disabled => LevitationClass::Disabled,
            Self::Jogging | Self::Error | Self::Unrecognized(_) => LevitationClass::Unexpected,
        }
    }
}
