//! Motion commands
//!
//! A motion command is a transient value: it is built from a target and a
//! set of options, encoded onto the hardware link, and then forgotten.

use crate::traits::{LinearMotion, MoverId};

use super::position::{PathType, Position, PositionMode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default cruise speed (m/s)
pub const DEFAULT_MAX_SPEED_MPS: f32 = 0.5;

/// Default maximum acceleration (m/s²)
pub const DEFAULT_MAX_ACCEL_MPS2: f32 = 10.0;

/// Options for a point-to-point move
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionOptions {
    /// Correlation label echoed by the controller
    pub label: Option<u16>,
    /// Absolute or relative target
    pub position_mode: PositionMode,
    /// Path interpolation
    pub path: PathType,
    /// Speed at arrival (m/s), 0 = stop at target
    pub final_speed_mps: f32,
    /// Cruise speed (m/s)
    pub max_speed_mps: f32,
    /// Maximum acceleration (m/s²)
    pub max_accel_mps2: f32,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self {
            label: None,
            position_mode: PositionMode::Absolute,
            path: PathType::Direct,
            final_speed_mps: 0.0,
            max_speed_mps: DEFAULT_MAX_SPEED_MPS,
            max_accel_mps2: DEFAULT_MAX_ACCEL_MPS2,
        }
    }
}

/// Invalid motion option
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    /// A speed or acceleration is NaN or infinite
    #[error("kinematic limits must be finite")]
    NonFinite,
    /// Final speed is below zero
    #[error("final speed must not be negative")]
    NegativeFinalSpeed,
    /// Cruise speed is zero or below
    #[error("cruise speed must be positive")]
    NonPositiveSpeed,
    /// Acceleration is zero or below
    #[error("acceleration must be positive")]
    NonPositiveAccel,
    /// Final speed exceeds cruise speed
    #[error("final speed exceeds cruise speed")]
    FinalAboveCruise,
}

impl MotionOptions {
    /// Options with a correlation label
    pub fn labelled(label: u16) -> Self {
        Self {
            label: Some(label),
            ..Self::default()
        }
    }

    /// Same options in relative positioning mode
    pub fn relative(self) -> Self {
        Self {
            position_mode: PositionMode::Relative,
            ..self
        }
    }

    /// Check the kinematic limits
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.final_speed_mps.is_finite()
            && self.max_speed_mps.is_finite()
            && self.max_accel_mps2.is_finite())
        {
            return Err(OptionsError::NonFinite);
        }
        if self.final_speed_mps < 0.0 {
            return Err(OptionsError::NegativeFinalSpeed);
        }
        if self.max_speed_mps <= 0.0 {
            return Err(OptionsError::NonPositiveSpeed);
        }
        if self.max_accel_mps2 <= 0.0 {
            return Err(OptionsError::NonPositiveAccel);
        }
        if self.final_speed_mps > self.max_speed_mps {
            return Err(OptionsError::FinalAboveCruise);
        }
        Ok(())
    }
}

/// A move of one mover to one target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionCommand {
    pub mover: MoverId,
    pub target: Position,
    pub options: MotionOptions,
}

impl MotionCommand {
    /// Create a motion command
    pub fn new(mover: MoverId, target: Position, options: MotionOptions) -> Self {
        Self {
            mover,
            target,
            options,
        }
    }

    /// Encode for the hardware link
    pub fn encode(&self) -> LinearMotion {
        LinearMotion {
            label: self.options.label.unwrap_or(0),
            mover: self.mover,
            mode: self.options.position_mode,
            path: self.options.path,
            target: self.target,
            final_speed_mps: self.options.final_speed_mps,
            max_speed_mps: self.options.max_speed_mps,
            max_accel_mps2: self.options.max_accel_mps2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = MotionOptions::default();
        assert_eq!(options.label, None);
        assert_eq!(options.position_mode, PositionMode::Absolute);
        assert_eq!(options.path, PathType::Direct);
        assert_eq!(options.final_speed_mps, 0.0);
        assert_eq!(options.max_speed_mps, 0.5);
        assert_eq!(options.max_accel_mps2, 10.0);
        assert_eq!(options.validate(), Ok(()));
    }

    #[test]
    fn test_validation() {
        let base = MotionOptions::default();

        let nan = MotionOptions {
            max_speed_mps: f32::NAN,
            ..base
        };
        assert_eq!(nan.validate(), Err(OptionsError::NonFinite));

        let backwards = MotionOptions {
            final_speed_mps: -0.1,
            ..base
        };
        assert_eq!(backwards.validate(), Err(OptionsError::NegativeFinalSpeed));

        let stalled = MotionOptions {
            max_speed_mps: 0.0,
            ..base
        };
        assert_eq!(stalled.validate(), Err(OptionsError::NonPositiveSpeed));

        let no_accel = MotionOptions {
            max_accel_mps2: 0.0,
            ..base
        };
        assert_eq!(no_accel.validate(), Err(OptionsError::NonPositiveAccel));

        let overshoot = MotionOptions {
            final_speed_mps: 1.0,
            ..base
        };
        assert_eq!(overshoot.validate(), Err(OptionsError::FinalAboveCruise));
    }

    #[test]
    fn test_encode() {
        let mover = MoverId::new(3).unwrap();
        let options = MotionOptions::labelled(42).relative();
        let command = MotionCommand::new(mover, Position::new(0.12, 0.0), options);
        let encoded = command.encode();

        assert_eq!(encoded.label, 42);
        assert_eq!(encoded.mover, mover);
        assert_eq!(encoded.mode, PositionMode::Relative);
        assert_eq!(encoded.path, PathType::Direct);
        assert_eq!(encoded.target, Position::new(0.12, 0.0));
        assert_eq!(encoded.max_speed_mps, DEFAULT_MAX_SPEED_MPS);
    }

    #[test]
    fn test_unlabelled_encodes_zero() {
        let mover = MoverId::new(1).unwrap();
        let command = MotionCommand::new(mover, Position::default(), MotionOptions::default());
        assert_eq!(command.encode().label, 0);
    }
}
