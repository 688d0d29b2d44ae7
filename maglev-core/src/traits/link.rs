//! Hardware link trait
//!
//! The hardware link is the motor controller driver: it discovers and
//! connects to the controller, grants mastership, reports controller and
//! mover status, and encodes commands onto the control network. The
//! application never talks to the controller except through this trait.
//!
//! Methods take `&self` because the link is one shared resource that every
//! component borrows; implementations handle their own interior state.

use core::fmt;

use heapless::Vec;

use super::status::{ControllerMode, MoverState, ResultCode};
use crate::motion::{PathType, Position, PositionMode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of movers on one table
pub const MAX_MOVERS: usize = 32;

/// Mover identity assigned by the controller at discovery time
///
/// Identities are 1-based; zero is never a valid mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
pub struct MoverId(u16);

impl MoverId {
    /// Create a mover id, rejecting zero
    pub const fn new(raw: u16) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Raw id as used on the wire
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for MoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Zero is not a mover id
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("mover ids start at 1")]
pub struct InvalidMoverId;

impl TryFrom<u16> for MoverId {
    type Error = InvalidMoverId;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(InvalidMoverId)
    }
}

impl From<MoverId> for u16 {
    fn from(id: MoverId) -> Self {
        id.0
    }
}

/// Target of a table-wide command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every mover on the table
    All,
    /// A single mover
    Mover(MoverId),
}

/// Levitation command option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevitateOption {
    /// Lift movers off the surface
    Levitate,
    /// Put movers down on the surface
    Land,
}

/// Encoded linear motion command for one mover
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMotion {
    /// Correlation label echoed back by the controller (0 = none)
    pub label: u16,
    /// Target mover
    pub mover: MoverId,
    /// Whether `target` is absolute or relative to the current position
    pub mode: PositionMode,
    /// Path interpolation
    pub path: PathType,
    /// Target position (m)
    pub target: Position,
    /// Speed at arrival (m/s)
    pub final_speed_mps: f32,
    /// Cruise speed (m/s)
    pub max_speed_mps: f32,
    /// Maximum acceleration (m/s²)
    pub max_accel_mps2: f32,
}

/// Result of querying the mover population
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoverIdReport {
    /// Return code of the query
    pub code: ResultCode,
    /// Reported mover identities
    pub ids: Vec<MoverId, MAX_MOVERS>,
    /// Mover count as reported by the controller
    pub count: u8,
}

impl MoverIdReport {
    /// Successful report; the count is taken from the id list
    pub fn ok(ids: Vec<MoverId, MAX_MOVERS>) -> Self {
        let count = ids.len() as u8;
        Self {
            code: ResultCode::AllOk,
            ids,
            count,
        }
    }

    /// Failed report carrying no ids
    pub fn failed(code: ResultCode) -> Self {
        Self {
            code,
            ids: Vec::new(),
            count: 0,
        }
    }
}

/// Motor controller capability
///
/// All calls are synchronous request/response; the caller decides when to
/// wait between them.
pub trait HardwareLink {
    /// Discover the controller on the network and connect to it
    ///
    /// Returns false if no controller could be reached. Any retrying is
    /// the implementation's concern.
    fn connect(&self) -> bool;

    /// Request mastership (exclusive control authority)
    fn gain_authority(&self) -> ResultCode;

    /// Read the current controller mode
    fn controller_mode(&self) -> ControllerMode;

    /// Activate every mover on the table
    fn activate_all(&self) -> ResultCode;

    /// Read the set of mover identities
    fn mover_ids(&self) -> MoverIdReport;

    /// Stop motion for the given scope
    fn stop_motion(&self, scope: Scope);

    /// Read one mover's state
    fn mover_state(&self, id: MoverId) -> MoverState;

    /// Levitate or land movers
    fn levitate(&self, scope: Scope, option: LevitateOption) -> ResultCode;

    /// Issue a linear motion command
    fn linear_motion(&self, command: &LinearMotion) -> ResultCode;
}
