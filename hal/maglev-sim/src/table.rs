//! Simulated planar mover table
//!
//! Controller and movers advance one step per status read: a controller
//! mode read moves booting and activation along, a mover state read moves
//! that mover's discovery or motion along.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;
use maglev_core::motion::{Position, PositionMode, TableGeometry};
use maglev_core::traits::{
    ControllerMode, HardwareLink, LevitateOption, LinearMotion, MoverId, MoverIdReport, MoverState,
    ResultCode, Scope, MAX_MOVERS,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Simulated table parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of movers on the table
    pub movers: u8,
    /// Whether the controller answers discovery
    pub reachable: bool,
    /// Mode reads spent booting
    pub boot_polls: u8,
    /// Mode reads spent activating
    pub activation_polls: u8,
    /// State reads a mover spends discovering after a levitate command
    pub discovery_polls: u8,
    /// State reads a mover spends in motion after a motion command
    pub motion_polls: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            movers: 2,
            reachable: true,
            boot_polls: 1,
            activation_polls: 2,
            discovery_polls: 2,
            motion_polls: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControllerPhase {
    Booting(u8),
    Inactive,
    Activating(u8),
    FullControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoverPhase {
    Landed,
    Lifting(u8),
    Idle,
    Moving(u8),
}

#[derive(Debug, Clone, Copy)]
struct SimMover {
    id: MoverId,
    phase: MoverPhase,
    position: Position,
}

struct TableState {
    connected: bool,
    master: bool,
    controller: ControllerPhase,
    movers: Vec<SimMover, MAX_MOVERS>,
}

impl TableState {
    fn mover_mut(&mut self, id: MoverId) -> Option<&mut SimMover> {
        self.movers.iter_mut().find(|m| m.id == id)
    }

    fn in_scope(scope: Scope, id: MoverId) -> bool {
        match scope {
            Scope::All => true,
            Scope::Mover(target) => target == id,
        }
    }
}

/// Simulated controller with its movers
pub struct SimTable {
    config: SimConfig,
    state: Mutex<CriticalSectionRawMutex, RefCell<TableState>>,
}

impl SimTable {
    /// Create a table with movers parked on the tile centers of the first rows
    pub fn new(config: SimConfig, geometry: &TableGeometry) -> Self {
        let mut movers = Vec::new();
        let columns = geometry.columns.max(1) as u16;
        let count = (config.movers as usize).min(MAX_MOVERS) as u16;
        for raw in 1..=count {
            let index = raw - 1;
            let Some(id) = MoverId::new(raw) else { continue };
            let position = geometry
                .tile_center((index % columns) as u8, (index / columns) as u8)
                .unwrap_or_default();
            let _ = movers.push(SimMover {
                id,
                phase: MoverPhase::Landed,
                position,
            });
        }

        Self {
            config,
            state: Mutex::new(RefCell::new(TableState {
                connected: false,
                master: false,
                controller: ControllerPhase::Booting(config.boot_polls),
                movers,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut TableState) -> R) -> R {
        self.state.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Last commanded position of a mover
    pub fn position(&self, id: MoverId) -> Option<Position> {
        self.with(|state| state.mover_mut(id).map(|m| m.position))
    }
}

impl HardwareLink for SimTable {
    fn connect(&self) -> bool {
        if !self.config.reachable {
            debug!("sim: controller does not answer");
            return false;
        }
        self.with(|state| state.connected = true);
        true
    }

    fn gain_authority(&self) -> ResultCode {
        self.with(|state| {
            if !state.connected {
                return ResultCode::SystemError;
            }
            state.master = true;
            ResultCode::AllOk
        })
    }

    fn controller_mode(&self) -> ControllerMode {
        self.with(|state| match state.controller {
            ControllerPhase::Booting(0) => {
                state.controller = ControllerPhase::Inactive;
                ControllerMode::Inactive
            }
            ControllerPhase::Booting(left) => {
                state.controller = ControllerPhase::Booting(left - 1);
                ControllerMode::Booting
            }
            ControllerPhase::Inactive => ControllerMode::Inactive,
            ControllerPhase::Activating(0) => {
                state.controller = ControllerPhase::FullControl;
                ControllerMode::FullControl
            }
            ControllerPhase::Activating(left) => {
                state.controller = ControllerPhase::Activating(left - 1);
                ControllerMode::Activating
            }
            ControllerPhase::FullControl => ControllerMode::FullControl,
        })
    }

    fn activate_all(&self) -> ResultCode {
        let activation_polls = self.config.activation_polls;
        self.with(|state| {
            if !state.master {
                return ResultCode::NoMastership;
            }
            match state.controller {
                ControllerPhase::Inactive => {
                    debug!("sim: activating movers");
                    state.controller = ControllerPhase::Activating(activation_polls);
                    ResultCode::AllOk
                }
                ControllerPhase::Activating(_) | ControllerPhase::FullControl => ResultCode::AllOk,
                ControllerPhase::Booting(_) => ResultCode::WrongControllerState,
            }
        })
    }

    fn mover_ids(&self) -> MoverIdReport {
        self.with(|state| {
            if state.controller != ControllerPhase::FullControl {
                return MoverIdReport::failed(ResultCode::WrongControllerState);
            }
            MoverIdReport::ok(state.movers.iter().map(|m| m.id).collect())
        })
    }

    fn stop_motion(&self, scope: Scope) {
        self.with(|state| {
            for mover in state.movers.iter_mut() {
                if TableState::in_scope(scope, mover.id) && matches!(mover.phase, MoverPhase::Moving(_)) {
                    mover.phase = MoverPhase::Idle;
                }
            }
        });
    }

    fn mover_state(&self, id: MoverId) -> MoverState {
        self.with(|state| {
            let Some(mover) = state.mover_mut(id) else {
                return MoverState::Unrecognized(0);
            };
            match mover.phase {
                MoverPhase::Landed => MoverState::Landed,
                MoverPhase::Lifting(0) | MoverPhase::Moving(0) => {
                    mover.phase = MoverPhase::Idle;
                    MoverState::Idle
                }
                MoverPhase::Lifting(left) => {
                    mover.phase = MoverPhase::Lifting(left - 1);
                    MoverState::Discovering
                }
                MoverPhase::Idle => MoverState::Idle,
                MoverPhase::Moving(left) => {
                    mover.phase = MoverPhase::Moving(left - 1);
                    MoverState::InMotion
                }
            }
        })
    }

    fn levitate(&self, scope: Scope, option: LevitateOption) -> ResultCode {
        let discovery_polls = self.config.discovery_polls;
        self.with(|state| {
            if !state.master {
                return ResultCode::NoMastership;
            }
            if state.controller != ControllerPhase::FullControl {
                return ResultCode::WrongControllerState;
            }
            for mover in state.movers.iter_mut() {
                if !TableState::in_scope(scope, mover.id) {
                    continue;
                }
                mover.phase = match (option, mover.phase) {
                    (LevitateOption::Levitate, MoverPhase::Landed) => MoverPhase::Lifting(discovery_polls),
                    (LevitateOption::Levitate, phase) => phase,
                    (LevitateOption::Land, _) => MoverPhase::Landed,
                };
            }
            debug!(?scope, ?option, "sim: levitation command");
            ResultCode::AllOk
        })
    }

    fn linear_motion(&self, command: &LinearMotion) -> ResultCode {
        let motion_polls = self.config.motion_polls;
        self.with(|state| {
            if state.controller != ControllerPhase::FullControl {
                return ResultCode::WrongControllerState;
            }
            let Some(mover) = state.mover_mut(command.mover) else {
                return ResultCode::InvalidParameter;
            };
            if matches!(mover.phase, MoverPhase::Landed | MoverPhase::Lifting(_)) {
                return ResultCode::WrongMoverState;
            }
            mover.position = match command.mode {
                PositionMode::Absolute => command.target,
                PositionMode::Relative => mover.position.offset(command.target),
            };
            mover.phase = MoverPhase::Moving(motion_polls);
            debug!(
                mover = command.mover.get(),
                x = mover.position.x,
                y = mover.position.y,
                "sim: linear motion"
            );
            ResultCode::AllOk
        })
    }
}
