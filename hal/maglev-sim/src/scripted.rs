//! Scripted hardware link
//!
//! Every query answers from a script, and every call is recorded. Scripted
//! sequences advance one entry per read and repeat their last entry once
//! exhausted, so `[Inactive, FullControl]` reads as "inactive once, then
//! full control forever".
//!
//! Mover states have two sequences: one reported before the first levitate
//! command and one after it. A mover with no script reports `Landed`
//! before levitation and `Idle` after.

use core::cell::RefCell;
use std::collections::BTreeMap;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;
use maglev_core::traits::{
    ControllerMode, HardwareLink, LevitateOption, LinearMotion, MoverId, MoverIdReport, MoverState,
    ResultCode, Scope, MAX_MOVERS,
};

/// Calls made against a [`ScriptedLink`]
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    pub connects: u32,
    pub authority_requests: u32,
    pub mode_reads: u32,
    pub activations: u32,
    pub id_reads: u32,
    pub state_reads: u32,
    pub stops: Vec<Scope>,
    pub levitations: Vec<(Scope, LevitateOption)>,
    /// Motion commands with the instant each was received
    pub motions: Vec<(Instant, LinearMotion)>,
}

impl CallLog {
    /// Number of levitate (not land) commands
    pub fn levitate_commands(&self) -> usize {
        self.levitations
            .iter()
            .filter(|(_, option)| *option == LevitateOption::Levitate)
            .count()
    }
}

/// Sequence that repeats its last entry
#[derive(Debug, Clone)]
struct Sequence<T: Copy> {
    entries: Vec<T>,
    cursor: usize,
}

impl<T: Copy> Sequence<T> {
    fn new(entries: &[T]) -> Self {
        Self {
            entries: entries.to_vec(),
            cursor: 0,
        }
    }

    fn next(&mut self) -> Option<T> {
        let entry = self.entries.get(self.cursor).or(self.entries.last()).copied();
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
        entry
    }
}

#[derive(Debug, Clone)]
struct MoverScript {
    before: Sequence<MoverState>,
    after: Sequence<MoverState>,
}

struct Script {
    reachable: bool,
    authority: ResultCode,
    modes: Sequence<ControllerMode>,
    activation: ResultCode,
    ids: MoverIdReport,
    movers: BTreeMap<MoverId, MoverScript>,
    levitation: ResultCode,
    motion: ResultCode,
    levitated: bool,
    calls: CallLog,
}

/// Hardware link that replays a script
pub struct ScriptedLink {
    script: Mutex<CriticalSectionRawMutex, RefCell<Script>>,
}

impl Default for ScriptedLink {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLink {
    /// Link that accepts everything and reports full control with no movers
    pub fn new() -> Self {
        Self {
            script: Mutex::new(RefCell::new(Script {
                reachable: true,
                authority: ResultCode::AllOk,
                modes: Sequence::new(&[ControllerMode::FullControl]),
                activation: ResultCode::AllOk,
                ids: MoverIdReport::ok(heapless::Vec::new()),
                movers: BTreeMap::new(),
                levitation: ResultCode::AllOk,
                motion: ResultCode::AllOk,
                levitated: false,
                calls: CallLog::default(),
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        self.script.lock(|cell| f(&mut cell.borrow_mut()))
    }

    fn edit(self, f: impl FnOnce(&mut Script)) -> Self {
        self.with(f);
        self
    }

    /// Controller does not answer discovery
    pub fn unreachable(self) -> Self {
        self.edit(|s| s.reachable = false)
    }

    /// Answer to the mastership request
    pub fn authority(self, code: ResultCode) -> Self {
        self.edit(|s| s.authority = code)
    }

    /// Controller modes, one per read; the last repeats
    pub fn modes(self, modes: &[ControllerMode]) -> Self {
        self.edit(|s| s.modes = Sequence::new(modes))
    }

    /// Answer to the activation command
    pub fn activation(self, code: ResultCode) -> Self {
        self.edit(|s| s.activation = code)
    }

    /// Successful id report with the given raw ids; zero ids are skipped
    pub fn ids(self, raw: &[u16]) -> Self {
        let ids: heapless::Vec<MoverId, MAX_MOVERS> = raw.iter().filter_map(|&r| MoverId::new(r)).collect();
        self.edit(|s| s.ids = MoverIdReport::ok(ids))
    }

    /// Id report as given
    pub fn ids_report(self, report: MoverIdReport) -> Self {
        self.edit(|s| s.ids = report)
    }

    /// States reported by one mover before and after the first levitate command
    pub fn mover(self, raw: u16, before: &[MoverState], after: &[MoverState]) -> Self {
        let Some(id) = MoverId::new(raw) else {
            return self;
        };
        self.edit(|s| {
            s.movers.insert(
                id,
                MoverScript {
                    before: Sequence::new(before),
                    after: Sequence::new(after),
                },
            );
        })
    }

    /// Answer to levitation commands
    pub fn levitation(self, code: ResultCode) -> Self {
        self.edit(|s| s.levitation = code)
    }

    /// Answer to motion commands
    pub fn motion(self, code: ResultCode) -> Self {
        self.edit(|s| s.motion = code)
    }

    /// Snapshot of the calls made so far
    pub fn calls(&self) -> CallLog {
        self.with(|s| s.calls.clone())
    }
}

impl HardwareLink for ScriptedLink {
    fn connect(&self) -> bool {
        self.with(|s| {
            s.calls.connects += 1;
            s.reachable
        })
    }

    fn gain_authority(&self) -> ResultCode {
        self.with(|s| {
            s.calls.authority_requests += 1;
            s.authority
        })
    }

    fn controller_mode(&self) -> ControllerMode {
        self.with(|s| {
            s.calls.mode_reads += 1;
            s.modes.next().unwrap_or(ControllerMode::FullControl)
        })
    }

    fn activate_all(&self) -> ResultCode {
        self.with(|s| {
            s.calls.activations += 1;
            s.activation
        })
    }

    fn mover_ids(&self) -> MoverIdReport {
        self.with(|s| {
            s.calls.id_reads += 1;
            s.ids.clone()
        })
    }

    fn stop_motion(&self, scope: Scope) {
        self.with(|s| s.calls.stops.push(scope));
    }

    fn mover_state(&self, id: MoverId) -> MoverState {
        self.with(|s| {
            s.calls.state_reads += 1;
            let levitated = s.levitated;
            let fallback = if levitated {
                MoverState::Idle
            } else {
                MoverState::Landed
            };
            match s.movers.get_mut(&id) {
                Some(script) if levitated => script.after.next().unwrap_or(fallback),
                Some(script) => script.before.next().unwrap_or(fallback),
                None => fallback,
            }
        })
    }

    fn levitate(&self, scope: Scope, option: LevitateOption) -> ResultCode {
        self.with(|s| {
            s.calls.levitations.push((scope, option));
            if option == LevitateOption::Levitate && s.levitation.is_ok() {
                s.levitated = true;
            }
            s.levitation
        })
    }

    fn linear_motion(&self, command: &LinearMotion) -> ResultCode {
        self.with(|s| {
            s.calls.motions.push((Instant::now(), *command));
            s.motion
        })
    }
}
