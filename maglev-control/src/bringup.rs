//! Startup orchestrator
//!
//! Drives the bring-up state machine against a hardware link: connect,
//! gain mastership, wait for an operational controller, verify the mover
//! population, then levitate every mover.
//!
//! Both waits poll with a fixed sleep between reads. Neither has an
//! iteration limit; commands inside them are gated by one-shot interlocks,
//! and the whole run races an abort signal and an optional wall-clock
//! bound so a controller stuck in a transitional mode cannot hang the
//! process.

use embassy_futures::select::{select3, Either3};
use embassy_time::Timer;
use heapless::Vec;
use maglev_core::config::BringUpConfig;
use maglev_core::registry::{MoverRegistry, RegistryError};
use maglev_core::safety::CommandInterlock;
use maglev_core::state::{BringUpState, Event, FailReason, LevitationSurvey, Verdict};
use maglev_core::traits::{HardwareLink, LevitateOption, ModeClass, MoverId, Scope, MAX_MOVERS};
use tracing::{debug, error, info, warn};

use crate::channels::AbortSignal;

/// Capacity of a bring-up trail: every state at most once
pub const TRAIL_CAPACITY: usize = 8;

/// States visited during a run, in order
pub type Trail = Vec<BringUpState, TRAIL_CAPACITY>;

/// Outcome of a successful bring-up
#[derive(Debug, Clone)]
pub struct BringUpReport {
    /// Movers reported by the controller, all levitating
    pub movers: Vec<MoverId, MAX_MOVERS>,
    /// States visited, ending in Ready
    pub trail: Trail,
    /// Activation commands issued (0 or 1)
    pub activation_attempts: u8,
    /// Levitation commands issued (0 or 1)
    pub levitation_attempts: u8,
}

impl BringUpReport {
    /// Register every reported mover against the link that brought it up
    pub fn populate<'l, L: HardwareLink + ?Sized>(
        &self,
        link: &'l L,
        registry: &mut MoverRegistry<'l, L>,
    ) -> Result<usize, RegistryError> {
        let added = registry.populate(link, &self.movers)?;
        for id in registry.ids() {
            info!(mover = id.get(), "initialised mover");
        }
        Ok(added)
    }
}

/// Failed bring-up
#[derive(Debug, Clone, thiserror::Error)]
#[error("bring-up failed: {reason}")]
pub struct BringUpFailure {
    pub reason: FailReason,
    /// States visited, ending in Failed
    pub trail: Trail,
}

/// One bring-up run
///
/// `run` consumes the orchestrator, so a finished run cannot be resumed or
/// re-entered at an earlier stage; a retry starts over with a new one.
pub struct BringUp<'l, L: HardwareLink + ?Sized> {
    link: &'l L,
    config: BringUpConfig,
    state: BringUpState,
    trail: Trail,
    activation: CommandInterlock,
    levitation: CommandInterlock,
    /// Movers already reported as floating at rest during the levitation wait
    flagged: Vec<MoverId, MAX_MOVERS>,
}

impl<'l, L: HardwareLink + ?Sized> BringUp<'l, L> {
    /// Create a new orchestrator in the Disconnected state
    pub fn new(link: &'l L, config: BringUpConfig) -> Self {
        let mut trail = Trail::new();
        let _ = trail.push(BringUpState::Disconnected);
        Self {
            link,
            config,
            state: BringUpState::Disconnected,
            trail,
            activation: CommandInterlock::new(),
            levitation: CommandInterlock::new(),
            flagged: Vec::new(),
        }
    }

    /// Run bring-up to Ready or Failed
    pub async fn run(mut self, abort: &AbortSignal) -> Result<BringUpReport, BringUpFailure> {
        info!("bring-up starting");

        let limit_ms = self.config.max_duration_ms;
        let deadline = async {
            match limit_ms {
                Some(ms) => Timer::after_millis(ms as u64).await,
                None => core::future::pending::<()>().await,
            }
        };

        let outcome = match select3(self.drive(), abort.wait(), deadline).await {
            Either3::First(result) => result,
            Either3::Second(()) => Err(FailReason::Cancelled),
            Either3::Third(()) => Err(FailReason::TimedOut {
                limit_ms: limit_ms.unwrap_or(0),
            }),
        };

        match outcome {
            Ok(movers) => {
                info!(movers = movers.len(), "bring-up complete");
                Ok(BringUpReport {
                    movers,
                    trail: self.trail,
                    activation_attempts: self.activation.issued(),
                    levitation_attempts: self.levitation.issued(),
                })
            }
            Err(reason) => {
                error!(%reason, stage = ?self.state, "bring-up failed");
                self.apply(Event::Fault(reason));
                Err(BringUpFailure {
                    reason,
                    trail: self.trail,
                })
            }
        }
    }

    async fn drive(&mut self) -> Result<Vec<MoverId, MAX_MOVERS>, FailReason> {
        self.connect()?;
        self.gain_authority()?;
        self.await_operational().await?;
        let movers = self.verify_population()?;
        self.await_levitation(&movers).await?;
        Ok(movers)
    }

    /// Feed an event to the state machine, recording any change
    fn apply(&mut self, event: Event) {
        let next = self.state.transition(event);
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "bring-up state");
            self.state = next;
            let _ = self.trail.push(next);
        }
    }

    fn connect(&mut self) -> Result<(), FailReason> {
        debug!("connecting to controller");
        if !self.link.connect() {
            return Err(FailReason::ConnectError);
        }
        info!("controller connected");
        self.apply(Event::LinkEstablished);
        Ok(())
    }

    fn gain_authority(&mut self) -> Result<(), FailReason> {
        let code = self.link.gain_authority();
        if !code.is_ok() {
            return Err(FailReason::AuthorityError { code });
        }
        info!("mastership gained");
        self.apply(Event::AuthorityGained);
        Ok(())
    }

    async fn await_operational(&mut self) -> Result<(), FailReason> {
        loop {
            let mode = self.link.controller_mode();
            match mode.class() {
                ModeClass::Ready => {
                    info!(?mode, "controller operational");
                    self.apply(Event::Operational);
                    return Ok(());
                }
                ModeClass::Transitional => {
                    debug!(?mode, "controller transitioning");
                }
                ModeClass::NeedsActivation => {
                    if !self.activation.try_acquire() {
                        warn!(
                            ?mode,
                            requests = self.activation.attempts(),
                            "controller still inactive after activation"
                        );
                        return Err(FailReason::ActivationExhausted);
                    }
                    info!(?mode, "activating movers");
                    let code = self.link.activate_all();
                    if !code.is_ok() {
                        return Err(FailReason::ActivationError { code });
                    }
                }
                ModeClass::Unrecognized => return Err(FailReason::UnexpectedMode { mode }),
            }
            Timer::after_millis(self.config.mode_poll_ms as u64).await;
        }
    }

    fn verify_population(&mut self) -> Result<Vec<MoverId, MAX_MOVERS>, FailReason> {
        let report = self.link.mover_ids();
        if !report.code.is_ok() {
            return Err(FailReason::ReadIdsError { code: report.code });
        }

        match self.config.expected_movers {
            Some(expected) if expected != report.count => {
                return Err(FailReason::PopulationMismatch {
                    expected,
                    actual: report.count,
                });
            }
            Some(_) => {}
            None => debug!("mover count unchecked"),
        }

        // Known baseline before anything is levitated
        self.link.stop_motion(Scope::All);
        info!(count = report.count, "mover population verified");
        self.apply(Event::PopulationVerified);
        Ok(report.ids)
    }

    async fn await_levitation(&mut self, movers: &[MoverId]) -> Result<(), FailReason> {
        self.apply(Event::LevitationStarted);
        loop {
            let mut survey = LevitationSurvey::new();
            for &id in movers {
                let state = self.link.mover_state(id);
                survey.record(id, state)?;
            }
            for &id in survey.settled() {
                self.flag_settled(id);
            }

            match survey.verdict() {
                Verdict::AllLevitated => {
                    info!("all movers levitating");
                    self.apply(Event::AllLevitated);
                    return Ok(());
                }
                Verdict::Transitioning => {
                    debug!("movers transitioning");
                }
                Verdict::NeedsLevitation => {
                    if !self.levitation.try_acquire() {
                        warn!(
                            grounded = survey.grounded(),
                            requests = self.levitation.attempts(),
                            "movers still landed after levitation"
                        );
                        return Err(FailReason::LevitationExhausted);
                    }
                    info!(grounded = survey.grounded(), "levitating movers");
                    let code = self.link.levitate(Scope::All, LevitateOption::Levitate);
                    if !code.is_ok() {
                        return Err(FailReason::LevitationError { code });
                    }
                }
            }
            Timer::after_millis(self.config.levitation_poll_ms as u64).await;
        }
    }

    /// Idle and Stopped count as levitated; say so once per mover
    fn flag_settled(&mut self, id: MoverId) {
        if self.flagged.contains(&id) {
            return;
        }
        warn!(
            mover = id.get(),
            "mover already at rest while waiting for levitation; counting it as levitated"
        );
        let _ = self.flagged.push(id);
    }
}
