//! Motion dispatcher
//!
//! Each `move_to` issues one linear motion command and then waits out the
//! settle time locally. Nothing is serialized: calls for different movers,
//! or for the same mover, may be in flight together, and a caller that
//! needs a barrier joins the futures it started.

use core::sync::atomic::{AtomicUsize, Ordering};

use embassy_time::{Duration, Instant, Timer};
use maglev_core::config::DispatchConfig;
use maglev_core::motion::{MotionCommand, MotionOptions, OptionsError, Position};
use maglev_core::registry::MoverRegistry;
use maglev_core::traits::{HardwareLink, MoverId, ResultCode, Scope};
use tracing::{debug, info, warn};

/// Why a move was not carried out
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// Mover unknown or has no link; nothing was sent
    #[error("mover {mover} has no bound link")]
    NoLinkBound { mover: MoverId },
    /// Motion options rejected before sending
    #[error("invalid motion options for mover {mover}: {error}")]
    InvalidOptions { mover: MoverId, error: OptionsError },
    /// Controller rejected the command
    #[error("controller rejected motion for mover {mover} ({code:?})")]
    Hardware { mover: MoverId, code: ResultCode },
}

impl DispatchError {
    /// Mover the failed move was aimed at
    pub fn mover(&self) -> MoverId {
        match self {
            Self::NoLinkBound { mover }
            | Self::InvalidOptions { mover, .. }
            | Self::Hardware { mover, .. } => *mover,
        }
    }
}

/// A completed move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveReceipt {
    pub mover: MoverId,
    pub target: Position,
    /// When the command was handed to the link
    pub issued_at: Instant,
    /// When the settle time ran out
    pub settled_at: Instant,
}

/// Counts an operation as outstanding for as long as it lives
///
/// Dropping a `move_to` future mid-settle drops the guard with it.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Issues motion commands to registered movers
pub struct MotionDispatcher<'r, 'l, L: HardwareLink + ?Sized> {
    link: &'l L,
    registry: &'r MoverRegistry<'l, L>,
    settle: Duration,
    defaults: MotionOptions,
    outstanding: AtomicUsize,
}

impl<'r, 'l, L: HardwareLink + ?Sized> MotionDispatcher<'r, 'l, L> {
    /// Create a dispatcher over a populated registry
    pub fn new(link: &'l L, registry: &'r MoverRegistry<'l, L>, config: &DispatchConfig) -> Self {
        Self {
            link,
            registry,
            settle: Duration::from_millis(config.settle_ms as u64),
            defaults: config.motion,
            outstanding: AtomicUsize::new(0),
        }
    }

    /// Settle time applied after every command
    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Options from the dispatch configuration
    pub fn defaults(&self) -> &MotionOptions {
        &self.defaults
    }

    /// Number of moves issued but not yet settled
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }

    /// Send a mover to a target and wait the settle time
    ///
    /// The command is issued before the wait begins. A mover that is not
    /// registered, or is registered without a link, is reported with
    /// `NoLinkBound` and nothing is sent.
    pub async fn move_to(
        &self,
        mover: MoverId,
        target: Position,
        options: &MotionOptions,
    ) -> Result<MoveReceipt, DispatchError> {
        let Some(link) = self.registry.get(mover).ok().and_then(|m| m.link()) else {
            warn!(mover = mover.get(), "no link bound, motion skipped");
            return Err(DispatchError::NoLinkBound { mover });
        };
        if let Err(error) = options.validate() {
            warn!(mover = mover.get(), %error, "motion options rejected");
            return Err(DispatchError::InvalidOptions { mover, error });
        }

        let _in_flight = InFlight::enter(&self.outstanding);
        let command = MotionCommand::new(mover, target, *options);
        let code = link.linear_motion(&command.encode());
        let issued_at = Instant::now();
        if !code.is_ok() {
            warn!(mover = mover.get(), ?code, "motion rejected by controller");
            return Err(DispatchError::Hardware { mover, code });
        }
        debug!(mover = mover.get(), x = target.x, y = target.y, "motion issued");

        Timer::after(self.settle).await;
        Ok(MoveReceipt {
            mover,
            target,
            issued_at,
            settled_at: Instant::now(),
        })
    }

    /// Stop every mover on the table
    pub fn stop_all(&self) {
        info!("stopping all movers");
        self.link.stop_motion(Scope::All);
    }
}
