//! Choreography driver
//!
//! Runs a routine beat by beat. Every move of a beat is started at once
//! and the beat only ends when all of them have settled; the dwell time
//! then runs before the next beat starts.

use embassy_time::Timer;
use futures::future::join_all;
use maglev_core::choreography::Routine;
use maglev_core::motion::MotionOptions;
use maglev_core::traits::HardwareLink;
use tracing::{debug, info, warn};

use crate::dispatch::{DispatchError, MotionDispatcher};

/// Tally of a choreography run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChoreographyReport {
    /// Beats run
    pub beats: u32,
    /// Moves attempted
    pub issued: u32,
    /// Moves that settled
    pub completed: u32,
    /// Moves aimed at movers with no link
    pub skipped: u32,
    /// Moves refused for invalid options or by the controller
    pub rejected: u32,
}

impl ChoreographyReport {
    /// Check if every attempted move settled
    pub fn is_clean(&self) -> bool {
        self.completed == self.issued
    }
}

/// Drives routines through a dispatcher
pub struct Choreographer<'d, 'r, 'l, L: HardwareLink + ?Sized> {
    dispatcher: &'d MotionDispatcher<'r, 'l, L>,
    options: MotionOptions,
}

impl<'d, 'r, 'l, L: HardwareLink + ?Sized> Choreographer<'d, 'r, 'l, L> {
    /// Create a choreographer using the given options for every move
    pub fn new(dispatcher: &'d MotionDispatcher<'r, 'l, L>, options: MotionOptions) -> Self {
        Self { dispatcher, options }
    }

    /// Run every cycle of a routine
    ///
    /// Failed moves are counted and the run continues.
    pub async fn run(&self, routine: &Routine) -> ChoreographyReport {
        let mut report = ChoreographyReport::default();
        info!(
            cycles = routine.cycles,
            beats_per_cycle = routine.beats_per_cycle(),
            routes = routine.routes.len(),
            "choreography starting"
        );

        let total = routine.total_beats();
        for beat in 0..total {
            let moves: Vec<_> = routine
                .targets(beat)
                .map(|(mover, target)| self.dispatcher.move_to(mover, target, &self.options))
                .collect();
            report.issued += moves.len() as u32;

            for result in join_all(moves).await {
                match result {
                    Ok(_) => report.completed += 1,
                    Err(DispatchError::NoLinkBound { .. }) => report.skipped += 1,
                    Err(error) => {
                        warn!(%error, beat, "move failed");
                        report.rejected += 1;
                    }
                }
            }
            report.beats += 1;
            debug!(beat, "beat settled");

            // No dwell after the last beat
            if routine.dwell_ms > 0 && beat + 1 < total {
                Timer::after_millis(routine.dwell_ms as u64).await;
            }
        }

        info!(
            beats = report.beats,
            completed = report.completed,
            skipped = report.skipped,
            rejected = report.rejected,
            "choreography finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use maglev_core::choreography::Route;
    use maglev_core::config::DispatchConfig;
    use maglev_core::motion::{Position, OUTER_CORNERS};
    use maglev_core::registry::MoverRegistry;
    use maglev_core::traits::MoverId;
    use maglev_sim::ScriptedLink;

    fn id(raw: u16) -> MoverId {
        MoverId::new(raw).unwrap()
    }

    fn dispatch(settle_ms: u32) -> DispatchConfig {
        DispatchConfig {
            settle_ms,
            ..DispatchConfig::default()
        }
    }

    #[test]
    fn test_every_mover_gets_every_beat_in_order() {
        let link = ScriptedLink::new();
        let mut registry = MoverRegistry::new();
        registry.populate(&link, &[id(1), id(2)]).unwrap();
        let dispatcher = MotionDispatcher::new(&link, &registry, &dispatch(5));

        let mut routine = Routine::new(2, 0);
        routine.push(Route::new(id(1), &OUTER_CORNERS).unwrap()).unwrap();
        routine
            .push(Route::new(id(2), &[Position::new(0.3, 0.3), Position::new(0.42, 0.3)]).unwrap())
            .unwrap();

        let report = block_on(Choreographer::new(&dispatcher, MotionOptions::default()).run(&routine));
        assert_eq!(report.beats, 8);
        assert_eq!(report.issued, 16);
        assert!(report.is_clean());

        let calls = link.calls();
        let first: Vec<_> = calls
            .motions
            .iter()
            .filter(|(_, m)| m.mover == id(1))
            .map(|(_, m)| m.target)
            .collect();
        let expected: Vec<_> = OUTER_CORNERS.iter().chain(OUTER_CORNERS.iter()).copied().collect();
        assert_eq!(first, expected);

        let second: Vec<_> = calls
            .motions
            .iter()
            .filter(|(_, m)| m.mover == id(2))
            .map(|(_, m)| m.target.x)
            .collect();
        assert_eq!(second, [0.3_f32, 0.42, 0.3, 0.42, 0.3, 0.42, 0.3, 0.42]);
    }

    #[test]
    fn test_unbound_mover_does_not_stop_the_run() {
        let link = ScriptedLink::new();
        let mut registry = MoverRegistry::new();
        registry.register(id(1), Some(&link)).unwrap();
        registry.register(id(2), None).unwrap();
        let dispatcher = MotionDispatcher::new(&link, &registry, &dispatch(5));

        let mut routine = Routine::new(1, 5);
        routine.push(Route::new(id(1), &OUTER_CORNERS).unwrap()).unwrap();
        routine.push(Route::new(id(2), &OUTER_CORNERS).unwrap()).unwrap();

        let report = block_on(Choreographer::new(&dispatcher, MotionOptions::default()).run(&routine));
        assert_eq!(report.beats, 4);
        assert_eq!(report.completed, 4);
        assert_eq!(report.skipped, 4);
        assert_eq!(report.rejected, 0);
        assert!(!report.is_clean());
        assert_eq!(link.calls().motions.len(), 4);
    }

    #[test]
    fn test_beats_wait_for_all_moves() {
        let link = ScriptedLink::new();
        let mut registry = MoverRegistry::new();
        registry.populate(&link, &[id(1), id(2)]).unwrap();
        let dispatcher = MotionDispatcher::new(&link, &registry, &dispatch(30));

        let mut routine = Routine::new(1, 0);
        routine.push(Route::new(id(1), &OUTER_CORNERS[..2]).unwrap()).unwrap();
        routine.push(Route::new(id(2), &OUTER_CORNERS[2..]).unwrap()).unwrap();

        block_on(Choreographer::new(&dispatcher, MotionOptions::default()).run(&routine));

        // Second beat is issued only after both first-beat moves settled
        let calls = link.calls();
        assert_eq!(calls.motions.len(), 4);
        let first_beat_last = calls.motions[0].0.max(calls.motions[1].0);
        let second_beat_first = calls.motions[2].0.min(calls.motions[3].0);
        assert!(second_beat_first - first_beat_last >= embassy_time::Duration::from_millis(30));
    }

    #[test]
    fn test_dwell_only_between_beats() {
        let link = ScriptedLink::new();
        let mut registry = MoverRegistry::new();
        registry.populate(&link, &[id(1)]).unwrap();
        let dispatcher = MotionDispatcher::new(&link, &registry, &dispatch(5));

        let mut routine = Routine::new(1, 200);
        routine.push(Route::new(id(1), &OUTER_CORNERS[..2]).unwrap()).unwrap();

        let started = embassy_time::Instant::now();
        let report = block_on(Choreographer::new(&dispatcher, MotionOptions::default()).run(&routine));
        let elapsed = started.elapsed();

        assert_eq!(report.beats, 2);
        let calls = link.calls();
        assert!(calls.motions[1].0 - calls.motions[0].0 >= embassy_time::Duration::from_millis(205));
        // One dwell, not two
        assert!(elapsed < embassy_time::Duration::from_millis(400));
    }
}
