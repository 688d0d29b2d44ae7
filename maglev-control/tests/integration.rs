//! Integration tests for bring-up and concurrent dispatch

use embassy_futures::block_on;
use embassy_futures::join::join;
use embassy_time::{Duration, Instant, Timer};

use maglev_control::bringup::BringUp;
use maglev_control::channels::AbortSignal;
use maglev_control::{Choreographer, DispatchError, MotionDispatcher};
use maglev_core::choreography::{Route, Routine};
use maglev_core::config::{BringUpConfig, DispatchConfig};
use maglev_core::motion::{MotionOptions, Position, TableGeometry, TEST_STATIONS};
use maglev_core::registry::MoverRegistry;
use maglev_core::state::{BringUpState, FailReason};
use maglev_core::traits::{ControllerMode, MoverId, MoverState};
use maglev_sim::{ScriptedLink, SimConfig, SimTable};

fn id(raw: u16) -> MoverId {
    MoverId::new(raw).unwrap()
}

fn fast_bring_up() -> BringUpConfig {
    BringUpConfig {
        expected_movers: None,
        mode_poll_ms: 5,
        levitation_poll_ms: 5,
        max_duration_ms: Some(5_000),
    }
}

fn settle(ms: u32) -> DispatchConfig {
    DispatchConfig {
        settle_ms: ms,
        ..DispatchConfig::default()
    }
}

#[test]
fn test_end_to_end_scripted_bring_up() {
    let link = ScriptedLink::new()
        .modes(&[ControllerMode::Inactive, ControllerMode::FullControl])
        .ids(&[1, 2])
        .mover(1, &[MoverState::Landed], &[MoverState::Idle])
        .mover(2, &[MoverState::Landed], &[MoverState::Idle]);
    let abort = AbortSignal::new();

    let report = block_on(BringUp::new(&link, fast_bring_up()).run(&abort)).unwrap();
    assert_eq!(report.trail.last(), Some(&BringUpState::Ready));
    assert_eq!(report.activation_attempts, 1);
    assert_eq!(report.levitation_attempts, 1);

    let calls = link.calls();
    assert_eq!(calls.connects, 1);
    assert_eq!(calls.authority_requests, 1);
    assert_eq!(calls.activations, 1);
    assert_eq!(calls.levitate_commands(), 1);

    let mut registry = MoverRegistry::new();
    assert_eq!(report.populate(&link, &mut registry).unwrap(), 2);
    let ids: Vec<_> = registry.ids().collect();
    assert_eq!(ids, [id(1), id(2)]);
    assert!(registry.all().iter().all(|m| m.is_bound()));
}

#[test]
fn test_activation_is_attempted_once() {
    let link = ScriptedLink::new().modes(&[ControllerMode::Inactive]).ids(&[1]);
    let abort = AbortSignal::new();

    let failure = block_on(BringUp::new(&link, fast_bring_up()).run(&abort)).unwrap_err();
    assert_eq!(failure.reason, FailReason::ActivationExhausted);
    assert_eq!(link.calls().activations, 1);
    assert_eq!(link.calls().id_reads, 0);
}

#[test]
fn test_levitation_is_attempted_once() {
    let link = ScriptedLink::new()
        .ids(&[1, 2])
        .mover(2, &[MoverState::Landed], &[MoverState::Landed]);
    let abort = AbortSignal::new();

    let failure = block_on(BringUp::new(&link, fast_bring_up()).run(&abort)).unwrap_err();
    assert_eq!(failure.reason, FailReason::LevitationExhausted);
    assert_eq!(link.calls().levitate_commands(), 1);
}

#[test]
fn test_population_mismatch() {
    let link = ScriptedLink::new().ids(&[1, 2]);
    let abort = AbortSignal::new();
    let config = BringUpConfig {
        expected_movers: Some(3),
        ..fast_bring_up()
    };

    let failure = block_on(BringUp::new(&link, config).run(&abort)).unwrap_err();
    assert_eq!(
        failure.reason,
        FailReason::PopulationMismatch {
            expected: 3,
            actual: 2
        }
    );
    assert!(link.calls().stops.is_empty());
    assert_eq!(link.calls().levitate_commands(), 0);
}

#[test]
fn test_trail_only_moves_forward() {
    let link = ScriptedLink::new()
        .modes(&[
            ControllerMode::Booting,
            ControllerMode::Inactive,
            ControllerMode::Activating,
            ControllerMode::Activating,
            ControllerMode::FullControl,
        ])
        .ids(&[1, 2, 3])
        .mover(
            3,
            &[MoverState::Landed],
            &[MoverState::Discovering, MoverState::Discovering, MoverState::Idle],
        );
    let abort = AbortSignal::new();

    let report = block_on(BringUp::new(&link, fast_bring_up()).run(&abort)).unwrap();
    assert_eq!(
        report.trail.as_slice(),
        &[
            BringUpState::Disconnected,
            BringUpState::LinkEstablished,
            BringUpState::AuthorityGained,
            BringUpState::Operational,
            BringUpState::PopulationVerified,
            BringUpState::Levitating,
            BringUpState::Ready,
        ]
    );
    assert!(report.trail.windows(2).all(|w| w[0].stage() < w[1].stage()));
    assert_eq!(link.calls().mode_reads, 5);
}

#[test]
fn test_abort_cancels_stuck_bring_up() {
    let link = ScriptedLink::new().modes(&[ControllerMode::Booting]);
    let abort = AbortSignal::new();
    let config = BringUpConfig {
        max_duration_ms: None,
        ..fast_bring_up()
    };

    let (result, ()) = block_on(join(BringUp::new(&link, config).run(&abort), async {
        Timer::after_millis(30).await;
        abort.signal(());
    }));
    let failure = result.unwrap_err();
    assert_eq!(failure.reason, FailReason::Cancelled);
    assert_eq!(
        failure.trail.last(),
        Some(&BringUpState::Failed(FailReason::Cancelled))
    );
    assert!(link.calls().mode_reads > 1);
}

#[test]
fn test_unbound_mover_is_soft_failure() {
    let link = ScriptedLink::new();
    let mut registry = MoverRegistry::new();
    registry.register(id(1), None).unwrap();
    registry.register(id(2), Some(&link)).unwrap();
    let dispatcher = MotionDispatcher::new(&link, &registry, &settle(5));
    let options = MotionOptions::default();

    let skipped = block_on(dispatcher.move_to(id(1), Position::new(0.3, 0.3), &options));
    assert_eq!(skipped, Err(DispatchError::NoLinkBound { mover: id(1) }));

    let moved = block_on(dispatcher.move_to(id(2), Position::new(0.3, 0.3), &options)).unwrap();
    assert_eq!(moved.mover, id(2));
    assert_eq!(link.calls().motions.len(), 1);
}

#[test]
fn test_settle_follows_issue() {
    let link = ScriptedLink::new();
    let mut registry = MoverRegistry::new();
    registry.register(id(1), Some(&link)).unwrap();
    let dispatcher = MotionDispatcher::new(&link, &registry, &settle(50));

    let started = Instant::now();
    let receipt = block_on(dispatcher.move_to(id(1), Position::new(0.3, 0.3), &MotionOptions::default())).unwrap();

    let issued = link.calls().motions[0].0;
    assert!(started <= issued);
    assert!(issued <= receipt.issued_at);
    assert!(receipt.settled_at >= receipt.issued_at + Duration::from_millis(50));
}

#[test]
fn test_concurrent_moves_share_one_settle() {
    let link = ScriptedLink::new();
    let mut registry = MoverRegistry::new();
    registry.populate(&link, &[id(1), id(2)]).unwrap();
    let dispatcher = MotionDispatcher::new(&link, &registry, &settle(100));
    let options = MotionOptions::default();

    let started = Instant::now();
    let (a, b) = block_on(join(
        dispatcher.move_to(id(1), Position::new(0.18, 0.3), &options),
        dispatcher.move_to(id(2), Position::new(0.42, 0.3), &options),
    ));
    let elapsed = started.elapsed();

    assert!(a.is_ok() && b.is_ok());
    assert!(elapsed >= Duration::from_millis(100));
    assert!(elapsed < Duration::from_millis(180));
}

#[test]
fn test_simulated_table_runs_routine() {
    let geometry = TableGeometry::default();
    let table = SimTable::new(
        SimConfig {
            movers: 2,
            ..SimConfig::default()
        },
        &geometry,
    );
    let abort = AbortSignal::new();
    let config = BringUpConfig {
        expected_movers: Some(2),
        ..fast_bring_up()
    };

    let report = block_on(BringUp::new(&table, config).run(&abort)).unwrap();
    assert_eq!(report.activation_attempts, 1);
    assert_eq!(report.levitation_attempts, 1);

    let mut registry = MoverRegistry::new();
    report.populate(&table, &mut registry).unwrap();
    let dispatcher = MotionDispatcher::new(&table, &registry, &settle(5));

    let mut routine = Routine::new(1, 0);
    routine.push(Route::new(id(1), &TEST_STATIONS[..3]).unwrap()).unwrap();
    routine.push(Route::new(id(2), &TEST_STATIONS[3..]).unwrap()).unwrap();
    routine.validate(&geometry).unwrap();

    let summary = block_on(Choreographer::new(&dispatcher, MotionOptions::default()).run(&routine));
    assert!(summary.is_clean());
    assert_eq!(summary.completed, 6);
    assert_eq!(table.position(id(1)), Some(TEST_STATIONS[2]));
    assert_eq!(table.position(id(2)), Some(TEST_STATIONS[5]));

    dispatcher.stop_all();
}
