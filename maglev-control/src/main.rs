//! Maglev - planar mover table control
//!
//! Brings a simulated table up to levitating movers, then runs the
//! configured choreography and stops every mover.
//!
//! Exits 0 when the routine has run, 1 on a configuration or bring-up
//! failure.

use embassy_executor::Spawner;
use static_cell::StaticCell;
use tracing::{error, info, warn};

use maglev_control::channels::ABORT;
use maglev_control::{BringUp, Choreographer, ControlConfig, ControlError, MotionDispatcher};
use maglev_core::registry::MoverRegistry;
use maglev_sim::SimTable;

// The table must outlive every borrow handed to the registry and dispatcher
static TABLE: StaticCell<SimTable> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maglev_control=info".into()),
        )
        .init();

    info!("maglev control starting");

    let code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            error!("{e}");
            1
        }
    };

    // The executor never returns on its own
    std::process::exit(code);
}

async fn run() -> Result<(), ControlError> {
    let (config, source) = ControlConfig::load()?;
    info!(%source, "configuration loaded");

    let table: &'static SimTable = TABLE.init(SimTable::new(config.simulator, &config.geometry));

    let report = BringUp::new(table, config.bring_up).run(&ABORT).await?;
    info!(
        movers = report.movers.len(),
        activations = report.activation_attempts,
        levitations = report.levitation_attempts,
        "table ready"
    );

    let mut registry = MoverRegistry::new();
    report.populate(table, &mut registry)?;

    let dispatcher = MotionDispatcher::new(table, &registry, &config.dispatch);
    let summary = Choreographer::new(&dispatcher, *dispatcher.defaults())
        .run(&config.choreography)
        .await;
    dispatcher.stop_all();

    if !summary.is_clean() {
        warn!(
            skipped = summary.skipped,
            rejected = summary.rejected,
            "choreography finished with failed moves"
        );
    }
    Ok(())
}
