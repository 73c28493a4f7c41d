//! Headless terminal demo for the growth simulation.

mod telemetry;
mod terminal;

use anyhow::{Context, Result};
use growth_core::{RunState, SimulationConfig};
use growth_sim::SimulationController;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::signal;
use tokio::time::interval;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    // Load configuration
    let config = match std::env::var("GROWTH_CONFIG") {
        Ok(path) => SimulationConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        Err(_) => SimulationConfig::default(),
    };
    config.validate()?;
    let seed = env_or("GROWTH_SEED", 0u64)?;
    let density = env_or("GROWTH_DENSITY", 0.0f64)?;

    info!(
        height = config.grid.height,
        width = config.grid.width,
        interval_ms = config.controller.interval_ms,
        seed,
        density,
        "Starting growth demo"
    );

    let renderer = terminal::TerminalRenderer::new();
    let mut controller = SimulationController::new(&config, renderer.clone());

    if density > 0.0 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let seeded = controller.seed_random(&mut rng, density)?;
        info!(seeded, "Random seed cells placed");
    } else {
        let grid = controller.grid();
        let (row, col) = (grid.height() / 2, grid.width() / 2);
        controller.toggle(row, col)?;
        info!(row, col, "Center seed cell placed");
    }

    let handle = growth_sim::spawn(controller);
    handle.start()?;
    handle.snapshot().await?;

    let mut frames = interval(config.controller.interval());
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = frames.tick() => {
                let status = handle.status();
                print!("\x1b[2J\x1b[H{}", renderer.render());
                println!(
                    "generation {}  alive {}/{}  frontier {}  [{}]",
                    status.stats.generation,
                    status.stats.alive,
                    status.stats.total,
                    status.stats.frontier,
                    status.state
                );
                if status.state != RunState::Running {
                    break;
                }
            }
            _ = &mut shutdown => break,
        }
    }

    let controller = handle.shutdown().await?;
    let stats = controller.grid().stats();
    info!(
        generation = stats.generation,
        alive = stats.alive,
        coverage = format!("{:.1}%", stats.coverage() * 100.0),
        cells_painted = renderer.painted(),
        filled = controller.grid().is_filled(),
        "Demo finished"
    );

    Ok(())
}

fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("invalid {}: {}", name, value)),
        Err(_) => Ok(default),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
