//! grid-dr entry point: CLI wiring and config-driven scheduler construction.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use grid_dr::config::GridConfig;
use grid_dr::io::export::{export_cycles_csv, export_outcomes_csv};
use grid_dr::repl::Repl;
use grid_dr::sim::clock::SystemClock;
use grid_dr::sim::kpi::GridKpi;
use grid_dr::sim::runner::Simulation;

/// Grid demand-response coordinator.
#[derive(Debug, Parser)]
#[command(name = "grid-dr", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive command interpreter (default).
    Repl(GridSource),
    /// Run a seeded batch simulation and print KPIs.
    Simulate(SimulateArgs),
    /// Serve the REST API over a live grid.
    #[cfg(feature = "api")]
    Serve {
        #[command(flatten)]
        source: GridSource,
        /// API server port.
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Live terminal dashboard.
    #[cfg(feature = "tui")]
    Tui {
        /// Built-in preset to start with.
        #[arg(long, default_value = "default")]
        preset: String,
    },
}

/// Where the grid configuration comes from.
#[derive(Debug, Clone, Default, Args)]
struct GridSource {
    /// Built-in preset (default, outage, peak).
    #[arg(long, conflicts_with = "config")]
    preset: Option<String>,
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct SimulateArgs {
    #[command(flatten)]
    source: GridSource,
    /// Override the random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Override the number of cycles.
    #[arg(long)]
    cycles: Option<usize>,
    /// Export per-cycle telemetry to CSV.
    #[arg(long)]
    telemetry_out: Option<PathBuf>,
    /// Export per-request outcomes to CSV.
    #[arg(long)]
    outcomes_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with interpreter output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Repl(GridSource::default())) {
        Command::Repl(source) => run_repl(&source),
        Command::Simulate(args) => run_simulate(&args),
        #[cfg(feature = "api")]
        Command::Serve { source, port } => run_serve(&source, port),
        #[cfg(feature = "tui")]
        Command::Tui { preset } => grid_dr::tui::run(&preset).context("TUI failed"),
    }
}

/// Loads and validates the configuration named by `source`.
fn load_config(source: &GridSource) -> Result<GridConfig> {
    let cfg = match (&source.config, &source.preset) {
        (Some(path), _) => GridConfig::from_toml_file(path)?,
        (None, Some(name)) => GridConfig::from_preset(name)?,
        (None, None) => GridConfig::baseline(),
    };

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("configuration has {} error(s)", errors.len());
    }
    Ok(cfg)
}

fn run_repl(source: &GridSource) -> Result<()> {
    let cfg = load_config(source)?;
    let scheduler = cfg.build_scheduler(SystemClock)?;
    let mut repl = Repl::new(scheduler, cfg.maintenance.default_duration_secs);
    repl.run(io::stdin().lock(), io::stdout().lock())
        .context("interpreter I/O failed")
}

fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let mut cfg = load_config(&args.source)?;
    if let Some(seed) = args.seed {
        cfg.simulation.seed = seed;
    }
    if let Some(cycles) = args.cycles {
        if cycles == 0 {
            bail!("--cycles must be > 0");
        }
        cfg.simulation.cycles = cycles;
    }

    info!(
        seed = cfg.simulation.seed,
        cycles = cfg.simulation.cycles,
        substations = cfg.substations.len(),
        "starting simulation"
    );
    let records = Simulation::from_config(&cfg)?.run()?;

    for r in &records {
        println!("{r}");
    }
    println!();
    println!("{}", GridKpi::from_records(&records));

    if let Some(path) = &args.telemetry_out {
        export_cycles_csv(&records, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Cycle telemetry exported to {}", path.display());
    }
    if let Some(path) = &args.outcomes_out {
        export_outcomes_csv(&records, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Request outcomes exported to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "api")]
fn run_serve(source: &GridSource, port: u16) -> Result<()> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use grid_dr::api::{AppState, serve};

    let cfg = load_config(source)?;
    let scheduler = cfg.build_scheduler(SystemClock)?;
    let state = Arc::new(AppState::new(
        scheduler,
        cfg.maintenance.default_duration_secs,
    ));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    rt.block_on(serve(state, addr))
        .with_context(|| format!("API server on {addr} failed"))
}
