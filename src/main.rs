//! Bounded-buffer producer/consumer simulation.
//!
//! Usage: pc-sim <sim-time> <max-sleep> <producers> <consumers> <yes|no>

use clap::{Arg, ArgMatches, Command};
use pc_buffer::config::parse_non_negative;
use pc_buffer::{Result, SimConfig, Simulation};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_one::<String>("log-level").map(String::as_str));

    if let Err(e) = run(&matches) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn cli() -> Command {
    Command::new("pc-sim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Simulates producers and consumers sharing a bounded buffer.")
        .arg(
            Arg::new("sim-time")
                .required(true)
                .allow_negative_numbers(true)
                .help("Seconds the simulation runs"),
        )
        .arg(
            Arg::new("max-sleep")
                .required(true)
                .allow_negative_numbers(true)
                .help("Maximum seconds a worker sleeps between operations (0 disables sleeping)"),
        )
        .arg(
            Arg::new("producers")
                .required(true)
                .allow_negative_numbers(true)
                .help("Number of producer threads"),
        )
        .arg(
            Arg::new("consumers")
                .required(true)
                .allow_negative_numbers(true)
                .help("Number of consumer threads"),
        )
        .arg(
            Arg::new("snapshots")
                .required(true)
                .value_name("yes|no")
                .help("Print a buffer snapshot after every insert and remove"),
        )
        .arg(
            Arg::new("capacity")
                .long("capacity")
                .value_name("N")
                .allow_negative_numbers(true)
                .help("Number of buffer slots [default: 5]"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error) [default: warn]"),
        )
}

/// `RUST_LOG` wins over `--log-level`. Logs go to stderr; stdout carries
/// the simulation output.
fn init_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = config_from_matches(matches)?;
    let simulation = Simulation::new(config)?;

    let coordinator = simulation.coordinator();
    if let Err(e) = ctrlc::set_handler(move || coordinator.interrupt()) {
        warn!(error = %e, "could not install Ctrl+C handler");
    }

    println!("Starting threads...");
    let report = simulation.run()?;
    info!("workers joined");
    println!("{report}");
    Ok(())
}

fn config_from_matches(matches: &ArgMatches) -> Result<SimConfig> {
    let mut config = SimConfig::from_positional([
        positional(matches, "sim-time"),
        positional(matches, "max-sleep"),
        positional(matches, "producers"),
        positional(matches, "consumers"),
        positional(matches, "snapshots"),
    ])?;

    if let Some(raw) = matches.get_one::<String>("capacity") {
        let capacity = parse_non_negative("Capacity", raw)?;
        config = config.with_capacity(usize::try_from(capacity).unwrap_or(usize::MAX));
    }
    config.validate()?;
    Ok(config)
}

fn positional<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}
