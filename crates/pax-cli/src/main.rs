//! # pax CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Pax policy engine CLI.
///
/// Validates configurations, generates defaults, edits mappings and
/// schedules, and replays damage events offline.
#[derive(Parser, Debug)]
#[command(name = "pax", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check a configuration file for problems.
    Validate(pax_cli::validate::ValidateArgs),
    /// Write or print the stock configuration.
    Defaults(pax_cli::defaults::DefaultsArgs),
    /// List and edit location mappings.
    Map(pax_cli::mapping::MapArgs),
    /// Inspect, toggle, and preview the rotation schedule.
    Sched(pax_cli::schedule::SchedArgs),
    /// Replay a damage event against a configuration.
    Simulate(pax_cli::simulate::SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Decision narration rides the `pax::trace` target at debug level;
    // `--trace` turns that target on regardless of RUST_LOG.
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Commands::Simulate(args) = &cli.command {
        if args.trace {
            filter = filter.add_directive("pax::trace=debug".parse()?);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate(args) => pax_cli::validate::run(args),
        Commands::Defaults(args) => pax_cli::defaults::run(args),
        Commands::Map(args) => pax_cli::mapping::run(args),
        Commands::Sched(args) => pax_cli::schedule::run(args),
        Commands::Simulate(args) => pax_cli::simulate::run(args),
    }
}
