//! # Simulate Subcommand
//!
//! Replays a captured damage event against a configuration file and prints
//! the verdict, optionally narrating the decision the way live trace mode
//! does. Events are the JSON form of [`pax_core::DamageEvent`].

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use pax_config::ConfigStore;
use pax_core::{DamageEvent, Verdict};
use pax_engine::PolicyEngine;

/// Arguments for the simulate subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Damage event JSON file; `-` reads stdin.
    pub event: PathBuf,

    /// Configuration file to decide under.
    #[arg(long, default_value = "pax.json")]
    pub config: PathBuf,

    /// Narrate the decision on stderr.
    #[arg(long)]
    pub trace: bool,

    /// Decide the event as a gather interaction instead of damage.
    #[arg(long)]
    pub gather: bool,
}

pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let event = read_event(&args.event)?;
    let engine = PolicyEngine::from_store(ConfigStore::new(&args.config))?;
    if args.trace {
        engine.toggle_trace();
    }
    println!("{}", decide(&engine, &event, args.gather));
    Ok(())
}

fn decide(engine: &PolicyEngine, event: &DamageEvent, gather: bool) -> Verdict {
    if gather {
        engine.decide_gather(event)
    } else {
        engine.decide_damage(event)
    }
}

fn read_event(path: &Path) -> anyhow::Result<DamageEvent> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading event from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&raw).context("parsing damage event")
}
