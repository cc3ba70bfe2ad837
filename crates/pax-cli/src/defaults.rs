//! # Defaults Subcommand
//!
//! Writes the compiled-in stock configuration, for bootstrapping a fresh
//! install or starting over.

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;

use pax_config::{default_data, ConfigStore};

/// Arguments for the defaults subcommand.
#[derive(Args, Debug)]
pub struct DefaultsArgs {
    /// Where to write the configuration.
    #[arg(long, default_value = "pax.json")]
    pub config: PathBuf,

    /// Replace an existing file.
    #[arg(long)]
    pub force: bool,

    /// Print to stdout instead of writing a file.
    #[arg(long)]
    pub print: bool,
}

pub fn run(args: DefaultsArgs) -> anyhow::Result<()> {
    let data = default_data();
    if args.print {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }
    if args.config.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to replace it",
            args.config.display()
        );
    }
    ConfigStore::new(&args.config).save(&data)?;
    println!("wrote stock configuration to {}", args.config.display());
    Ok(())
}
