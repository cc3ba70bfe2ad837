//! # Map Subcommand
//!
//! Lists and edits the location-to-rule-set mapping table in a
//! configuration file. Edits pass the same validation the live engine
//! applies, then persist atomically through the store.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use pax_config::{ConfigStore, MappingChange};

/// Arguments for the map subcommand.
#[derive(Args, Debug)]
pub struct MapArgs {
    /// Configuration file to operate on.
    #[arg(long, default_value = "pax.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub action: MapAction,
}

#[derive(Subcommand, Debug)]
pub enum MapAction {
    /// Print every mapping.
    List,
    /// Create or replace a mapping. The target must name a rule set in the
    /// file, or be the literal `exclude`.
    Set { key: String, target: String },
    /// Remove a mapping.
    Remove { key: String },
}

pub fn run(args: MapArgs) -> anyhow::Result<()> {
    let store = ConfigStore::new(&args.config);
    let mut data = store.load()?;
    match args.action {
        MapAction::List => {
            for (key, target) in &data.mappings {
                println!("{key} -> {target}");
            }
        }
        MapAction::Set { key, target } => {
            let change = data.add_or_update_mapping(&key, &target)?;
            store.save(&data)?;
            match change {
                MappingChange::Created => println!("mapped {key:?} to {target:?}"),
                MappingChange::Updated { previous } => {
                    println!("remapped {key:?} to {target:?} (was {previous:?})")
                }
            }
        }
        MapAction::Remove { key } => {
            let previous = data.remove_mapping(&key)?;
            store.save(&data)?;
            println!("unmapped {key:?} (was {previous:?})");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pax_config::EXCLUDE;
    use std::path::Path;

    fn map(path: &Path, action: MapAction) -> anyhow::Result<()> {
        run(MapArgs {
            config: path.to_path_buf(),
            action,
        })
    }

    #[test]
    fn test_set_and_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pax.json");

        map(
            &path,
            MapAction::Set {
                key: "arena".to_string(),
                target: EXCLUDE.to_string(),
            },
        )
        .unwrap();
        let data = ConfigStore::new(&path).load().unwrap();
        assert_eq!(data.mappings.get("arena").map(String::as_str), Some(EXCLUDE));

        map(
            &path,
            MapAction::Remove {
                key: "arena".to_string(),
            },
        )
        .unwrap();
        let data = ConfigStore::new(&path).load().unwrap();
        assert!(!data.mappings.contains_key("arena"));
    }

    #[test]
    fn test_set_rejects_undefined_target_without_saving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pax.json");

        let result = map(
            &path,
            MapAction::Set {
                key: "arena".to_string(),
                target: "ghost".to_string(),
            },
        );
        assert!(result.is_err());
        let data = ConfigStore::new(&path).load().unwrap();
        assert!(!data.mappings.contains_key("arena"));
    }

    #[test]
    fn test_remove_missing_mapping_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pax.json");
        assert!(map(
            &path,
            MapAction::Remove {
                key: "arena".to_string()
            }
        )
        .is_err());
    }
}
