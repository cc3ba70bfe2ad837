//! # Sched Subcommand
//!
//! Inspects and toggles the rotation schedule in a configuration file, and
//! previews which rule set would govern at a given time.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use pax_config::{ConfigStore, PolicyData};
use pax_core::WeekTime;

/// Arguments for the sched subcommand.
#[derive(Args, Debug)]
pub struct SchedArgs {
    /// Configuration file to operate on.
    #[arg(long, default_value = "pax.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub action: SchedAction,
}

#[derive(Subcommand, Debug)]
pub enum SchedAction {
    /// Print schedule state and entries.
    Show,
    /// Turn rotation on. Rejected while the schedule is invalid.
    Enable,
    /// Turn rotation off.
    Disable,
    /// Resolve which entry governs at a week position, `[D.]HH:MM[:SS]`.
    At { time: String },
}

pub fn run(args: SchedArgs) -> anyhow::Result<()> {
    let store = ConfigStore::new(&args.config);
    let mut data = store.load()?;
    match args.action {
        SchedAction::Show => show(&data),
        SchedAction::Enable => {
            data.set_schedule_enabled(true)?;
            store.save(&data)?;
            println!("schedule enabled");
        }
        SchedAction::Disable => {
            data.set_schedule_enabled(false)?;
            store.save(&data)?;
            println!("schedule disabled");
        }
        SchedAction::At { time } => {
            let now = WeekTime::parse(&time)?;
            match data.schedule.resolve(now, now.time_of_day()) {
                Some(entry) => println!("{now} -> {}", entry.ruleset),
                None => println!("{now} -> (nothing resolves)"),
            }
        }
    }
    Ok(())
}

fn show(data: &PolicyData) {
    let schedule = &data.schedule;
    println!(
        "enabled: {}  clock: {}  broadcast: {}",
        schedule.enabled,
        if schedule.use_realtime {
            "realtime"
        } else {
            "world"
        },
        schedule.broadcast
    );
    for entry in schedule.parsed_entries() {
        if !entry.valid {
            println!("  (unparseable) {:?}", entry.text);
            continue;
        }
        let when = if entry.daily {
            format!("*.{}", entry.time)
        } else {
            entry.time.to_string()
        };
        match &entry.message {
            Some(message) => println!("  {when} {} {message:?}", entry.ruleset),
            None => println!("  {when} {}", entry.ruleset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pax_core::RuleSet;
    use std::path::Path;

    /// Stock config plus a second rule set and a day/night rotation.
    fn seed(path: &Path) {
        let store = ConfigStore::new(path);
        let mut data = store.load().unwrap();
        data.rulesets.push(RuleSet::new("night"));
        data.schedule.entries = vec!["08:00 default".to_string(), "20:00 night".to_string()];
        data.init();
        store.save(&data).unwrap();
    }

    fn sched(path: &Path, action: SchedAction) -> anyhow::Result<()> {
        run(SchedArgs {
            config: path.to_path_buf(),
            action,
        })
    }

    #[test]
    fn test_enable_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pax.json");
        seed(&path);

        sched(&path, SchedAction::Enable).unwrap();
        let data = ConfigStore::new(&path).load().unwrap();
        assert!(data.schedule.enabled);

        sched(&path, SchedAction::Disable).unwrap();
        let data = ConfigStore::new(&path).load().unwrap();
        assert!(!data.schedule.enabled);
    }

    #[test]
    fn test_enable_rejected_while_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pax.json");
        // Stock config carries no schedule entries.
        assert!(sched(&path, SchedAction::Enable).is_err());
    }

    #[test]
    fn test_at_previews_without_enabling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pax.json");
        seed(&path);

        sched(
            &path,
            SchedAction::At {
                time: "12:30".to_string(),
            },
        )
        .unwrap();
        let data = ConfigStore::new(&path).load().unwrap();
        assert!(!data.schedule.enabled);
    }

    #[test]
    fn test_at_rejects_malformed_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pax.json");
        seed(&path);
        assert!(sched(
            &path,
            SchedAction::At {
                time: "25:99".to_string()
            }
        )
        .is_err());
    }
}
