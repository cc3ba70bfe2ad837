//! # Validate Subcommand
//!
//! Offline configuration checking. Reads the file exactly as written (no
//! self-repair, nothing written back) and reports every problem the engine
//! would warn about or silently skate past at load time.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use pax_config::{PolicyData, EXCLUDE};
use pax_core::{Rule, ANY};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration file to check.
    #[arg(long, default_value = "pax.json")]
    pub config: PathBuf,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let data = read_strict(&args.config)?;
    let problems = check_data(&data);
    for problem in &problems {
        println!("{problem}");
    }
    if !problems.is_empty() {
        anyhow::bail!("{} problem(s) in {}", problems.len(), args.config.display());
    }
    println!(
        "{}: ok ({} rule sets, {} groups, {} mappings)",
        args.config.display(),
        data.rulesets.len(),
        data.groups.len(),
        data.mappings.len()
    );
    Ok(())
}

/// Parses the file as-is. Unlike the store there is no fallback and no
/// repair; a file the store would quietly regenerate is exactly what this
/// command exists to report on.
fn read_strict(path: &Path) -> anyhow::Result<PolicyData> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut data: PolicyData =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    data.init();
    Ok(data)
}

/// Every problem in the configuration, as printable lines.
fn check_data(data: &PolicyData) -> Vec<String> {
    let mut problems = Vec::new();

    if data.default_ruleset().is_none() {
        problems.push(format!(
            "default rule set {:?} is not defined",
            data.default_ruleset
        ));
    }
    for (i, ruleset) in data.rulesets.iter().enumerate() {
        if data.rulesets[..i].iter().any(|rs| rs.name == ruleset.name) {
            problems.push(format!(
                "rule set {:?} is declared more than once; the first declaration wins",
                ruleset.name
            ));
        }
    }

    for ruleset in &data.rulesets {
        for rule in ruleset.invalid_rules() {
            problems.push(format!(
                "rule set {:?}: unparseable rule {:?}",
                ruleset.name, rule.text
            ));
        }
        // A rule endpoint that names no group can never match anything.
        for sentence in &ruleset.rules {
            let rule = Rule::parse(sentence);
            if !rule.valid {
                continue;
            }
            let Some((source, target)) = rule.key.split_once("->") else {
                continue;
            };
            for endpoint in [source, target] {
                if endpoint != ANY && !data.groups.iter().any(|g| g.name == endpoint) {
                    problems.push(format!(
                        "rule set {:?}: rule {:?} names undefined group {:?}",
                        ruleset.name, rule.text, endpoint
                    ));
                }
            }
        }
    }

    for (key, target) in &data.mappings {
        if target != EXCLUDE && data.find_ruleset(target).is_none() {
            problems.push(format!(
                "mapping {key:?}: undefined rule set {target:?}"
            ));
        }
    }

    for entry in data.schedule.invalid_entries() {
        problems.push(format!("schedule: unparseable entry {:?}", entry.text));
    }
    for entry in data.schedule.parsed_entries().iter().filter(|e| e.valid) {
        if data.find_ruleset(&entry.ruleset).is_none() {
            problems.push(format!(
                "schedule: entry {:?} names undefined rule set {:?}",
                entry.text, entry.ruleset
            ));
        }
    }
    if !data.schedule.entries.is_empty() && !data.schedule.is_valid() {
        problems.push(
            "schedule: needs two or more valid entries naming two or more rule sets".to_string(),
        );
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use pax_config::default_data;
    use pax_core::RuleSet;

    #[test]
    fn test_stock_configuration_is_clean() {
        assert!(check_data(&default_data()).is_empty());
    }

    #[test]
    fn test_flags_undefined_default_ruleset() {
        let mut data = default_data();
        data.default_ruleset = "ghost".to_string();
        let problems = check_data(&data);
        assert!(problems.iter().any(|p| p.contains("\"ghost\"")));
    }

    #[test]
    fn test_flags_duplicate_ruleset_names() {
        let mut data = default_data();
        data.rulesets.push(RuleSet::new("default"));
        data.init();
        let problems = check_data(&data);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("more than once"));
    }

    #[test]
    fn test_flags_unparseable_rule() {
        let mut data = default_data();
        data.rulesets[0].rules.push("players".to_string());
        data.init();
        let problems = check_data(&data);
        assert!(problems.iter().any(|p| p.contains("unparseable rule")));
    }

    #[test]
    fn test_flags_rule_naming_undefined_group() {
        let mut data = default_data();
        data.rulesets[0]
            .rules
            .push("ghosts cannot hurt players".to_string());
        data.init();
        let problems = check_data(&data);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("\"ghosts\""));
    }

    #[test]
    fn test_wildcard_endpoints_are_not_groups() {
        let mut data = default_data();
        data.rulesets[0]
            .rules
            .push("nothing can hurt highwalls".to_string());
        data.init();
        assert!(check_data(&data).is_empty());
    }

    #[test]
    fn test_flags_undefined_mapping_target() {
        let mut data = default_data();
        data.mappings
            .insert("zone_7".to_string(), "ghost".to_string());
        let problems = check_data(&data);
        assert!(problems.iter().any(|p| p.contains("zone_7")));
    }

    #[test]
    fn test_exclude_mapping_target_is_clean() {
        let mut data = default_data();
        data.mappings
            .insert("zone_7".to_string(), EXCLUDE.to_string());
        assert!(check_data(&data).is_empty());
    }

    #[test]
    fn test_flags_underfilled_schedule() {
        let mut data = default_data();
        data.schedule.entries = vec!["08:00 default".to_string()];
        data.init();
        let problems = check_data(&data);
        assert!(problems.iter().any(|p| p.contains("two or more")));
    }

    #[test]
    fn test_flags_schedule_entry_with_undefined_ruleset() {
        let mut data = default_data();
        data.schedule.entries = vec!["08:00 default".to_string(), "20:00 ghost".to_string()];
        data.init();
        let problems = check_data(&data);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("\"20:00 ghost\""));
    }

    #[test]
    fn test_run_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = ValidateArgs {
            config: dir.path().join("absent.json"),
        };
        assert!(run(args).is_err());
    }

    #[test]
    fn test_read_strict_leaves_broken_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pax.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(read_strict(&path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }
}
