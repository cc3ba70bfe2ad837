//! # Config Store — JSON Persistence With Self-Repair
//!
//! [`ConfigStore`] owns one JSON file. Loading is forgiving: a missing or
//! corrupt file falls back to compiled-in defaults (with a warning), a file
//! written by an incompatible older version is moved aside to `*.old.json`
//! and regenerated, and absent sections are filled in. Only real I/O
//! failures surface as errors.
//!
//! Saving serializes pretty JSON and replaces the file atomically (write
//! to a sibling temp path, then rename), so a crash mid-save never leaves
//! a half-written config behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::data::PolicyData;
use crate::defaults::{default_data, CONFIG_VERSION};
use crate::error::ConfigResult;

/// Configs written before this version are archived and regenerated.
const MIN_COMPATIBLE_VERSION: (u64, u64, u64) = (0, 1, 0);

/// Handle to the persisted configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration, repairing or regenerating as needed. The
    /// returned data is initialized (rule sets built, schedule parsed) and
    /// any repair has already been written back.
    pub fn load(&self) -> ConfigResult<PolicyData> {
        let mut data = match self.read_existing()? {
            Some(data) => data,
            None => {
                let data = default_data();
                self.save(&data)?;
                return Ok(data);
            }
        };

        let mut dirty = data.ensure_option_defaults();
        if data.rulesets.is_empty() || data.groups.is_empty() {
            warn!("configuration has no rule sets or no groups; restoring default policy");
            crate::defaults::apply_default_policy(&mut data);
            dirty = true;
        }
        dirty |= data.ensure_self_mappings();
        if data.config_version != CONFIG_VERSION {
            data.config_version = CONFIG_VERSION.to_string();
            dirty = true;
        }
        data.init();
        if dirty {
            self.save(&data)?;
        }
        Ok(data)
    }

    /// Serializes pretty JSON and swaps it into place atomically.
    pub fn save(&self, data: &PolicyData) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(data)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Reads and parses the file if present and usable. `None` means the
    /// caller should fall back to defaults.
    fn read_existing(&self) -> ConfigResult<Option<PolicyData>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no configuration file; writing defaults");
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "configuration is not valid JSON; using defaults");
                return Ok(None);
            }
        };

        if self.version_outdated(&value) {
            let archive = self.path.with_extension("old.json");
            fs::rename(&self.path, &archive)?;
            warn!(
                archive = %archive.display(),
                "configuration predates the minimum compatible version; archived and regenerated"
            );
            return Ok(None);
        }

        match serde_json::from_value::<PolicyData>(value) {
            Ok(data) => Ok(Some(data)),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "configuration does not match the schema; using defaults");
                Ok(None)
            }
        }
    }

    /// A version field older than [`MIN_COMPATIBLE_VERSION`] (or one that
    /// does not parse) triggers migration. An absent field does not; old
    /// pre-versioned files still repair field by field.
    fn version_outdated(&self, value: &serde_json::Value) -> bool {
        let Some(version) = value.get("config_version").and_then(|v| v.as_str()) else {
            return false;
        };
        if version.is_empty() {
            return false;
        }
        match parse_version(version) {
            Some(parsed) => parsed < MIN_COMPATIBLE_VERSION,
            None => {
                warn!(version, "unparseable config_version; treating as outdated");
                true
            }
        }
    }
}

fn parse_version(text: &str) -> Option<(u64, u64, u64)> {
    let mut parts = text.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{EngineOption, ALL_ZONES, EXCLUDE};

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("pax.json"))
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let data = store.load().unwrap();
        assert!(store.path().exists());
        assert_eq!(data.config_version, CONFIG_VERSION);
        assert_eq!(data.rulesets.len(), 1);
    }

    #[test]
    fn test_round_trip_preserves_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut data = store.load().unwrap();
        data.add_or_update_mapping("arena", EXCLUDE).unwrap();
        store.save(&data).unwrap();

        let back = store.load().unwrap();
        assert_eq!(back.mappings.get("arena").map(String::as_str), Some(EXCLUDE));
    }

    #[test]
    fn test_corrupt_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();
        let data = store.load().unwrap();
        assert_eq!(data.rulesets.len(), 1);
        // The fallback is persisted.
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"default_ruleset\""));
    }

    #[test]
    fn test_outdated_version_archives_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{ "config_version": "0.0.9", "default_ruleset": "legacy" }"#,
        )
        .unwrap();

        let data = store.load().unwrap();
        assert_eq!(data.default_ruleset, "default");
        let archive = store.path().with_extension("old.json");
        assert!(archive.exists());
        assert!(fs::read_to_string(archive).unwrap().contains("legacy"));
    }

    #[test]
    fn test_unversioned_file_is_repaired_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{ "mappings": { "allzones": "exclude" }, "rulesets": [ { "name": "default" } ], "groups": [ { "name": "players", "members": "player" } ] }"#,
        )
        .unwrap();

        let data = store.load().unwrap();
        // Our mapping survived; absent sections were filled in.
        assert_eq!(data.mappings.get(ALL_ZONES).map(String::as_str), Some(EXCLUDE));
        assert!(data.option_enabled(EngineOption::HandleDamage));
        assert_eq!(data.config_version, CONFIG_VERSION);
        assert!(!store.path().with_extension("old.json").exists());
    }

    #[test]
    fn test_empty_policy_restores_defaults_but_keeps_options() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{ "config_version": "0.1.0", "options": { "use_zones": false } }"#,
        )
        .unwrap();

        let data = store.load().unwrap();
        assert!(!data.option_enabled(EngineOption::UseZones));
        assert_eq!(data.groups.len(), 9);
        assert_eq!(data.mappings.get("default").map(String::as_str), Some("default"));
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("0.1.3"), Some((0, 1, 3)));
        assert_eq!(parse_version("10.20.30"), Some((10, 20, 30)));
        assert_eq!(parse_version("1.2"), None);
        assert_eq!(parse_version("1.2.3.4"), None);
        assert_eq!(parse_version("abc"), None);
    }
}
