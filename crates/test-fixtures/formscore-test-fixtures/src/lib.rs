use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "rule-tables")]
    rule_tables: HashMap<String, String>,
    #[serde(rename = "reference-poses")]
    reference_poses: HashMap<String, String>,
    scenarios: HashMap<String, ScenarioEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScenarioEntry {
    Path(String),
    Detailed { path: String },
}

impl ScenarioEntry {
    fn as_path(&self) -> &str {
        match self {
            ScenarioEntry::Path(path) => path,
            ScenarioEntry::Detailed { path } => path,
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

fn sorted_keys<T>(map: &HashMap<String, T>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

/// Rule tables: JSON arrays of rule rows.
pub mod rule_tables {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.rule_tables)
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.rule_tables, "rule table", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.rule_tables, "rule table", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.rule_tables, "rule table", name)?;
        Ok(resolve_path(rel))
    }
}

/// Reference libraries: `exercise -> { articulation: value }`.
pub mod reference_poses {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.reference_poses)
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.reference_poses, "reference pose", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.reference_poses, "reference pose", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.reference_poses, "reference pose", name)?;
        Ok(resolve_path(rel))
    }
}

/// End-to-end frame scenarios with expected scores.
pub mod scenarios {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.scenarios)
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.scenarios, "scenario", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.scenarios, "scenario", name)?;
        super::load_json(entry.as_path())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.scenarios, "scenario", name)?;
        Ok(resolve_path(entry.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_resolves() {
        for name in rule_tables::keys() {
            assert!(rule_tables::path(&name).unwrap().exists(), "rule table {name}");
        }
        for name in reference_poses::keys() {
            assert!(reference_poses::path(&name).unwrap().exists(), "reference {name}");
        }
        for name in scenarios::keys() {
            let value: serde_json::Value = scenarios::load(&name).unwrap();
            assert!(value.get("expect").is_some(), "scenario {name}");
        }
    }

    #[test]
    fn unknown_fixture_is_an_error() {
        assert!(scenarios::json("does-not-exist").is_err());
    }
}
