//! Persisted practice preferences.
//!
//! Loaded when a session starts and written back at session boundaries
//! (after generating, after saving). Missing fields fall back to defaults so
//! older files keep loading.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{
    ArithmeticConstraints, GenerationConstraints, Mode, Operation, TableConstraints,
    TableOrdering, MIN_TASKS,
};
use crate::results::SessionParams;
use crate::session::SessionSetup;
use crate::validator;

/// Preferences for arithmetic drills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArithmeticSettings {
    pub name: String,
    /// Raw bounds as typed; normalized when a session is built.
    pub a_start: String,
    pub a_end: String,
    pub b_start: String,
    pub b_end: String,
    pub operation: Operation,
    pub task_count: usize,
    pub integer_only: bool,
}

impl Default for ArithmeticSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            a_start: "3".to_string(),
            a_end: "9".to_string(),
            b_start: "3".to_string(),
            b_end: "9".to_string(),
            operation: Operation::Add,
            task_count: MIN_TASKS,
            integer_only: false,
        }
    }
}

/// Preferences for multiplication-table drills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub name: String,
    pub task_count: usize,
    pub bases: Vec<u32>,
    /// Per-base ceilings keyed by the stringified base.
    pub max_for: BTreeMap<String, u32>,
    pub sequential: bool,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            task_count: MIN_TASKS,
            bases: Vec::new(),
            max_for: BTreeMap::new(),
            sequential: false,
        }
    }
}

/// All practice preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub arithmetic: ArithmeticSettings,
    pub table: TableSettings,
}

impl Settings {
    /// Load from `path`, returning defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse settings: {}", path.display()))
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to encode settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write settings: {}", path.display()))
    }

    /// Participant name stored for `mode`.
    pub fn name_for(&self, mode: Mode) -> &str {
        match mode {
            Mode::Random => &self.arithmetic.name,
            Mode::TTable => &self.table.name,
        }
    }

    pub fn set_name_for(&mut self, mode: Mode, name: impl Into<String>) {
        match mode {
            Mode::Random => self.arithmetic.name = name.into(),
            Mode::TTable => self.table.name = name.into(),
        }
    }

    /// Build a session setup for `mode` from the current preferences.
    pub fn session_setup(&self, mode: Mode) -> SessionSetup {
        match mode {
            Mode::Random => self.arithmetic_setup(),
            Mode::TTable => self.table_setup(),
        }
    }

    fn arithmetic_setup(&self) -> SessionSetup {
        let s = &self.arithmetic;
        SessionSetup {
            name: s.name.clone(),
            params: SessionParams::Random {
                op_name: s.operation,
                a_start: s.a_start.clone(),
                a_end: s.a_end.clone(),
                b_start: s.b_start.clone(),
                b_end: s.b_end.clone(),
                int_only: s.integer_only,
            },
            constraints: GenerationConstraints::Arithmetic(ArithmeticConstraints {
                a: validator::normalize_range(&s.a_start, &s.a_end),
                b: validator::normalize_range(&s.b_start, &s.b_end),
                operation: s.operation,
                integer_only: s.integer_only,
                count: validator::clamp_task_count(s.task_count),
            }),
        }
    }

    fn table_setup(&self) -> SessionSetup {
        let s = &self.table;
        let bases = validator::normalize_selection(&s.bases);
        let ceilings = validator::normalize_ceilings(&s.max_for);
        SessionSetup {
            name: s.name.clone(),
            params: SessionParams::TTable {
                bases: bases.iter().copied().collect(),
                max_for: ceilings
                    .iter()
                    .filter(|(base, _)| bases.contains(base))
                    .map(|(base, ceiling)| (base.to_string(), *ceiling))
                    .collect(),
                sequential: s.sequential,
            },
            constraints: GenerationConstraints::Table(TableConstraints {
                bases,
                ceilings,
                ordering: if s.sequential {
                    TableOrdering::Sequential
                } else {
                    TableOrdering::Randomized
                },
                count: validator::clamp_task_count(s.task_count),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run() {
        let s = Settings::default();
        assert_eq!(s.arithmetic.a_start, "3");
        assert_eq!(s.arithmetic.b_end, "9");
        assert_eq!(s.arithmetic.operation, Operation::Add);
        assert_eq!(s.arithmetic.task_count, 5);
        assert!(s.table.bases.is_empty());
        assert!(!s.table.sequential);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mut s = Settings::default();
        s.table.bases = vec![3, 7];
        s.table.max_for.insert("3".into(), 5);
        s.set_name_for(Mode::TTable, "Anna");
        s.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, s);
        assert_eq!(loaded.name_for(Mode::TTable), "Anna");
    }

    #[test]
    fn partial_file_is_merged_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[arithmetic]\noperation = \"divide\"\n").unwrap();
        let s = Settings::load(&path).unwrap();
        assert_eq!(s.arithmetic.operation, Operation::Divide);
        assert_eq!(s.arithmetic.a_start, "3");
        assert_eq!(s.table, TableSettings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "arithmetic = 5").unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn arithmetic_setup_normalizes_input() {
        let mut s = Settings::default();
        s.arithmetic.a_start = "9".into();
        s.arithmetic.a_end = "3".into();
        s.arithmetic.task_count = 200;
        let setup = s.session_setup(Mode::Random);
        match setup.constraints {
            GenerationConstraints::Arithmetic(c) => {
                assert_eq!((c.a.min, c.a.max), (3, 9));
                assert_eq!(c.count, 50);
            }
            other => panic!("unexpected constraints: {other:?}"),
        }
    }

    #[test]
    fn table_setup_drops_invalid_bases() {
        let mut s = Settings::default();
        s.table.bases = vec![7, 3, 99];
        s.table.max_for = BTreeMap::from([("3".to_string(), 5), ("99".to_string(), 4)]);
        s.table.sequential = true;
        let setup = s.session_setup(Mode::TTable);
        assert_eq!(setup.mode(), Mode::TTable);
        match &setup.params {
            SessionParams::TTable { bases, max_for, .. } => {
                assert_eq!(bases, &vec![3, 7]);
                assert_eq!(max_for.len(), 1);
            }
            other => panic!("unexpected params: {other:?}"),
        }
        match setup.constraints {
            GenerationConstraints::Table(c) => {
                assert_eq!(c.ordering, TableOrdering::Sequential);
                assert_eq!(c.ceiling(3), 5);
                assert_eq!(c.ceiling(7), 10);
            }
            other => panic!("unexpected constraints: {other:?}"),
        }
    }
}
