//! Persisted session result types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Mode, Operation, Outcome};

/// Length of a run identifier.
pub const RUN_ID_LEN: usize = 8;

const RUN_ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Outcome classification as persisted in a detail entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeMarker {
    Correct,
    Incorrect,
    NotEvaluated,
}

impl From<Outcome> for OutcomeMarker {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Correct => OutcomeMarker::Correct,
            Outcome::Incorrect => OutcomeMarker::Incorrect,
            Outcome::Unset | Outcome::Revealed => OutcomeMarker::NotEvaluated,
        }
    }
}

/// Per-task entry in a saved session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDetail {
    /// Expression text.
    pub expr: String,
    /// The participant's answer, or `"-"` when none was given.
    pub user: String,
    pub check: OutcomeMarker,
    /// Expected value.
    pub correct: f64,
}

/// Mode-specific generation parameters recorded with a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum SessionParams {
    #[serde(rename = "random")]
    Random {
        op_name: Operation,
        a_start: String,
        a_end: String,
        b_start: String,
        b_end: String,
        #[serde(default)]
        int_only: bool,
    },
    #[serde(rename = "ttable")]
    TTable {
        bases: Vec<u32>,
        /// Per-base ceilings keyed by the stringified base.
        #[serde(default)]
        max_for: BTreeMap<String, u32>,
        #[serde(default)]
        sequential: bool,
    },
}

impl SessionParams {
    pub fn mode(&self) -> Mode {
        match self {
            SessionParams::Random { .. } => Mode::Random,
            SessionParams::TTable { .. } => Mode::TTable,
        }
    }
}

/// A completed session, as handed to a result store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Short random token labelling the run.
    pub run_id: String,
    /// Participant name.
    pub name: String,
    /// Number of tasks in the session.
    pub tasks: usize,
    /// Number of correctly answered tasks.
    pub correct: usize,
    /// Elapsed seconds on the session clock.
    pub seconds: u64,
    /// Whether every task was answered correctly.
    pub finished: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub params: SessionParams,
    #[serde(default)]
    pub tasks_detail: Vec<TaskDetail>,
}

impl SessionResult {
    pub fn mode(&self) -> Mode {
        self.params.mode()
    }

    pub fn incorrect(&self) -> usize {
        self.count_marker(OutcomeMarker::Incorrect)
    }

    /// Tasks saved without an evaluated answer.
    pub fn unsolved(&self) -> usize {
        self.count_marker(OutcomeMarker::NotEvaluated)
    }

    fn count_marker(&self, marker: OutcomeMarker) -> usize {
        self.tasks_detail
            .iter()
            .filter(|d| d.check == marker)
            .count()
    }
}

/// A result as returned by a store, with its storage identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub result: SessionResult,
}

impl StoredRecord {
    pub fn new(result: SessionResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            result,
        }
    }
}

/// Order records newest first.
pub fn sort_newest_first(records: &mut [StoredRecord]) {
    records.sort_by(|a, b| b.result.timestamp.cmp(&a.result.timestamp));
}

/// Generate a run identifier from the thread-local RNG.
pub fn generate_run_id() -> String {
    generate_run_id_with(&mut rand::thread_rng())
}

/// Generate an uppercase base-36 run identifier.
pub fn generate_run_id_with<R: Rng>(rng: &mut R) -> String {
    (0..RUN_ID_LEN)
        .map(|_| RUN_ID_ALPHABET[rng.gen_range(0..RUN_ID_ALPHABET.len())] as char)
        .collect()
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` from one hour up.
pub fn format_seconds(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp: &str) -> SessionResult {
        SessionResult {
            run_id: "ABCD1234".into(),
            name: "Anna".into(),
            tasks: 3,
            correct: 1,
            seconds: 42,
            finished: false,
            timestamp: timestamp.parse().unwrap(),
            params: SessionParams::TTable {
                bases: vec![3, 7],
                max_for: BTreeMap::from([("3".to_string(), 5)]),
                sequential: true,
            },
            tasks_detail: vec![
                TaskDetail {
                    expr: "3 × 1".into(),
                    user: "3".into(),
                    check: OutcomeMarker::Correct,
                    correct: 3.0,
                },
                TaskDetail {
                    expr: "3 × 2".into(),
                    user: "5".into(),
                    check: OutcomeMarker::Incorrect,
                    correct: 6.0,
                },
                TaskDetail {
                    expr: "3 × 3".into(),
                    user: "-".into(),
                    check: OutcomeMarker::NotEvaluated,
                    correct: 9.0,
                },
            ],
        }
    }

    #[test]
    fn marker_from_outcome() {
        assert_eq!(OutcomeMarker::from(Outcome::Correct), OutcomeMarker::Correct);
        assert_eq!(OutcomeMarker::from(Outcome::Revealed), OutcomeMarker::NotEvaluated);
        assert_eq!(OutcomeMarker::from(Outcome::Unset), OutcomeMarker::NotEvaluated);
    }

    #[test]
    fn counts_by_marker() {
        let r = sample("2025-01-01T00:00:00Z");
        assert_eq!(r.incorrect(), 1);
        assert_eq!(r.unsolved(), 1);
        assert_eq!(r.mode(), Mode::TTable);
    }

    #[test]
    fn stored_record_json_shape() {
        let record = StoredRecord::new(sample("2025-01-01T00:00:00Z"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["mode"], "ttable");
        assert_eq!(json["run_id"], "ABCD1234");
        assert_eq!(json["tasks_detail"][2]["check"], "not_evaluated");
        assert_eq!(json["max_for"]["3"], 5);

        let back: StoredRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn newest_first_ordering() {
        let mut records = vec![
            StoredRecord::new(sample("2025-01-01T00:00:00Z")),
            StoredRecord::new(sample("2025-03-01T00:00:00Z")),
            StoredRecord::new(sample("2025-02-01T00:00:00Z")),
        ];
        sort_newest_first(&mut records);
        let months: Vec<u32> = records
            .iter()
            .map(|r| chrono::Datelike::month(&r.result.timestamp))
            .collect();
        assert_eq!(months, vec![3, 2, 1]);
    }

    #[test]
    fn run_id_shape() {
        let id = generate_run_id();
        assert_eq!(id.len(), RUN_ID_LEN);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn seconds_formatting() {
        assert_eq!(format_seconds(0), "00:00");
        assert_eq!(format_seconds(75), "01:15");
        assert_eq!(format_seconds(3600), "01:00:00");
        assert_eq!(format_seconds(3725), "01:02:05");
    }
}
