//! Dashboard statistics over stored session results.
//!
//! Everything here is a pure aggregation over [`StoredRecord`]s; nothing
//! touches a store.

use serde::{Deserialize, Serialize};

use crate::results::{format_seconds, StoredRecord};

/// Totals across a set of saved sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of saved sessions.
    pub attempts: usize,
    pub total_tasks: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// Tasks saved without an evaluated answer.
    pub unsolved: usize,
    pub total_seconds: u64,
    /// Whole seconds per session, rounded down. Zero when there are no attempts.
    pub avg_seconds_per_attempt: u64,
    /// `None` when no tasks were recorded.
    pub avg_seconds_per_task: Option<f64>,
}

impl SummaryStats {
    pub fn avg_attempt_display(&self) -> String {
        format_seconds(self.avg_seconds_per_attempt)
    }

    pub fn avg_task_display(&self) -> String {
        self.avg_seconds_per_task
            .map(|s| format!("{s:.2} s"))
            .unwrap_or_else(|| "-".to_string())
    }
}

/// One dashboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRow {
    pub run_id: String,
    pub name: String,
    pub timestamp: String,
    pub tasks: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unsolved: usize,
    pub elapsed: String,
    pub finished: bool,
}

impl From<&StoredRecord> for RunRow {
    fn from(record: &StoredRecord) -> Self {
        let r = &record.result;
        Self {
            run_id: r.run_id.clone(),
            name: r.name.clone(),
            timestamp: r.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            tasks: r.tasks,
            correct: r.correct,
            incorrect: r.incorrect(),
            unsolved: r.unsolved(),
            elapsed: format_seconds(r.seconds),
            finished: r.finished,
        }
    }
}

/// Records whose participant name equals `name` exactly, or all of them.
pub fn filter_by_name<'a>(records: &'a [StoredRecord], name: Option<&str>) -> Vec<&'a StoredRecord> {
    records
        .iter()
        .filter(|r| name.map_or(true, |n| r.result.name == n))
        .collect()
}

/// Aggregate `records`, optionally restricted to one participant.
pub fn compute_summary(records: &[StoredRecord], name: Option<&str>) -> SummaryStats {
    let selected = filter_by_name(records, name);

    let mut stats = SummaryStats {
        attempts: selected.len(),
        ..Default::default()
    };
    for record in &selected {
        let r = &record.result;
        stats.total_tasks += r.tasks;
        stats.correct += r.correct;
        stats.incorrect += r.incorrect();
        stats.unsolved += r.unsolved();
        stats.total_seconds += r.seconds;
    }

    if stats.attempts > 0 {
        stats.avg_seconds_per_attempt = stats.total_seconds / stats.attempts as u64;
    }
    if stats.total_tasks > 0 {
        stats.avg_seconds_per_task = Some(stats.total_seconds as f64 / stats.total_tasks as f64);
    }
    stats
}

/// Rows for the dashboard table, in the order given.
pub fn run_rows(records: &[StoredRecord], name: Option<&str>) -> Vec<RunRow> {
    filter_by_name(records, name)
        .into_iter()
        .map(RunRow::from)
        .collect()
}

/// The record saved under `run_id`, matched case-insensitively.
///
/// With `records` ordered newest first, a reused identifier resolves to its
/// latest run.
pub fn find_run<'a>(records: &'a [StoredRecord], run_id: &str) -> Option<&'a StoredRecord> {
    let run_id = run_id.trim();
    records
        .iter()
        .find(|r| r.result.run_id.eq_ignore_ascii_case(run_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operation;
    use crate::results::{OutcomeMarker, SessionParams, SessionResult, TaskDetail};

    fn detail(check: OutcomeMarker) -> TaskDetail {
        TaskDetail {
            expr: "3 + 4".into(),
            user: "7".into(),
            check,
            correct: 7.0,
        }
    }

    fn record(name: &str, seconds: u64, checks: &[OutcomeMarker]) -> StoredRecord {
        record_with_id("RUN00001", name, seconds, checks)
    }

    fn record_with_id(
        run_id: &str,
        name: &str,
        seconds: u64,
        checks: &[OutcomeMarker],
    ) -> StoredRecord {
        let correct = checks
            .iter()
            .filter(|c| **c == OutcomeMarker::Correct)
            .count();
        StoredRecord::new(SessionResult {
            run_id: run_id.into(),
            name: name.into(),
            tasks: checks.len(),
            correct,
            seconds,
            finished: correct == checks.len(),
            timestamp: "2025-05-01T10:00:00Z".parse().unwrap(),
            params: SessionParams::Random {
                op_name: Operation::Add,
                a_start: "3".into(),
                a_end: "9".into(),
                b_start: "3".into(),
                b_end: "9".into(),
                int_only: false,
            },
            tasks_detail: checks.iter().copied().map(detail).collect(),
        })
    }

    fn sample() -> Vec<StoredRecord> {
        use OutcomeMarker::*;
        vec![
            record("Anna", 60, &[Correct, Correct, Incorrect, NotEvaluated]),
            record("Bence", 45, &[Correct, Correct, Correct]),
            record("Anna", 31, &[Incorrect, Correct, Correct]),
        ]
    }

    #[test]
    fn summary_over_all_records() {
        let s = compute_summary(&sample(), None);
        assert_eq!(s.attempts, 3);
        assert_eq!(s.total_tasks, 10);
        assert_eq!(s.correct, 7);
        assert_eq!(s.incorrect, 2);
        assert_eq!(s.unsolved, 1);
        assert_eq!(s.total_seconds, 136);
        assert_eq!(s.avg_seconds_per_attempt, 45);
        assert_eq!(s.avg_attempt_display(), "00:45");
        assert_eq!(s.avg_task_display(), "13.60 s");
    }

    #[test]
    fn summary_filtered_by_name() {
        let s = compute_summary(&sample(), Some("Anna"));
        assert_eq!(s.attempts, 2);
        assert_eq!(s.total_tasks, 7);
        assert_eq!(s.correct, 4);
        assert_eq!(s.total_seconds, 91);
        assert_eq!(s.avg_seconds_per_attempt, 45);
    }

    #[test]
    fn empty_summary() {
        let s = compute_summary(&[], None);
        assert_eq!(s, SummaryStats::default());
        assert_eq!(s.avg_task_display(), "-");
        assert_eq!(s.avg_attempt_display(), "00:00");
    }

    #[test]
    fn rows_carry_per_run_counts() {
        let rows = run_rows(&sample(), Some("Bence"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].correct, 3);
        assert_eq!(rows[0].elapsed, "00:45");
        assert_eq!(rows[0].timestamp, "2025-05-01 10:00");
        assert!(rows[0].finished);
    }

    #[test]
    fn find_run_by_identifier() {
        use OutcomeMarker::*;
        let records = vec![
            record_with_id("K3X9QZ01", "Anna", 60, &[Correct, NotEvaluated]),
            record_with_id("B7M2PL44", "Bence", 45, &[Incorrect]),
        ];
        let found = find_run(&records, " b7m2pl44 ").unwrap();
        assert_eq!(found.result.name, "Bence");
        assert_eq!(found.result.tasks_detail[0].check, Incorrect);
        assert!(find_run(&records, "ZZZZZZZZ").is_none());
        assert!(find_run(&[], "K3X9QZ01").is_none());
    }
}
