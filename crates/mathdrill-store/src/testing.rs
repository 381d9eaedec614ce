//! Shared fixtures for store tests.

use std::collections::BTreeMap;

use mathdrill_core::model::Operation;
use mathdrill_core::results::{OutcomeMarker, SessionParams, SessionResult, TaskDetail};

pub(crate) fn random_result(name: &str, timestamp: &str) -> SessionResult {
    SessionResult {
        run_id: "RUN00001".into(),
        name: name.into(),
        tasks: 2,
        correct: 1,
        seconds: 30,
        finished: false,
        timestamp: timestamp.parse().unwrap(),
        params: SessionParams::Random {
            op_name: Operation::Divide,
            a_start: "3".into(),
            a_end: "9".into(),
            b_start: "1".into(),
            b_end: "3".into(),
            int_only: true,
        },
        tasks_detail: vec![
            TaskDetail {
                expr: "6 ÷ 2".into(),
                user: "3".into(),
                check: OutcomeMarker::Correct,
                correct: 3.0,
            },
            TaskDetail {
                expr: "9 ÷ 3".into(),
                user: "-".into(),
                check: OutcomeMarker::NotEvaluated,
                correct: 3.0,
            },
        ],
    }
}

pub(crate) fn table_result(name: &str, timestamp: &str) -> SessionResult {
    SessionResult {
        run_id: "RUN00002".into(),
        name: name.into(),
        tasks: 1,
        correct: 1,
        seconds: 5,
        finished: true,
        timestamp: timestamp.parse().unwrap(),
        params: SessionParams::TTable {
            bases: vec![7],
            max_for: BTreeMap::from([("7".to_string(), 4)]),
            sequential: false,
        },
        tasks_detail: vec![TaskDetail {
            expr: "7 × 4".into(),
            user: "28".into(),
            check: OutcomeMarker::Correct,
            correct: 28.0,
        }],
    }
}
