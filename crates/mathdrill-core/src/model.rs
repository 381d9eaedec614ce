//! Core data model types for mathdrill.
//!
//! These are the fundamental types the rest of the system uses to describe
//! practice tasks, how they are generated, and how they were answered.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Smallest batch a generator will produce in count-driven modes.
pub const MIN_TASKS: usize = 5;
/// Largest batch a generator will produce in count-driven modes.
pub const MAX_TASKS: usize = 50;
/// Highest selectable multiplication-table base.
pub const MAX_TABLE_BASE: u32 = 15;
/// Highest selectable per-base multiplier ceiling.
pub const MAX_TABLE_MULT: u32 = 30;
/// Largest operand magnitude accepted from range input.
pub const MAX_OPERAND: i64 = 1_000_000_000;
/// Ceiling used for a selected base with no explicit entry.
pub const DEFAULT_CEILING: u32 = 10;

/// Practice mode. Results are stored separately per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Arithmetic drills over two operand ranges.
    #[serde(rename = "random")]
    Random,
    /// Multiplication-table drills over selected bases.
    #[serde(rename = "ttable")]
    TTable,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Random, Mode::TTable];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Random => "random",
            Mode::TTable => "ttable",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" | "arithmetic" => Ok(Mode::Random),
            "ttable" | "table" | "multiplication" => Ok(Mode::TTable),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Arithmetic operation for `Mode::Random` drills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Symbol used in expression text.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add => write!(f, "add"),
            Operation::Subtract => write!(f, "subtract"),
            Operation::Multiply => write!(f, "multiply"),
            Operation::Divide => write!(f, "divide"),
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" | "+" | "addition" => Ok(Operation::Add),
            "subtract" | "sub" | "-" | "subtraction" => Ok(Operation::Subtract),
            "multiply" | "mul" | "*" | "×" | "x" | "multiplication" => Ok(Operation::Multiply),
            "divide" | "div" | "/" | "÷" | "division" => Ok(Operation::Divide),
            other => Err(format!("unknown operation: {other}")),
        }
    }
}

/// Per-task result classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
    #[default]
    Unset,
    /// Solution shown without an evaluated answer.
    Revealed,
}

/// A single practice problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Identifier, unique within one batch (`task-{index}`).
    pub id: String,
    /// Human-readable expression, e.g. `"7 × 4"`.
    pub expression: String,
    /// Exact (or 4-digit rounded, for non-integer division) result.
    pub expected: f64,
    /// Raw text typed by the participant.
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub outcome: Outcome,
    /// Whether the solution has been shown for this task.
    #[serde(default)]
    pub revealed: bool,
}

impl Task {
    pub fn new(index: usize, expression: String, expected: f64) -> Self {
        Self {
            id: format!("task-{index}"),
            expression,
            expected,
            answer: String::new(),
            outcome: Outcome::Unset,
            revealed: false,
        }
    }

    /// True once the task has either a non-blank answer or a shown solution.
    pub fn is_settled(&self) -> bool {
        !self.answer.trim().is_empty() || self.revealed
    }
}

/// Inclusive integer operand range with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandRange {
    pub min: i64,
    pub max: i64,
}

impl OperandRange {
    /// Build a range, swapping the bounds if they arrive inverted.
    pub fn new(a: i64, b: i64) -> Self {
        if a > b {
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Constraints for an arithmetic batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticConstraints {
    pub a: OperandRange,
    pub b: OperandRange,
    pub operation: Operation,
    /// Division only: operands are chosen so the quotient is an integer.
    #[serde(default)]
    pub integer_only: bool,
    pub count: usize,
}

/// How table tasks are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableOrdering {
    /// Every (base, multiplier) pair, ascending; the requested count is ignored.
    Sequential,
    /// Random draws with no duplicate expression in one batch.
    Randomized,
}

/// Constraints for a multiplication-table batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConstraints {
    pub bases: BTreeSet<u32>,
    /// Per-base multiplier ceiling. Absent bases use [`DEFAULT_CEILING`].
    #[serde(default)]
    pub ceilings: BTreeMap<u32, u32>,
    pub ordering: TableOrdering,
    pub count: usize,
}

impl TableConstraints {
    pub fn ceiling(&self, base: u32) -> u32 {
        self.ceilings.get(&base).copied().unwrap_or(DEFAULT_CEILING)
    }
}

/// Input to the task generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GenerationConstraints {
    Arithmetic(ArithmeticConstraints),
    Table(TableConstraints),
}

impl GenerationConstraints {
    pub fn mode(&self) -> Mode {
        match self {
            GenerationConstraints::Arithmetic(_) => Mode::Random,
            GenerationConstraints::Table(_) => Mode::TTable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_display_and_parse() {
        assert_eq!(Mode::Random.to_string(), "random");
        assert_eq!(Mode::TTable.to_string(), "ttable");
        assert_eq!("ttable".parse::<Mode>().unwrap(), Mode::TTable);
        assert_eq!("Random".parse::<Mode>().unwrap(), Mode::Random);
        assert!("bogus".parse::<Mode>().is_err());
    }

    #[test]
    fn mode_serializes_as_store_key() {
        assert_eq!(serde_json::to_string(&Mode::TTable).unwrap(), "\"ttable\"");
        let m: Mode = serde_json::from_str("\"random\"").unwrap();
        assert_eq!(m, Mode::Random);
    }

    #[test]
    fn operation_parse_accepts_symbols() {
        assert_eq!("÷".parse::<Operation>().unwrap(), Operation::Divide);
        assert_eq!("*".parse::<Operation>().unwrap(), Operation::Multiply);
        assert_eq!("Subtract".parse::<Operation>().unwrap(), Operation::Subtract);
        assert!("modulo".parse::<Operation>().is_err());
        assert_eq!(Operation::Multiply.symbol(), "×");
    }

    #[test]
    fn operand_range_swaps_inverted_bounds() {
        let r = OperandRange::new(9, 3);
        assert_eq!(r, OperandRange { min: 3, max: 9 });
        assert!(r.contains(3) && r.contains(9) && !r.contains(10));
    }

    #[test]
    fn table_ceiling_defaults_to_ten() {
        let c = TableConstraints {
            bases: BTreeSet::from([3, 7]),
            ceilings: BTreeMap::from([(3, 5)]),
            ordering: TableOrdering::Sequential,
            count: 5,
        };
        assert_eq!(c.ceiling(3), 5);
        assert_eq!(c.ceiling(7), DEFAULT_CEILING);
    }

    #[test]
    fn new_task_starts_unset() {
        let t = Task::new(2, "1 + 1".into(), 2.0);
        assert_eq!(t.id, "task-2");
        assert_eq!(t.outcome, Outcome::Unset);
        assert!(!t.is_settled());
    }
}
