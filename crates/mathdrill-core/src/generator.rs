//! Task generation.
//!
//! Produces ordered batches of arithmetic or multiplication-table tasks from
//! [`GenerationConstraints`]. Every randomized draw loop is bounded by an
//! explicit attempt budget.

use std::collections::HashSet;

use rand::Rng;

use crate::error::GenerationError;
use crate::model::{
    ArithmeticConstraints, GenerationConstraints, Operation, TableConstraints, TableOrdering, Task,
};

/// Configuration for the task generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Draws allowed for a single arithmetic slot before giving up.
    pub max_slot_attempts: usize,
    /// Randomized table mode may try `count * attempts_per_table_task` draws.
    pub attempts_per_table_task: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_slot_attempts: 1_000,
            attempts_per_table_task: 50,
        }
    }
}

/// A generated batch.
#[derive(Debug, Clone)]
pub struct TaskBatch {
    pub tasks: Vec<Task>,
    /// How many tasks were asked for. Sequential table batches report their
    /// full size here since the requested count does not apply.
    pub requested: usize,
}

impl TaskBatch {
    /// Number of tasks the generator could not place.
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.tasks.len())
    }
}

/// The task generator.
#[derive(Debug, Clone, Default)]
pub struct TaskGenerator {
    config: GeneratorConfig,
}

impl TaskGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate a batch using the thread-local RNG.
    pub fn generate(
        &self,
        constraints: &GenerationConstraints,
    ) -> Result<TaskBatch, GenerationError> {
        self.generate_with(constraints, &mut rand::thread_rng())
    }

    /// Generate a batch drawing from `rng`.
    pub fn generate_with<R: Rng>(
        &self,
        constraints: &GenerationConstraints,
        rng: &mut R,
    ) -> Result<TaskBatch, GenerationError> {
        match constraints {
            GenerationConstraints::Arithmetic(c) => self.arithmetic(c, rng),
            GenerationConstraints::Table(c) => match c.ordering {
                TableOrdering::Sequential => table_sequential(c),
                TableOrdering::Randomized => self.table_randomized(c, rng),
            },
        }
    }

    fn arithmetic<R: Rng>(
        &self,
        c: &ArithmeticConstraints,
        rng: &mut R,
    ) -> Result<TaskBatch, GenerationError> {
        let mut tasks = Vec::with_capacity(c.count);
        for index in 0..c.count {
            let (a, b, expected) = self.draw_slot(c, rng)?;
            let expression = format!("{a} {} {b}", c.operation.symbol());
            tasks.push(Task::new(index, expression, expected));
        }
        Ok(TaskBatch {
            tasks,
            requested: c.count,
        })
    }

    /// Draw one (a, b, result) triple, redrawing until the slot is valid.
    fn draw_slot<R: Rng>(
        &self,
        c: &ArithmeticConstraints,
        rng: &mut R,
    ) -> Result<(i64, i64, f64), GenerationError> {
        for _ in 0..self.config.max_slot_attempts {
            if c.operation == Operation::Divide && c.integer_only {
                let b = rng.gen_range(c.b.min..=c.b.max);
                if b == 0 {
                    continue;
                }
                let Some((k_min, k_max)) = quotient_range(c.a.min, c.a.max, b) else {
                    continue;
                };
                let k = rng.gen_range(k_min..=k_max);
                let Some(a) = b.checked_mul(k) else {
                    continue;
                };
                return Ok((a, b, k as f64));
            }

            let a = rng.gen_range(c.a.min..=c.a.max);
            let b = rng.gen_range(c.b.min..=c.b.max);
            if c.operation == Operation::Divide && b == 0 {
                continue;
            }
            return Ok((a, b, apply(c.operation, a, b)));
        }

        tracing::warn!(
            operation = %c.operation,
            attempts = self.config.max_slot_attempts,
            "no valid task for constraints"
        );
        Err(GenerationError::Unsatisfiable {
            attempts: self.config.max_slot_attempts,
        })
    }

    fn table_randomized<R: Rng>(
        &self,
        c: &TableConstraints,
        rng: &mut R,
    ) -> Result<TaskBatch, GenerationError> {
        let bases: Vec<u32> = c.bases.iter().copied().collect();
        if bases.is_empty() {
            return Err(GenerationError::EmptySelection);
        }

        let budget = c.count * self.config.attempts_per_table_task;
        let mut used = HashSet::new();
        let mut tasks = Vec::with_capacity(c.count);
        let mut attempts = 0usize;

        while tasks.len() < c.count && attempts < budget {
            attempts += 1;
            let base = bases[rng.gen_range(0..bases.len())];
            let multiplier = rng.gen_range(1..=c.ceiling(base).max(1));
            let expression = table_expression(base, multiplier);
            if !used.insert(expression.clone()) {
                continue;
            }
            let expected = f64::from(base) * f64::from(multiplier);
            tasks.push(Task::new(tasks.len(), expression, expected));
        }

        let batch = TaskBatch {
            tasks,
            requested: c.count,
        };
        if batch.shortfall() > 0 {
            tracing::warn!(
                requested = batch.requested,
                generated = batch.tasks.len(),
                "retry budget exhausted; batch is short"
            );
        }
        Ok(batch)
    }
}

fn table_sequential(c: &TableConstraints) -> Result<TaskBatch, GenerationError> {
    if c.bases.is_empty() {
        return Err(GenerationError::EmptySelection);
    }
    let mut tasks = Vec::new();
    for &base in &c.bases {
        for multiplier in 1..=c.ceiling(base).max(1) {
            let expected = f64::from(base) * f64::from(multiplier);
            tasks.push(Task::new(
                tasks.len(),
                table_expression(base, multiplier),
                expected,
            ));
        }
    }
    let requested = tasks.len();
    Ok(TaskBatch { tasks, requested })
}

fn table_expression(base: u32, multiplier: u32) -> String {
    format!("{base} × {multiplier}")
}

/// Compute `a op b`. Division is rounded to four decimal digits.
pub fn apply(operation: Operation, a: i64, b: i64) -> f64 {
    let (a, b) = (i128::from(a), i128::from(b));
    match operation {
        Operation::Add => (a + b) as f64,
        Operation::Subtract => (a - b) as f64,
        Operation::Multiply => (a * b) as f64,
        Operation::Divide => round4(a as f64 / b as f64),
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Integer quotients `k` with `a_min <= b * k <= a_max`, or `None` if empty.
///
/// Overflowing divisions (`i64::MIN / -1`) count as an empty range.
fn quotient_range(a_min: i64, a_max: i64, b: i64) -> Option<(i64, i64)> {
    let (lo, hi) = if b > 0 {
        (div_ceil(a_min, b)?, div_floor(a_max, b)?)
    } else {
        (div_ceil(a_max, b)?, div_floor(a_min, b)?)
    };
    (lo <= hi).then_some((lo, hi))
}

fn div_floor(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a.checked_rem(b)? != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn div_ceil(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a.checked_rem(b)? != 0 && ((a < 0) == (b < 0)) {
        Some(q + 1)
    } else {
        Some(q)
    }
}
