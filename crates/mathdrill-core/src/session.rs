//! Session state machine and scoring.
//!
//! A [`Session`] owns one generated batch and walks it through
//! `Idle -> Countdown -> Running -> Locked`. It is driven by an external
//! one-second tick (see [`crate::clock::Ticker`]) and never spawns anything
//! itself. All mutation goes through `&mut self`, so a second save cannot
//! start while one is in flight.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::evaluator;
use crate::generator::{TaskBatch, TaskGenerator};
use crate::model::{GenerationConstraints, Mode, Outcome, Task};
use crate::results::{
    format_seconds, generate_run_id, OutcomeMarker, SessionParams, SessionResult, TaskDetail,
};
use crate::traits::ResultStore;

/// Countdown length in ticks.
pub const COUNTDOWN_FROM: u8 = 3;

/// Placeholder stored for a task saved without an answer.
pub const NO_ANSWER: &str = "-";

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "remaining")]
pub enum Phase {
    /// Tasks may be generated; the clock is not running.
    Idle,
    /// Counting down to the start; holds the remaining ticks.
    Countdown(u8),
    /// Answers accepted, elapsed time increments every tick.
    Running,
    /// Clock stopped after reveal-all, waiting for a save.
    Stopped,
    /// Saved. Terminal until the next regeneration.
    Locked,
}

impl Phase {
    /// True while the session needs a tick source.
    pub fn is_ticking(&self) -> bool {
        matches!(self, Phase::Countdown(_) | Phase::Running)
    }
}

/// Everything a session needs besides its tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSetup {
    pub name: String,
    /// Raw parameters recorded with the result.
    pub params: SessionParams,
    /// Normalized constraints handed to the generator.
    pub constraints: GenerationConstraints,
}

impl SessionSetup {
    pub fn mode(&self) -> Mode {
        self.constraints.mode()
    }
}

/// Summary handed back after a successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub id: Uuid,
    pub run_id: String,
    pub name: String,
    pub tasks: usize,
    pub correct: usize,
    pub seconds: u64,
}

impl SaveReceipt {
    pub fn elapsed_display(&self) -> String {
        format_seconds(self.seconds)
    }
}

/// A single practice session.
#[derive(Debug)]
pub struct Session {
    setup: SessionSetup,
    generator: TaskGenerator,
    tasks: Vec<Task>,
    phase: Phase,
    elapsed: u64,
    selected: Option<usize>,
}

impl Session {
    pub fn new(setup: SessionSetup) -> Self {
        Self::with_generator(setup, TaskGenerator::default())
    }

    pub fn with_generator(setup: SessionSetup, generator: TaskGenerator) -> Self {
        Self {
            setup,
            generator,
            tasks: Vec::new(),
            phase: Phase::Idle,
            elapsed: 0,
            selected: None,
        }
    }

    pub fn setup(&self) -> &SessionSetup {
        &self.setup
    }

    pub fn mode(&self) -> Mode {
        self.setup.mode()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds on the session clock.
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_locked(&self) -> bool {
        self.phase == Phase::Locked
    }

    pub fn correct_count(&self) -> usize {
        self.count_outcome(Outcome::Correct)
    }

    pub fn incorrect_count(&self) -> usize {
        self.count_outcome(Outcome::Incorrect)
    }

    /// Tasks with neither an answer nor a shown solution.
    pub fn unsettled_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_settled()).count()
    }

    fn count_outcome(&self, outcome: Outcome) -> usize {
        self.tasks.iter().filter(|t| t.outcome == outcome).count()
    }

    /// Replace the setup. The current batch is kept; call
    /// [`regenerate`](Self::regenerate) to apply new constraints.
    pub fn set_setup(&mut self, setup: SessionSetup) -> Result<(), SessionError> {
        if self.is_locked() {
            return Err(SessionError::Locked);
        }
        self.setup = setup;
        Ok(())
    }

    pub fn set_participant(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        if self.is_locked() {
            return Err(SessionError::Locked);
        }
        self.setup.name = name.into();
        Ok(())
    }

    /// Generate a fresh batch with the thread-local RNG.
    pub fn regenerate(&mut self) -> Result<TaskBatch, SessionError> {
        self.regenerate_with(&mut rand::thread_rng())
    }

    /// Generate a fresh batch, starting a new session cycle.
    ///
    /// Resets the clock, unlocks, clears reveal state and the row selection.
    /// On failure the previous batch and phase are left as they were.
    pub fn regenerate_with<R: Rng>(&mut self, rng: &mut R) -> Result<TaskBatch, SessionError> {
        let batch = self.generator.generate_with(&self.setup.constraints, rng)?;
        self.tasks = batch.tasks.clone();
        self.phase = Phase::Idle;
        self.elapsed = 0;
        self.selected = None;
        tracing::debug!(
            mode = %self.mode(),
            tasks = self.tasks.len(),
            shortfall = batch.shortfall(),
            "regenerated session"
        );
        Ok(batch)
    }

    /// Required fields that are still missing before a countdown may start.
    pub fn readiness(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.setup.name.trim().is_empty() {
            missing.push("participant name".to_string());
        }
        match &self.setup.params {
            SessionParams::Random {
                a_start,
                a_end,
                b_start,
                b_end,
                ..
            } => {
                if [a_start, a_end, b_start, b_end]
                    .iter()
                    .any(|s| s.trim().is_empty())
                {
                    missing.push("operand ranges".to_string());
                }
            }
            SessionParams::TTable { bases, .. } => {
                if bases.is_empty() {
                    missing.push("table selection".to_string());
                }
            }
        }
        if self.tasks.is_empty() {
            missing.push("generated tasks".to_string());
        }
        missing
    }

    /// Enter the 3-2-1 countdown.
    pub fn start_countdown(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Locked => return Err(SessionError::Locked),
            Phase::Countdown(_) | Phase::Running | Phase::Stopped => {
                return Err(SessionError::AlreadyStarted)
            }
            Phase::Idle => {}
        }
        let missing = self.readiness();
        if !missing.is_empty() {
            return Err(SessionError::NotReady { missing });
        }
        self.phase = Phase::Countdown(COUNTDOWN_FROM);
        Ok(())
    }

    /// Advance the clock by one second and return the new phase.
    pub fn tick(&mut self) -> Phase {
        match self.phase {
            Phase::Countdown(n) if n <= 1 => {
                self.phase = Phase::Running;
                self.elapsed = 0;
            }
            Phase::Countdown(n) => self.phase = Phase::Countdown(n - 1),
            Phase::Running => self.elapsed += 1,
            Phase::Idle | Phase::Stopped | Phase::Locked => {}
        }
        self.phase
    }

    /// Record an answer for the task at `index` and evaluate it.
    pub fn answer(&mut self, index: usize, text: &str) -> Result<Outcome, SessionError> {
        match self.phase {
            Phase::Locked => return Err(SessionError::Locked),
            Phase::Running => {}
            _ => return Err(SessionError::NotRunning),
        }
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(SessionError::IndexOutOfRange(index))?;
        if task.revealed {
            return Err(SessionError::AlreadyViewed(task.id.clone()));
        }
        task.answer = text.to_string();
        task.outcome = evaluator::evaluate(text, task.expected);
        Ok(task.outcome)
    }

    /// Point the reveal-one action at a task.
    pub fn select(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.tasks.len() {
            return Err(SessionError::IndexOutOfRange(index));
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Show the solution of the selected task.
    ///
    /// An already evaluated answer keeps its outcome; an unanswered task
    /// becomes [`Outcome::Revealed`]. Either way the task stops accepting
    /// answers.
    pub fn reveal_selected(&mut self) -> Result<&Task, SessionError> {
        if self.is_locked() {
            return Err(SessionError::Locked);
        }
        let index = self.selected.ok_or(SessionError::NoSelection)?;
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(SessionError::IndexOutOfRange(index))?;
        if task.revealed {
            return Err(SessionError::AlreadyViewed(task.id.clone()));
        }
        task.revealed = true;
        if task.outcome == Outcome::Unset {
            task.outcome = Outcome::Revealed;
        }
        Ok(task)
    }

    /// Show every solution and stop the clock.
    pub fn reveal_all(&mut self) -> Result<(), SessionError> {
        if self.is_locked() {
            return Err(SessionError::Locked);
        }
        if self.tasks.is_empty() {
            return Err(SessionError::NoTasks);
        }
        for task in &mut self.tasks {
            task.revealed = true;
            if task.outcome == Outcome::Unset {
                task.outcome = Outcome::Revealed;
            }
        }
        self.phase = Phase::Stopped;
        self.selected = None;
        Ok(())
    }

    /// Check every save precondition without touching the store.
    pub fn can_save(&self) -> Result<(), SessionError> {
        if self.is_locked() {
            return Err(SessionError::Locked);
        }
        if self.tasks.is_empty() {
            return Err(SessionError::NoTasks);
        }
        if self.setup.name.trim().is_empty() {
            return Err(SessionError::NameMissing);
        }
        let unsettled = self.unsettled_count();
        if unsettled > 0 {
            return Err(SessionError::Incomplete { unsettled });
        }
        Ok(())
    }

    /// Snapshot the session as a persistable result.
    pub fn build_result(&self) -> SessionResult {
        let correct = self.correct_count();
        SessionResult {
            run_id: generate_run_id(),
            name: self.setup.name.trim().to_string(),
            tasks: self.tasks.len(),
            correct,
            seconds: self.elapsed,
            finished: correct == self.tasks.len(),
            timestamp: chrono::Utc::now(),
            params: self.setup.params.clone(),
            tasks_detail: self.tasks.iter().map(task_detail).collect(),
        }
    }

    /// Persist the session and lock it.
    ///
    /// Rejected before any store call when a precondition fails. On a store
    /// failure the session is left exactly as it was, so the save can be
    /// retried.
    pub async fn save(&mut self, store: &dyn ResultStore) -> Result<SaveReceipt, SessionError> {
        self.can_save()?;
        let result = self.build_result();
        let record = match store.save(&result).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(store = store.name(), error = %e, "failed to save session");
                return Err(e.into());
            }
        };

        self.phase = Phase::Locked;
        self.selected = None;
        tracing::info!(
            run_id = %result.run_id,
            name = %result.name,
            correct = result.correct,
            tasks = result.tasks,
            "session saved"
        );
        Ok(SaveReceipt {
            id: record.id,
            run_id: result.run_id,
            name: result.name,
            tasks: result.tasks,
            correct: result.correct,
            seconds: result.seconds,
        })
    }

    /// Reveal every solution, then save immediately.
    pub async fn reveal_all_and_save(
        &mut self,
        store: &dyn ResultStore,
    ) -> Result<SaveReceipt, SessionError> {
        self.reveal_all()?;
        self.save(store).await
    }
}

/// Detail entry for a saved task. Any typed text is kept as entered.
fn task_detail(task: &Task) -> TaskDetail {
    TaskDetail {
        expr: task.expression.clone(),
        user: if task.answer.is_empty() {
            NO_ANSWER.to_string()
        } else {
            task.answer.clone()
        },
        check: OutcomeMarker::from(task.outcome),
        correct: task.expected,
    }
}
