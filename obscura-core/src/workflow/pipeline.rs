//! Workflow step sequencer
//!
//! Tracks the fixed generation workflow through its seven steps. The
//! pipeline is a pure sequencer: the caller feeds in per-step outcome
//! reports (protocol replies from the render host, or the local
//! projection result) and elapsed time, and the pipeline decides
//! whether the workflow advances, finishes, or fails. There are no
//! retries; a failed critical step fails the whole session.

use obscura_protocol::{StepReport, WorkflowStep};

/// Per-step wall-clock budgets in milliseconds, in sequence order
const STEP_BUDGETS_MS: [u32; 7] = [
    1_000,   // ComputeTarget (local, effectively instant)
    30_000,  // FetchEnvironment
    10_000,  // PrepareFeatures
    20_000,  // PredictStyle
    30_000,  // RenderMap
    180_000, // GenerateArtwork
    60_000,  // SyncArchive
];

/// Whether a step failure fails the workflow
fn is_critical(step: WorkflowStep) -> bool {
    !matches!(step, WorkflowStep::RenderMap | WorkflowStep::SyncArchive)
}

/// Recorded outcome for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepState {
    /// Not reached yet
    Pending,
    /// Currently executing
    Active,
    /// Finished normally
    Done,
    /// Finished on a fallback, or skipped after a best-effort failure
    Degraded,
    /// Failed (only recorded for the step that killed the workflow)
    Failed,
}

/// What the pipeline decided after an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Advance {
    /// Nothing changed
    NoChange,
    /// The named step is now active
    Next(WorkflowStep),
    /// All steps finished
    Finished,
    /// A critical step failed or timed out
    Failed(WorkflowStep),
}

/// Sequencer for one workflow run
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Index into [`WorkflowStep::SEQUENCE`], = 7 when finished
    cursor: usize,
    outcomes: [StepState; 7],
    /// Time spent in the active step
    step_elapsed_ms: u32,
    running: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create an idle pipeline
    pub fn new() -> Self {
        Self {
            cursor: 0,
            outcomes: [StepState::Pending; 7],
            step_elapsed_ms: 0,
            running: false,
        }
    }

    /// Start a run at the first step
    pub fn start(&mut self) -> Advance {
        *self = Self::new();
        self.running = true;
        self.outcomes[0] = StepState::Active;
        Advance::Next(WorkflowStep::SEQUENCE[0])
    }

    /// Check if a run is in flight
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The step currently executing, if any
    pub fn current_step(&self) -> Option<WorkflowStep> {
        if !self.running {
            return None;
        }
        WorkflowStep::SEQUENCE.get(self.cursor).copied()
    }

    /// Recorded outcome for a step
    pub fn step_state(&self, step: WorkflowStep) -> StepState {
        self.outcomes[step.index()]
    }

    /// Integer percent progress, by completed steps
    pub fn percent(&self) -> u8 {
        let done = self
            .outcomes
            .iter()
            .filter(|s| matches!(s, StepState::Done | StepState::Degraded))
            .count();
        (done * 100 / self.outcomes.len()) as u8
    }

    /// Feed a completion report for a step
    ///
    /// Reports for a step other than the active one are stale (the
    /// workflow already moved on, or was aborted) and are ignored.
    pub fn report(&mut self, step: WorkflowStep, report: StepReport) -> Advance {
        if !self.running || self.current_step() != Some(step) {
            return Advance::NoChange;
        }

        let outcome = match report {
            StepReport::Ok => StepState::Done,
            StepReport::Degraded => StepState::Degraded,
            StepReport::Failed if is_critical(step) => {
                self.outcomes[step.index()] = StepState::Failed;
                self.running = false;
                return Advance::Failed(step);
            }
            // Best-effort step: note it and move on
            StepReport::Failed => StepState::Degraded,
        };
        self.outcomes[step.index()] = outcome;
        self.advance()
    }

    /// Advance time; the active step failing its budget counts as a
    /// failure report
    pub fn update_time(&mut self, delta_ms: u32) -> Advance {
        let Some(step) = self.current_step() else {
            return Advance::NoChange;
        };

        self.step_elapsed_ms = self.step_elapsed_ms.saturating_add(delta_ms);
        if self.step_elapsed_ms < STEP_BUDGETS_MS[step.index()] {
            return Advance::NoChange;
        }

        self.report(step, StepReport::Failed)
    }

    /// Abort the run (visitor reset, staff reset, link loss)
    pub fn abort(&mut self) {
        self.running = false;
    }

    fn advance(&mut self) -> Advance {
        self.cursor += 1;
        self.step_elapsed_ms = 0;

        match WorkflowStep::SEQUENCE.get(self.cursor) {
            Some(&step) => {
                self.outcomes[step.index()] = StepState::Active;
                Advance::Next(step)
            }
            None => {
                self.running = false;
                Advance::Finished
            }
        }
    }
}
