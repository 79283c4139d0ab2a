//! This module defines the `Explorer`, which decides whether a nondeterministic k-tape
//! machine accepts its input by expanding every computation branch breadth-first.
//!
//! The whole frontier of depth `d` is examined before any configuration of depth `d + 1`,
//! so the first accepting configuration found is a shallowest one. A run ends with exactly
//! one `ExecutionResult`:
//!
//! * `Accepted` as soon as an examined frontier contains the accept state.
//! * `Rejected` when the frontier runs dry and some branch entered the reject state.
//! * `Undecided` when the step bound is reached, or when every branch halted on a missing
//!   transition without ever rejecting (see `HaltPolicy`).

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use crate::machine::MachineDefinition;
use crate::trace::{Trace, TraceLevel, TraceRecorder, Verdict};
use crate::types::{MachineError, TransitionRule, DEFAULT_STEP_BOUND};

/// Frontier size from which expansion is spread over the rayon thread pool by default.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// What an exhausted frontier means when no branch ever entered the reject state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HaltPolicy {
    /// Branches without a matching transition halt; if all branches halt the run is
    /// `Undecided(AllBranchesHalted)`.
    #[default]
    Distinct,
    /// Halted branches count as rejections.
    Reject,
}

/// Run-time knobs of the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerOptions {
    /// Maximum number of breadth-first rounds before the run is declared undecided.
    pub step_bound: usize,
    pub trace: TraceLevel,
    pub halt_policy: HaltPolicy,
    /// Expand in parallel once the frontier has at least this many configurations.
    /// `None` always expands sequentially.
    pub parallel_threshold: Option<usize>,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            step_bound: DEFAULT_STEP_BOUND,
            trace: TraceLevel::default(),
            halt_policy: HaltPolicy::default(),
            parallel_threshold: Some(DEFAULT_PARALLEL_THRESHOLD),
        }
    }
}

impl ExplorerOptions {
    pub fn with_step_bound(mut self, step_bound: usize) -> Self {
        self.step_bound = step_bound;
        self
    }

    pub fn with_trace(mut self, trace: TraceLevel) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_halt_policy(mut self, halt_policy: HaltPolicy) -> Self {
        self.halt_policy = halt_policy;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: Option<usize>) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}

/// Why a run ended without a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UndecidedReason {
    /// The step bound was reached with live branches left.
    StepBoundExceeded,
    /// Every branch stopped on a missing transition and none was rejected.
    AllBranchesHalted,
}

/// The outcome of one run.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    /// Some branch reached the accept state. `trace` is the root-to-accept path when
    /// tracing is enabled.
    Accepted {
        configuration: Arc<Configuration>,
        trace: Option<Trace>,
    },
    Rejected,
    Undecided(UndecidedReason),
}

impl ExecutionResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ExecutionResult::Accepted { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ExecutionResult::Rejected)
    }

    pub fn is_undecided(&self) -> bool {
        matches!(self, ExecutionResult::Undecided(_))
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            ExecutionResult::Accepted { .. } => Verdict::Accept,
            ExecutionResult::Rejected => Verdict::Reject,
            ExecutionResult::Undecided(UndecidedReason::AllBranchesHalted) => Verdict::Halt,
            ExecutionResult::Undecided(UndecidedReason::StepBoundExceeded) => Verdict::Undecided,
        }
    }

    /// The accepting configuration, if any.
    pub fn configuration(&self) -> Option<&Arc<Configuration>> {
        match self {
            ExecutionResult::Accepted { configuration, .. } => Some(configuration),
            _ => None,
        }
    }

    pub fn trace(&self) -> Option<&Trace> {
        match self {
            ExecutionResult::Accepted { trace, .. } => trace.as_ref(),
            _ => None,
        }
    }
}

/// Diagnostics of one run, readable during streaming and after completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Number of frontiers expanded into a next frontier.
    pub rounds: usize,
    /// Configurations examined, across all rounds.
    pub configurations_visited: usize,
    /// Depth of the deepest examined frontier.
    pub max_depth: usize,
    /// Size of each examined frontier, in round order.
    pub frontier_sizes: Vec<usize>,
    /// Branches dropped because no rule matched.
    pub halted_branches: usize,
    /// Branches dropped because they entered the reject state.
    pub rejected_branches: usize,
}

/// One item of the streaming interface.
#[derive(Debug, Clone)]
pub enum RoundEvent {
    /// A frontier was examined.
    Frontier {
        depth: usize,
        configurations: Vec<Arc<Configuration>>,
    },
    /// The run is over; always the last event.
    Finished(ExecutionResult),
}

/// Why a branch stops without producing children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeadEnd {
    Rejected,
    Halted,
}

/// The rules that apply to `configuration`, or why none will ever be applied.
fn classify<'t>(
    definition: &'t MachineDefinition,
    configuration: &Configuration,
) -> Result<&'t [TransitionRule], DeadEnd> {
    if configuration.state() == definition.reject() {
        return Err(DeadEnd::Rejected);
    }

    let read = configuration.read_symbols(definition.blank());
    let rules = definition.transitions().lookup(configuration.state(), &read);
    if rules.is_empty() {
        return Err(DeadEnd::Halted);
    }
    Ok(rules)
}

fn expand_one(
    definition: &MachineDefinition,
    configuration: &Arc<Configuration>,
) -> Result<Vec<Arc<Configuration>>, DeadEnd> {
    let rules = classify(definition, configuration)?;
    Ok(rules
        .iter()
        .map(|rule| Arc::new(Configuration::step(configuration, rule)))
        .collect())
}

/// A breadth-first exploration in progress.
///
/// Yields one `RoundEvent::Frontier` per examined round and then a single
/// `RoundEvent::Finished`. The sequence is finite for any step bound; to start over,
/// call `Explorer::explore` again.
#[derive(Debug)]
pub struct Exploration<'d> {
    definition: &'d MachineDefinition,
    options: ExplorerOptions,
    frontier: Vec<Arc<Configuration>>,
    depth: usize,
    stats: RunStats,
    recorder: TraceRecorder,
    last_rejected: Option<Arc<Configuration>>,
    last_halted: Option<Arc<Configuration>>,
    outcome: Option<ExecutionResult>,
    finished: bool,
}

impl<'d> Exploration<'d> {
    fn new(
        definition: &'d MachineDefinition,
        options: ExplorerOptions,
        root: Configuration,
    ) -> Self {
        let recorder = TraceRecorder::new(options.trace);
        Self {
            definition,
            options,
            frontier: vec![Arc::new(root)],
            depth: 0,
            stats: RunStats::default(),
            recorder,
            last_rejected: None,
            last_halted: None,
            outcome: None,
            finished: false,
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn recorder(&self) -> &TraceRecorder {
        &self.recorder
    }

    /// The final result, once it has been decided.
    pub fn outcome(&self) -> Option<&ExecutionResult> {
        self.outcome.as_ref()
    }

    /// Drives the exploration to its end and returns the result.
    ///
    /// Remaining rounds are examined without being yielded; afterwards the iterator is done.
    pub fn finish(&mut self) -> ExecutionResult {
        loop {
            if let Some(result) = &self.outcome {
                self.finished = true;
                return result.clone();
            }
            self.examine();
        }
    }

    fn into_parts(self) -> (RunStats, TraceRecorder) {
        (self.stats, self.recorder)
    }

    fn decide(&mut self, result: ExecutionResult, terminal: Option<Arc<Configuration>>) {
        tracing::info!(
            "{}: {:?} after {} rounds, {} configurations visited",
            self.definition.name(),
            result.verdict(),
            self.stats.rounds,
            self.stats.configurations_visited
        );

        self.recorder
            .finish(self.definition, result.verdict(), terminal.as_ref());
        self.outcome = Some(result);
    }

    fn accept(&mut self, configuration: Arc<Configuration>) {
        let trace = (self.options.trace != TraceLevel::Off)
            .then(|| Trace::of_path(self.definition, &configuration, Verdict::Accept));
        let result = ExecutionResult::Accepted {
            configuration: Arc::clone(&configuration),
            trace,
        };
        self.decide(result, Some(configuration));
    }

    fn exhausted(&mut self) {
        if self.stats.rejected_branches > 0 {
            let terminal = self.last_rejected.clone();
            self.decide(ExecutionResult::Rejected, terminal);
            return;
        }

        let terminal = self.last_halted.clone();
        let result = match self.options.halt_policy {
            HaltPolicy::Distinct => ExecutionResult::Undecided(UndecidedReason::AllBranchesHalted),
            HaltPolicy::Reject => ExecutionResult::Rejected,
        };
        self.decide(result, terminal);
    }

    fn stop(&mut self, configuration: &Arc<Configuration>, dead_end: DeadEnd) {
        match dead_end {
            DeadEnd::Rejected => {
                tracing::trace!("branch rejected at depth {}", configuration.depth());
                self.stats.rejected_branches += 1;
                self.last_rejected = Some(Arc::clone(configuration));
            }
            DeadEnd::Halted => {
                tracing::trace!(
                    "branch halted in {} at depth {}",
                    self.definition.state_name(configuration.state()),
                    configuration.depth()
                );
                self.stats.halted_branches += 1;
                self.last_halted = Some(Arc::clone(configuration));
            }
        }
    }

    /// Drops the dead ends of the frontier at the step bound. Returns `true` if some
    /// branch could still take a step.
    fn settle(&mut self, frontier: &[Arc<Configuration>]) -> bool {
        let mut live = false;
        for configuration in frontier {
            match classify(self.definition, configuration) {
                Ok(_) => live = true,
                Err(dead_end) => self.stop(configuration, dead_end),
            }
        }
        live
    }

    fn expand(&mut self, frontier: &[Arc<Configuration>]) -> Vec<Arc<Configuration>> {
        let definition = self.definition;
        let parallel = self
            .options
            .parallel_threshold
            .is_some_and(|threshold| frontier.len() >= threshold);

        // Both paths keep frontier order, so the next frontier is identical either way.
        let expansions: Vec<Result<Vec<Arc<Configuration>>, DeadEnd>> = if parallel {
            frontier
                .par_iter()
                .map(|configuration| expand_one(definition, configuration))
                .collect()
        } else {
            frontier
                .iter()
                .map(|configuration| expand_one(definition, configuration))
                .collect()
        };

        let mut next = Vec::new();
        for (configuration, expansion) in frontier.iter().zip(expansions) {
            match expansion {
                Ok(children) => next.extend(children),
                Err(dead_end) => self.stop(configuration, dead_end),
            }
        }

        self.stats.rounds += 1;
        next
    }

    /// Examines the current frontier. Returns `None` when there was none left, in which case
    /// the outcome has been decided.
    fn examine(&mut self) -> Option<RoundEvent> {
        if self.frontier.is_empty() {
            self.exhausted();
            return None;
        }

        let frontier = std::mem::take(&mut self.frontier);
        let depth = self.depth;
        tracing::debug!("round {}: {} configurations", depth, frontier.len());

        self.stats.frontier_sizes.push(frontier.len());
        self.stats.max_depth = depth;
        self.recorder.record_round(self.definition, &frontier);

        let accept = self.definition.accept();
        match frontier.iter().position(|c| c.state() == accept) {
            Some(index) => {
                self.stats.configurations_visited += index + 1;
                self.accept(Arc::clone(&frontier[index]));
            }
            None if depth >= self.options.step_bound => {
                self.stats.configurations_visited += frontier.len();
                if self.settle(&frontier) {
                    self.decide(
                        ExecutionResult::Undecided(UndecidedReason::StepBoundExceeded),
                        None,
                    );
                } else {
                    self.exhausted();
                }
            }
            None => {
                self.stats.configurations_visited += frontier.len();
                self.frontier = self.expand(&frontier);
                self.depth += 1;
            }
        }

        Some(RoundEvent::Frontier {
            depth,
            configurations: frontier,
        })
    }
}

impl Iterator for Exploration<'_> {
    type Item = RoundEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if self.outcome.is_none() {
            if let Some(event) = self.examine() {
                return Some(event);
            }
        }

        self.finished = true;
        self.outcome.clone().map(RoundEvent::Finished)
    }
}

/// Runs a `MachineDefinition` against initial tapes.
///
/// The definition is borrowed for the explorer's lifetime. Statistics and the recorder of
/// the latest `run` remain readable afterwards.
#[derive(Debug)]
pub struct Explorer<'d> {
    definition: &'d MachineDefinition,
    options: ExplorerOptions,
    stats: RunStats,
    recorder: TraceRecorder,
}

impl<'d> Explorer<'d> {
    pub fn new(definition: &'d MachineDefinition) -> Self {
        Self {
            definition,
            options: ExplorerOptions::default(),
            stats: RunStats::default(),
            recorder: TraceRecorder::default(),
        }
    }

    pub fn with_options(mut self, options: ExplorerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn definition(&self) -> &'d MachineDefinition {
        self.definition
    }

    pub fn options(&self) -> &ExplorerOptions {
        &self.options
    }

    /// Starts a streaming exploration of `tapes`.
    ///
    /// Input errors are reported here, before any configuration is examined.
    pub fn explore<I, S>(&self, tapes: I) -> Result<Exploration<'d>, MachineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tapes = self.definition.encode_tapes(tapes)?;
        tracing::info!(
            "exploring {} ({} tapes, step bound {})",
            self.definition.name(),
            self.definition.tape_count(),
            self.options.step_bound
        );

        let root = Configuration::root(self.definition.start(), tapes);
        Ok(Exploration::new(self.definition, self.options.clone(), root))
    }

    /// Runs to completion and returns the result.
    pub fn run<I, S>(&mut self, tapes: I) -> Result<ExecutionResult, MachineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut exploration = self.explore(tapes)?;
        let result = exploration.finish();

        let (stats, recorder) = exploration.into_parts();
        self.stats = stats;
        self.recorder = recorder;

        Ok(result)
    }

    /// Statistics of the latest `run`.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// The recorder of the latest `run`.
    pub fn recorder(&self) -> &TraceRecorder {
        &self.recorder
    }
}

/// Decides `initial_tapes` on `definition` with at most `step_bound` breadth-first rounds.
pub fn run<I, S>(
    definition: &MachineDefinition,
    initial_tapes: I,
    step_bound: usize,
) -> Result<ExecutionResult, MachineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Explorer::new(definition)
        .with_options(ExplorerOptions::default().with_step_bound(step_bound))
        .run(initial_tapes)
}
