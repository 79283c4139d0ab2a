//! This module provides the `TraceRecorder`, a passive observer that turns configurations
//! into printable, serializable snapshots. The explorer hands it frontiers and terminal
//! configurations; nothing it records feeds back into exploration.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;
use crate::machine::MachineDefinition;
use crate::types::TransitionRule;

/// How much the recorder keeps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    /// Record nothing.
    #[default]
    Off,
    /// Attach the root-to-accept path to an accepted result.
    Path,
    /// Additionally record every configuration of every examined round.
    Full,
}

/// The terminal status a trace ends with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Accept,
    Reject,
    Halt,
    Undecided,
}

/// One configuration rendered with names instead of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub depth: usize,
    pub state: String,
    /// Written cells of each tape.
    pub tapes: Vec<String>,
    pub heads: Vec<usize>,
    pub blank: char,
}

impl Snapshot {
    pub fn of(definition: &MachineDefinition, configuration: &Configuration) -> Self {
        let symbol = |id| definition.symbol(id);
        Self {
            depth: configuration.depth(),
            state: definition.state_name(configuration.state()).to_string(),
            tapes: configuration
                .tapes()
                .iter()
                .map(|tape| tape.contents(symbol))
                .collect(),
            heads: configuration.heads(),
            blank: definition.blank_char(),
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.depth, self.state)?;
        for (i, (tape, &head)) in self.tapes.iter().zip(&self.heads).enumerate() {
            write!(f, "\n  Tape {}: ", i + 1)?;
            let cells: Vec<char> = tape.chars().collect();
            for (j, c) in cells.iter().enumerate() {
                if j == head {
                    write!(f, "[{}]", c)?;
                } else {
                    write!(f, "{}", c)?;
                }
            }
            if head >= cells.len() {
                write!(f, "[{}]", self.blank)?;
            }
        }
        Ok(())
    }
}

/// A rule rendered with names instead of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    pub next_state: String,
    pub write: String,
    pub moves: String,
}

impl RuleSnapshot {
    pub fn of(definition: &MachineDefinition, rule: &TransitionRule) -> Self {
        Self {
            next_state: definition.state_name(rule.next_state).to_string(),
            write: rule.write.iter().map(|&s| definition.symbol(s)).collect(),
            moves: rule.moves.iter().map(|d| d.symbol()).collect(),
        }
    }
}

/// One entry of a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TraceRecord {
    Snapshot(Snapshot),
    /// Always the last record of a finished trace.
    Verdict {
        verdict: Verdict,
        depth: usize,
        rule: Option<RuleSnapshot>,
    },
}

/// An ordered list of trace records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub records: Vec<TraceRecord>,
}

impl Trace {
    /// Builds the trace of the path from the root to `terminal`, closed by a verdict record.
    pub fn of_path(
        definition: &MachineDefinition,
        terminal: &Arc<Configuration>,
        verdict: Verdict,
    ) -> Self {
        let mut records: Vec<TraceRecord> = Configuration::path(terminal)
            .iter()
            .map(|configuration| TraceRecord::Snapshot(Snapshot::of(definition, configuration)))
            .collect();
        records.push(verdict_record(definition, verdict, Some(terminal)));
        Self { records }
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.records.iter().filter_map(|record| match record {
            TraceRecord::Snapshot(snapshot) => Some(snapshot),
            TraceRecord::Verdict { .. } => None,
        })
    }

    /// The verdict of the closing record, if the trace is finished.
    pub fn verdict(&self) -> Option<Verdict> {
        match self.records.last() {
            Some(TraceRecord::Verdict { verdict, .. }) => Some(*verdict),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            match record {
                TraceRecord::Snapshot(snapshot) => writeln!(f, "{}", snapshot)?,
                TraceRecord::Verdict {
                    verdict,
                    depth,
                    rule,
                } => {
                    write!(f, "{:?} at step {}", verdict, depth)?;
                    if let Some(rule) = rule {
                        write!(
                            f,
                            " via -> {} write {} move {}",
                            rule.next_state, rule.write, rule.moves
                        )?;
                    }
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}

fn verdict_record(
    definition: &MachineDefinition,
    verdict: Verdict,
    terminal: Option<&Arc<Configuration>>,
) -> TraceRecord {
    TraceRecord::Verdict {
        verdict,
        depth: terminal.map_or(0, |c| c.depth()),
        rule: terminal
            .and_then(|c| c.produced_by())
            .map(|rule| RuleSnapshot::of(definition, rule)),
    }
}

/// Collects per-round snapshots while an exploration runs.
#[derive(Debug, Clone, Default)]
pub struct TraceRecorder {
    level: TraceLevel,
    trace: Trace,
}

impl TraceRecorder {
    pub fn new(level: TraceLevel) -> Self {
        Self {
            level,
            trace: Trace::default(),
        }
    }

    pub fn level(&self) -> TraceLevel {
        self.level
    }

    /// Records every configuration of an examined frontier when the level is `Full`.
    pub fn record_round(&mut self, definition: &MachineDefinition, frontier: &[Arc<Configuration>]) {
        if self.level != TraceLevel::Full {
            return;
        }

        self.trace.records.extend(
            frontier
                .iter()
                .map(|configuration| TraceRecord::Snapshot(Snapshot::of(definition, configuration))),
        );
    }

    /// Appends the closing verdict record. `terminal` is the configuration that decided the
    /// verdict, if any, and supplies the rule that produced it.
    pub fn finish(
        &mut self,
        definition: &MachineDefinition,
        verdict: Verdict,
        terminal: Option<&Arc<Configuration>>,
    ) {
        if self.level == TraceLevel::Off {
            return;
        }

        self.trace
            .records
            .push(verdict_record(definition, verdict, terminal));
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn into_trace(self) -> Trace {
        self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn machine() -> MachineDefinition {
        MachineDefinition::builder("a+", 1)
            .states(["q0", "qacc", "qrej"])
            .input_alphabet(['a'])
            .start("q0")
            .accept("qacc")
            .reject("qrej")
            .rule("q0", ['a'], "q0", ['a'], [Direction::Right])
            .rule("q0", ['_'], "qacc", ['_'], [Direction::Right])
            .build()
            .unwrap()
    }

    fn walk(machine: &MachineDefinition, input: &str) -> Arc<Configuration> {
        let tapes = machine.encode_tapes([input]).unwrap();
        let mut current = Arc::new(Configuration::root(machine.start(), tapes));
        while current.state() != machine.accept() {
            let read = current.read_symbols(machine.blank());
            let rule = &machine.transitions().lookup(current.state(), &read)[0];
            current = Arc::new(Configuration::step(&current, rule));
        }
        current
    }

    #[test]
    fn test_path_trace_ends_with_verdict() {
        let machine = machine();
        let terminal = walk(&machine, "aa");

        let trace = Trace::of_path(&machine, &terminal, Verdict::Accept);

        assert_eq!(trace.len(), 5);
        assert_eq!(trace.verdict(), Some(Verdict::Accept));
        let states: Vec<_> = trace.snapshots().map(|s| s.state.as_str()).collect();
        assert_eq!(states, vec!["q0", "q0", "q0", "qacc"]);

        match trace.records.last() {
            Some(TraceRecord::Verdict { depth, rule, .. }) => {
                assert_eq!(*depth, 3);
                let rule = rule.as_ref().unwrap();
                assert_eq!(rule.next_state, "qacc");
                assert_eq!(rule.moves, "R");
            }
            other => panic!("expected a verdict record, got {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_display_marks_heads() {
        let machine = machine();
        let terminal = walk(&machine, "a");

        let last = Snapshot::of(&machine, &terminal);
        assert_eq!(last.tapes, vec!["a_".to_string()]);
        assert_eq!(last.heads, vec![2]);
        assert_eq!(last.to_string(), "Step 2: qacc\n  Tape 1: a_[_]");
    }

    #[test]
    fn test_recorder_levels() {
        let machine = machine();
        let root = Arc::new(Configuration::root(
            machine.start(),
            machine.encode_tapes(["a"]).unwrap(),
        ));

        let mut off = TraceRecorder::new(TraceLevel::Off);
        off.record_round(&machine, &[Arc::clone(&root)]);
        off.finish(&machine, Verdict::Reject, None);
        assert!(off.trace().is_empty());

        let mut path = TraceRecorder::new(TraceLevel::Path);
        path.record_round(&machine, &[Arc::clone(&root)]);
        path.finish(&machine, Verdict::Undecided, None);
        assert_eq!(path.trace().len(), 1);

        let mut full = TraceRecorder::new(TraceLevel::Full);
        full.record_round(&machine, &[Arc::clone(&root), Arc::clone(&root)]);
        full.finish(&machine, Verdict::Halt, Some(&root));
        let trace = full.into_trace();
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.verdict(), Some(Verdict::Halt));
    }

    #[test]
    fn test_trace_json() {
        let machine = machine();
        let trace = Trace::of_path(&machine, &walk(&machine, ""), Verdict::Accept);

        let json = trace.to_json().unwrap();
        assert!(json.contains("\"kind\": \"snapshot\""));
        assert!(json.contains("\"verdict\": \"accept\""));

        let back: Trace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trace);
    }
}
