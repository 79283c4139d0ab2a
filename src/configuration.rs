//! Immutable snapshots of one computation branch.

use std::sync::Arc;

use crate::tape::Tape;
use crate::types::{StateId, SymbolId, TransitionRule};

/// The state, tapes and heads of one branch at one depth, plus a link to the
/// configuration it was derived from.
///
/// A configuration is never mutated after creation. Stepping copies the parent's tapes,
/// so sibling branches never share tape storage.
#[derive(Debug, Clone)]
pub struct Configuration {
    state: StateId,
    tapes: Vec<Tape>,
    depth: usize,
    parent: Option<Arc<Configuration>>,
    produced_by: Option<TransitionRule>,
}

impl Configuration {
    /// Creates the depth-0 configuration for `tapes` with every head on cell 0.
    pub fn root(state: StateId, tapes: Vec<Tape>) -> Self {
        Self {
            state,
            tapes,
            depth: 0,
            parent: None,
            produced_by: None,
        }
    }

    /// Applies `rule` to every tape of `parent` and returns the child one level deeper.
    ///
    /// Tape `i` is written with `rule.write[i]` and then moved by `rule.moves[i]`.
    pub fn step(parent: &Arc<Configuration>, rule: &TransitionRule) -> Configuration {
        let tapes = parent
            .tapes
            .iter()
            .zip(rule.write.iter().zip(rule.moves.iter()))
            .map(|(tape, (&symbol, &direction))| {
                let mut tape = tape.clone();
                tape.write(symbol);
                tape.shift(direction);
                tape
            })
            .collect();

        Configuration {
            state: rule.next_state,
            tapes,
            depth: parent.depth + 1,
            parent: Some(Arc::clone(parent)),
            produced_by: Some(rule.clone()),
        }
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn tapes(&self) -> &[Tape] {
        &self.tapes
    }

    pub fn heads(&self) -> Vec<usize> {
        self.tapes.iter().map(Tape::head).collect()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<&Arc<Configuration>> {
        self.parent.as_ref()
    }

    /// The rule whose application produced this configuration; `None` for the root.
    pub fn produced_by(&self) -> Option<&TransitionRule> {
        self.produced_by.as_ref()
    }

    /// Returns the symbols under every head, using `blank` past the end of a tape.
    pub fn read_symbols(&self, blank: SymbolId) -> Vec<SymbolId> {
        self.tapes.iter().map(|tape| tape.read(blank)).collect()
    }

    /// Returns the chain of configurations from the root down to `this`.
    pub fn path(this: &Arc<Configuration>) -> Vec<Arc<Configuration>> {
        let mut path = Vec::with_capacity(this.depth + 1);
        let mut current = Some(Arc::clone(this));
        while let Some(configuration) = current {
            current = configuration.parent.clone();
            path.push(configuration);
        }
        path.reverse();
        path
    }
}

impl Drop for Configuration {
    // Unlink the ancestor chain iteratively; deep runs would otherwise recurse once per level.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(parent) = next {
            match Arc::try_unwrap(parent) {
                Ok(mut configuration) => next = configuration.parent.take(),
                Err(_) => break,
            }
        }
    }
}
