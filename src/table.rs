//! The transition relation of a machine: `(state, read symbols) -> [rules]`.

use std::collections::HashMap;

use crate::types::{
    RuleField, StateId, SymbolId, TransitionArityError, TransitionKey, TransitionRule,
};

/// An immutable-after-build mapping from transition keys to the rules sharing that key.
///
/// Rules under one key keep their insertion order; that order is the order in which the
/// explorer spawns child branches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    tape_count: usize,
    rules: HashMap<StateId, HashMap<Box<[SymbolId]>, Vec<TransitionRule>>>,
    len: usize,
}

impl TransitionTable {
    /// Creates an empty table for a machine with `tape_count` tapes.
    pub fn new(tape_count: usize) -> Self {
        Self {
            tape_count,
            rules: HashMap::new(),
            len: 0,
        }
    }

    /// Builds a table from `(key, rule)` pairs, stopping at the first arity mismatch.
    pub fn from_rules(
        tape_count: usize,
        rules: impl IntoIterator<Item = (TransitionKey, TransitionRule)>,
    ) -> Result<Self, TransitionArityError> {
        let mut table = Self::new(tape_count);
        for (key, rule) in rules {
            table.insert(key, rule)?;
        }
        Ok(table)
    }

    /// Adds `rule` under `key`.
    ///
    /// The read, write and move tuples must each have exactly `tape_count` entries.
    pub fn insert(
        &mut self,
        key: TransitionKey,
        rule: TransitionRule,
    ) -> Result<(), TransitionArityError> {
        for (field, found) in [
            (RuleField::Read, key.read.len()),
            (RuleField::Write, rule.write.len()),
            (RuleField::Moves, rule.moves.len()),
        ] {
            if found != self.tape_count {
                return Err(TransitionArityError {
                    state: format!("#{}", key.state.0),
                    field,
                    expected: self.tape_count,
                    found,
                });
            }
        }

        self.rules
            .entry(key.state)
            .or_default()
            .entry(key.read)
            .or_default()
            .push(rule);
        self.len += 1;
        Ok(())
    }

    /// Returns every rule for `(state, read)`, or an empty slice when none matches.
    pub fn lookup(&self, state: StateId, read: &[SymbolId]) -> &[TransitionRule] {
        self.rules
            .get(&state)
            .and_then(|by_symbols| by_symbols.get(read))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns `true` if any rule leaves `state`.
    pub fn has_rules_for(&self, state: StateId) -> bool {
        self.rules
            .get(&state)
            .is_some_and(|by_symbols| !by_symbols.is_empty())
    }

    /// Iterates every `(state, read, rule)` entry. Order across keys is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &[SymbolId], &TransitionRule)> {
        self.rules.iter().flat_map(|(&state, by_symbols)| {
            by_symbols.iter().flat_map(move |(read, rules)| {
                rules.iter().map(move |rule| (state, &**read, rule))
            })
        })
    }

    pub fn tape_count(&self) -> usize {
        self.tape_count
    }

    /// Total number of rules.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if some key maps to more than one rule.
    pub fn is_nondeterministic(&self) -> bool {
        self.rules
            .values()
            .flat_map(HashMap::values)
            .any(|rules| rules.len() > 1)
    }
}
