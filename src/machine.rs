//! This module defines `MachineDefinition`, the static description of a nondeterministic
//! k-tape Turing machine, and `MachineBuilder`, the only way to construct one.
//!
//! States and symbols are given by name when building and interned into dense ids; the
//! finished definition is immutable and is borrowed read-only by the explorer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::alphabet::Interner;
use crate::analyzer;
use crate::table::TransitionTable;
use crate::tape::Tape;
use crate::types::{
    DefinitionError, Direction, MachineError, StateId, SymbolId, TransitionKey, TransitionRule,
    DEFAULT_BLANK_SYMBOL,
};

/// A validated, immutable k-tape machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineDefinition {
    name: String,
    tape_count: usize,
    states: Interner<String>,
    symbols: Interner<char>,
    input_alphabet: HashSet<SymbolId>,
    blank: SymbolId,
    start: StateId,
    accept: StateId,
    reject: StateId,
    transitions: TransitionTable,
}

/// Summary information about a machine definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineInfo {
    pub name: String,
    pub tape_count: usize,
    pub state_count: usize,
    pub symbol_count: usize,
    pub rule_count: usize,
    pub nondeterministic: bool,
}

impl MachineDefinition {
    /// Starts building a machine called `name` with `tape_count` tapes.
    pub fn builder(name: impl Into<String>, tape_count: usize) -> MachineBuilder {
        MachineBuilder::new(name, tape_count)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tape_count(&self) -> usize {
        self.tape_count
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn accept(&self) -> StateId {
        self.accept
    }

    pub fn reject(&self) -> StateId {
        self.reject
    }

    pub fn blank(&self) -> SymbolId {
        self.blank
    }

    pub fn blank_char(&self) -> char {
        self.symbol(self.blank)
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Returns the name of `state`. Ids always come from this definition, so lookups
    /// of foreign ids render as `"?"`.
    pub fn state_name(&self, state: StateId) -> &str {
        self.states
            .resolve(state.0 as usize)
            .map(String::as_str)
            .unwrap_or("?")
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states
            .get(name)
            .and_then(|id| StateId::try_from(id).ok())
    }

    pub fn states(&self) -> &[String] {
        self.states.values()
    }

    /// Returns the character for `symbol`, or the blank character for a foreign id.
    pub fn symbol(&self, symbol: SymbolId) -> char {
        self.symbols
            .resolve(symbol.0 as usize)
            .copied()
            .unwrap_or(DEFAULT_BLANK_SYMBOL)
    }

    pub fn symbol_id(&self, c: char) -> Option<SymbolId> {
        self.symbols
            .get(&c)
            .and_then(|id| SymbolId::try_from(id).ok())
    }

    /// The tape alphabet, blank included.
    pub fn tape_alphabet(&self) -> &[char] {
        self.symbols.values()
    }

    pub fn is_input_symbol(&self, c: char) -> bool {
        self.symbol_id(c)
            .is_some_and(|id| self.input_alphabet.contains(&id))
    }

    /// Converts the caller's initial tape strings into tapes.
    ///
    /// Every character must be in the input alphabet or be the blank symbol. Fails before
    /// any exploration starts.
    pub fn encode_tapes<I, S>(&self, initial: I) -> Result<Vec<Tape>, MachineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tapes = initial
            .into_iter()
            .enumerate()
            .map(|(tape, content)| {
                content
                    .as_ref()
                    .chars()
                    .enumerate()
                    .map(|(position, symbol)| {
                        self.symbol_id(symbol)
                            .filter(|id| *id == self.blank || self.input_alphabet.contains(id))
                            .ok_or(MachineError::InputAlphabet {
                                tape,
                                position,
                                symbol,
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Tape::new)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if tapes.len() != self.tape_count {
            return Err(MachineError::TapeCountMismatch {
                expected: self.tape_count,
                found: tapes.len(),
            });
        }

        Ok(tapes)
    }

    pub fn info(&self) -> MachineInfo {
        MachineInfo {
            name: self.name.clone(),
            tape_count: self.tape_count,
            state_count: self.states.len(),
            symbol_count: self.symbols.len(),
            rule_count: self.transitions.len(),
            nondeterministic: self.transitions.is_nondeterministic(),
        }
    }
}

/// A rule as written by the caller, before interning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RuleSpec {
    pub from: String,
    pub read: Vec<char>,
    pub to: String,
    pub write: Vec<char>,
    pub moves: Vec<Direction>,
}

/// Collects the parts of a machine and validates them in `build`.
///
/// ```
/// use ntur::{Direction, MachineDefinition};
///
/// let machine = MachineDefinition::builder("a+", 1)
///     .states(["q0", "qacc", "qrej"])
///     .input_alphabet(['a'])
///     .start("q0")
///     .accept("qacc")
///     .reject("qrej")
///     .rule("q0", ['a'], "q0", ['a'], [Direction::Right])
///     .rule("q0", ['_'], "qacc", ['_'], [Direction::Right])
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.transitions().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MachineBuilder {
    pub(crate) name: String,
    pub(crate) tape_count: usize,
    pub(crate) states: Vec<String>,
    pub(crate) input_alphabet: Vec<char>,
    pub(crate) tape_alphabet: Vec<char>,
    pub(crate) blank: char,
    pub(crate) start: Option<String>,
    pub(crate) accept: Option<String>,
    pub(crate) reject: Option<String>,
    pub(crate) rules: Vec<RuleSpec>,
}

impl MachineBuilder {
    pub fn new(name: impl Into<String>, tape_count: usize) -> Self {
        Self {
            name: name.into(),
            tape_count,
            states: Vec::new(),
            input_alphabet: Vec::new(),
            tape_alphabet: Vec::new(),
            blank: DEFAULT_BLANK_SYMBOL,
            start: None,
            accept: None,
            reject: None,
            rules: Vec::new(),
        }
    }

    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn input_alphabet(mut self, symbols: impl IntoIterator<Item = char>) -> Self {
        self.input_alphabet.extend(symbols);
        self
    }

    /// Declares the tape alphabet. When left empty it defaults to the input alphabet; when
    /// given it must contain every input symbol. The blank is always added.
    pub fn tape_alphabet(mut self, symbols: impl IntoIterator<Item = char>) -> Self {
        self.tape_alphabet.extend(symbols);
        self
    }

    pub fn blank(mut self, blank: char) -> Self {
        self.blank = blank;
        self
    }

    pub fn start(mut self, state: impl Into<String>) -> Self {
        self.start = Some(state.into());
        self
    }

    pub fn accept(mut self, state: impl Into<String>) -> Self {
        self.accept = Some(state.into());
        self
    }

    pub fn reject(mut self, state: impl Into<String>) -> Self {
        self.reject = Some(state.into());
        self
    }

    /// Adds `(from, read) -> (to, write, moves)`. Adding several rules with the same
    /// `(from, read)` makes the machine nondeterministic.
    pub fn rule(
        mut self,
        from: impl Into<String>,
        read: impl IntoIterator<Item = char>,
        to: impl Into<String>,
        write: impl IntoIterator<Item = char>,
        moves: impl IntoIterator<Item = Direction>,
    ) -> Self {
        self.rules.push(RuleSpec {
            from: from.into(),
            read: read.into_iter().collect(),
            to: to.into(),
            write: write.into_iter().collect(),
            moves: moves.into_iter().collect(),
        });
        self
    }

    /// Validates the draft and interns it into a `MachineDefinition`.
    pub fn build(self) -> Result<MachineDefinition, DefinitionError> {
        analyzer::analyze(&self)?;

        let states: Interner<String> = self.states.iter().cloned().collect();
        let mut symbols: Interner<char> = Interner::new();
        let blank = SymbolId::try_from(symbols.intern(self.blank))?;
        let input_alphabet = self
            .input_alphabet
            .iter()
            .map(|&c| SymbolId::try_from(symbols.intern(c)))
            .collect::<Result<HashSet<_>, _>>()?;
        for &c in &self.tape_alphabet {
            symbols.intern(c);
        }

        // The analyzer has already checked that every name below is declared.
        let state = |name: &str| StateId::try_from(states.get(name).unwrap_or_default());
        let symbol = |c: &char| SymbolId::try_from(symbols.get(c).unwrap_or_default());

        let mut transitions = TransitionTable::new(self.tape_count);
        for draft in &self.rules {
            let key = TransitionKey::new(
                state(&draft.from)?,
                draft.read.iter().map(symbol).collect::<Result<Vec<_>, _>>()?,
            );
            let rule = TransitionRule::new(
                state(&draft.to)?,
                draft.write.iter().map(symbol).collect::<Result<Vec<_>, _>>()?,
                draft.moves.clone(),
            );
            transitions.insert(key, rule).map_err(|mut e| {
                e.state = draft.from.clone();
                e
            })?;
        }

        let role = |name: &Option<String>| state(name.as_deref().unwrap_or_default());

        Ok(MachineDefinition {
            start: role(&self.start)?,
            accept: role(&self.accept)?,
            reject: role(&self.reject)?,
            name: self.name,
            tape_count: self.tape_count,
            states,
            symbols,
            input_alphabet,
            blank,
            transitions,
        })
    }
}
