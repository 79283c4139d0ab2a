//! This module defines the core data structures and types used throughout the engine,
//! including interned identifiers, transition rules, head directions, and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The default blank symbol used on the tapes.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// The default maximum number of breadth-first rounds before a run is declared undecided.
pub const DEFAULT_STEP_BOUND: usize = 10000;

/// Dense identifier of a state inside a single `MachineDefinition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub u32);

/// Dense identifier of a tape symbol inside a single `MachineDefinition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// An interner index that does not fit in a 32-bit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Index {0} does not fit in a 32-bit identifier")]
pub struct IdOverflow(pub usize);

impl TryFrom<usize> for StateId {
    type Error = IdOverflow;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u32::try_from(index).map(StateId).map_err(|_| IdOverflow(index))
    }
}

impl TryFrom<usize> for SymbolId {
    type Error = IdOverflow;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u32::try_from(index).map(SymbolId).map_err(|_| IdOverflow(index))
    }
}

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left, never past cell 0.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Returns the single character used for this direction in tabular machine descriptions.
    pub fn symbol(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'L' | 'l' | '<' => Ok(Direction::Left),
            'R' | 'r' | '>' => Ok(Direction::Right),
            'S' | 's' | '-' => Ok(Direction::Stay),
            other => Err(other),
        }
    }
}

/// The left-hand side of a transition: a state and the k symbols under the heads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    pub state: StateId,
    pub read: Box<[SymbolId]>,
}

impl TransitionKey {
    pub fn new(state: StateId, read: impl Into<Box<[SymbolId]>>) -> Self {
        Self {
            state,
            read: read.into(),
        }
    }
}

/// Represents a single transition rule.
///
/// The write and move tuples are indexed positionally by tape; both hold exactly k
/// entries once the rule has been accepted by a `TransitionTable`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionRule {
    /// The state the branch enters after applying this rule.
    pub next_state: StateId,
    /// One symbol to write per tape.
    pub write: Box<[SymbolId]>,
    /// One head movement per tape.
    pub moves: Box<[Direction]>,
}

impl TransitionRule {
    pub fn new(
        next_state: StateId,
        write: impl Into<Box<[SymbolId]>>,
        moves: impl Into<Box<[Direction]>>,
    ) -> Self {
        Self {
            next_state,
            write: write.into(),
            moves: moves.into(),
        }
    }
}

/// The part of a rule whose length did not match the tape count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    Read,
    Write,
    Moves,
}

impl std::fmt::Display for RuleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RuleField::Read => "read",
            RuleField::Write => "write",
            RuleField::Moves => "move",
        })
    }
}

/// Raised when a rule's read/write/move tuple does not have exactly k entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule for state {state} has {found} {field} entries, expected {expected}")]
pub struct TransitionArityError {
    pub state: String,
    pub field: RuleField,
    pub expected: usize,
    pub found: usize,
}

/// Which distinguished role a state plays in a machine definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateRole {
    Start,
    Accept,
    Reject,
}

impl std::fmt::Display for StateRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StateRole::Start => "start",
            StateRole::Accept => "accept",
            StateRole::Reject => "reject",
        })
    }
}

/// Construction-time errors. A `MachineDefinition` is never produced when one of these occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("A machine needs at least one tape")]
    NoTapes,
    #[error("The {0} state is not set")]
    MissingState(StateRole),
    #[error("The {role} state '{state}' is not in the state set")]
    UndeclaredState { role: StateRole, state: String },
    #[error("The {0} and {1} states are both '{2}'")]
    StateCollision(StateRole, StateRole, String),
    #[error("Input symbol {0:?} is not in the tape alphabet")]
    InputNotInTapeAlphabet(char),
    #[error("Blank symbol {0:?} must not be part of the input alphabet")]
    BlankInInputAlphabet(char),
    #[error("Rule references undeclared state '{0}'")]
    UnknownState(String),
    #[error("Rule for state '{state}' references symbol {symbol:?} outside the tape alphabet")]
    UnknownSymbol { state: String, symbol: char },
    #[error(transparent)]
    TransitionArity(#[from] TransitionArityError),
    #[error("Too many states or symbols: {0}")]
    IdOverflow(#[from] IdOverflow),
}

/// Errors surfaced by the engine before exploration starts.
///
/// In-run outcomes (accept, reject, undecided) are never errors; see `ExecutionResult`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("Invalid machine definition: {0}")]
    Definition(#[from] DefinitionError),
    #[error("Symbol {symbol:?} at position {position} of tape {tape} is not in the input alphabet")]
    InputAlphabet {
        tape: usize,
        position: usize,
        symbol: char,
    },
    #[error("Expected {expected} initial tapes, got {found}")]
    TapeCountMismatch { expected: usize, found: usize },
}
