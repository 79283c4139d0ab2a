//! This crate provides a decision and trace engine for nondeterministic k-tape Turing machines.
//! It includes modules for building validated machine definitions, exploring every computation
//! branch breadth-first, recording traces for display, and a catalog of sample machines.

pub mod alphabet;
pub mod analyzer;
pub mod configuration;
pub mod explorer;
pub mod machine;
pub mod programs;
pub mod table;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the `analyze` function from the analyzer module.
pub use analyzer::analyze;
/// Re-exports the `Configuration` struct from the configuration module.
pub use configuration::Configuration;
/// Re-exports the explorer, its options, results, and the `run` entry point.
pub use explorer::{
    run, ExecutionResult, Exploration, Explorer, ExplorerOptions, HaltPolicy, RoundEvent,
    RunStats, UndecidedReason,
};
/// Re-exports `MachineDefinition`, its builder, and `MachineInfo` from the machine module.
pub use machine::{MachineBuilder, MachineDefinition, MachineInfo};
/// Re-exports `ProgramManager` and `PROGRAMS` from the programs module.
pub use programs::{ProgramManager, PROGRAMS};
/// Re-exports the `TransitionTable` struct from the table module.
pub use table::TransitionTable;
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the trace types from the trace module.
pub use trace::{Snapshot, Trace, TraceLevel, TraceRecord, TraceRecorder, Verdict};
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    DefinitionError, Direction, IdOverflow, MachineError, StateId, SymbolId, TransitionArityError,
    TransitionKey, TransitionRule, DEFAULT_BLANK_SYMBOL, DEFAULT_STEP_BOUND,
};
