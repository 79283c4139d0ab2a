//! A small catalog of ready-made machines, built once on first use.

use crate::machine::{MachineDefinition, MachineInfo};
use crate::types::DefinitionError;
use crate::types::Direction::{Left as L, Right as R, Stay as S};

/// Builders for the embedded machines.
const PROGRAM_BUILDERS: [fn() -> Result<MachineDefinition, DefinitionError>; 4] =
    [a_plus, palindrome, right_runner, contains_one_one];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<MachineDefinition> = PROGRAM_BUILDERS
        .iter()
        .filter_map(|build| match build() {
            Ok(machine) => Some(machine),
            Err(e) => {
                tracing::error!("Failed to build embedded machine: {}", e);
                None
            }
        })
        .collect();
}

/// Single tape, accepts one or more `a`s. There is no rule for `b`, so any `b` halts
/// the only branch.
pub fn a_plus() -> Result<MachineDefinition, DefinitionError> {
    MachineDefinition::builder("a-plus", 1)
        .states(["q0", "qacc", "qrej"])
        .input_alphabet(['a', 'b'])
        .start("q0")
        .accept("qacc")
        .reject("qrej")
        .rule("q0", ['a'], "q0", ['a'], [R])
        .rule("q0", ['_'], "qacc", ['_'], [R])
        .build()
}

/// Two tapes, accepts binary palindromes.
///
/// The input is pushed onto tape 2 behind a `$` marker. At every cell the machine also
/// guesses that it has reached the middle (skipping the cell for odd lengths), then
/// compares the rest of tape 1 against tape 2 read backwards.
pub fn palindrome() -> Result<MachineDefinition, DefinitionError> {
    let mut builder = MachineDefinition::builder("palindrome", 2)
        .states(["start", "push", "compare", "accept", "reject"])
        .input_alphabet(['0', '1'])
        .tape_alphabet(['0', '1', '$'])
        .start("start")
        .accept("accept")
        .reject("reject")
        .rule("start", ['_', '_'], "accept", ['_', '_'], [S, S])
        .rule("push", ['_', '_'], "compare", ['_', '_'], [S, L])
        .rule("compare", ['_', '$'], "accept", ['_', '$'], [S, S])
        .rule("compare", ['0', '1'], "reject", ['0', '1'], [S, S])
        .rule("compare", ['1', '0'], "reject", ['1', '0'], [S, S]);

    for x in ['0', '1'] {
        builder = builder
            .rule("start", [x, '_'], "push", [x, '$'], [S, R])
            .rule("push", [x, '_'], "push", [x, x], [R, R])
            .rule("push", [x, '_'], "compare", [x, '_'], [R, L])
            .rule("push", [x, '_'], "compare", [x, '_'], [S, L])
            .rule("compare", [x, x], "compare", [x, x], [R, L])
            .rule("compare", [x, '$'], "reject", [x, '$'], [S, S])
            .rule("compare", ['_', x], "reject", ['_', x], [S, S]);
    }

    builder.build()
}

/// Single tape, walks right forever without reaching accept or reject.
pub fn right_runner() -> Result<MachineDefinition, DefinitionError> {
    MachineDefinition::builder("right-runner", 1)
        .states(["q0", "qacc", "qrej"])
        .input_alphabet(['a'])
        .start("q0")
        .accept("qacc")
        .reject("qrej")
        .rule("q0", ['a'], "q0", ['a'], [R])
        .rule("q0", ['_'], "q0", ['_'], [R])
        .build()
}

/// Single tape, accepts binary strings containing `11` by guessing where it starts.
pub fn contains_one_one() -> Result<MachineDefinition, DefinitionError> {
    MachineDefinition::builder("contains-11", 1)
        .states(["scan", "seen", "accept", "reject"])
        .input_alphabet(['0', '1'])
        .start("scan")
        .accept("accept")
        .reject("reject")
        .rule("scan", ['0'], "scan", ['0'], [R])
        .rule("scan", ['1'], "scan", ['1'], [R])
        .rule("scan", ['1'], "seen", ['1'], [R])
        .rule("scan", ['_'], "reject", ['_'], [S])
        .rule("seen", ['1'], "accept", ['1'], [S])
        .rule("seen", ['0'], "reject", ['0'], [S])
        .rule("seen", ['_'], "reject", ['_'], [S])
        .build()
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Option<&'static MachineDefinition> {
        PROGRAMS.get(index)
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Option<&'static MachineDefinition> {
        PROGRAMS.iter().find(|machine| machine.name() == name)
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .iter()
            .map(|machine| machine.name().to_string())
            .collect()
    }

    pub fn get_program_info(index: usize) -> Option<MachineInfo> {
        Self::get_program_by_index(index).map(MachineDefinition::info)
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, machine)| machine.name().to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }
}
