//! This module validates a `MachineBuilder` draft before it is interned into a
//! `MachineDefinition`. This includes checks for the tape count, the distinguished states,
//! the alphabets, and the states and symbols referenced by transition rules.
//!
//! Rule arity is checked by `TransitionTable::insert` while the table is built.

use std::collections::HashSet;

use crate::machine::MachineBuilder;
use crate::types::{DefinitionError, StateRole};

/// Analyzes a machine draft for structural and logical errors.
///
/// The checks run in a fixed order and the first failure is reported.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(DefinitionError)` describing the first violated rule.
pub fn analyze(draft: &MachineBuilder) -> Result<(), DefinitionError> {
    [
        check_structure,
        check_roles,
        check_role_collisions,
        check_alphabets,
        check_rule_states,
        check_rule_symbols,
    ]
    .iter()
    .try_for_each(|check| check(draft))
}

/// Returns the tape alphabet the definition will end up with, blank included.
pub(crate) fn tape_alphabet(draft: &MachineBuilder) -> HashSet<char> {
    let declared = if draft.tape_alphabet.is_empty() {
        &draft.input_alphabet
    } else {
        &draft.tape_alphabet
    };

    declared
        .iter()
        .copied()
        .chain(std::iter::once(draft.blank))
        .collect()
}

fn roles(draft: &MachineBuilder) -> [(StateRole, Option<&str>); 3] {
    [
        (StateRole::Start, draft.start.as_deref()),
        (StateRole::Accept, draft.accept.as_deref()),
        (StateRole::Reject, draft.reject.as_deref()),
    ]
}

/// Checks that the machine has at least one tape.
fn check_structure(draft: &MachineBuilder) -> Result<(), DefinitionError> {
    if draft.tape_count == 0 {
        return Err(DefinitionError::NoTapes);
    }

    Ok(())
}

/// Checks that start, accept and reject are set and belong to the state set.
fn check_roles(draft: &MachineBuilder) -> Result<(), DefinitionError> {
    for (role, state) in roles(draft) {
        let state = state.ok_or(DefinitionError::MissingState(role))?;
        if !draft.states.iter().any(|s| s == state) {
            return Err(DefinitionError::UndeclaredState {
                role,
                state: state.to_string(),
            });
        }
    }

    Ok(())
}

/// Checks that no two distinguished roles share a state.
fn check_role_collisions(draft: &MachineBuilder) -> Result<(), DefinitionError> {
    let roles = roles(draft);

    for (i, (first, a)) in roles.iter().enumerate() {
        for (second, b) in &roles[i + 1..] {
            if let (Some(a), Some(b)) = (a, b) {
                if a == b {
                    return Err(DefinitionError::StateCollision(*first, *second, a.to_string()));
                }
            }
        }
    }

    Ok(())
}

/// Checks that the input alphabet is a subset of the tape alphabet and excludes the blank.
fn check_alphabets(draft: &MachineBuilder) -> Result<(), DefinitionError> {
    if draft.input_alphabet.contains(&draft.blank) {
        return Err(DefinitionError::BlankInInputAlphabet(draft.blank));
    }

    let tape = tape_alphabet(draft);
    if let Some(&symbol) = draft.input_alphabet.iter().find(|c| !tape.contains(*c)) {
        return Err(DefinitionError::InputNotInTapeAlphabet(symbol));
    }

    Ok(())
}

/// Checks that every rule goes from and to declared states.
fn check_rule_states(draft: &MachineBuilder) -> Result<(), DefinitionError> {
    let states: HashSet<&str> = draft.states.iter().map(String::as_str).collect();

    draft
        .rules
        .iter()
        .flat_map(|rule| [&rule.from, &rule.to])
        .find(|state| !states.contains(state.as_str()))
        .map_or(Ok(()), |state| Err(DefinitionError::UnknownState(state.clone())))
}

/// Checks that every symbol a rule reads or writes is in the tape alphabet.
fn check_rule_symbols(draft: &MachineBuilder) -> Result<(), DefinitionError> {
    let tape = tape_alphabet(draft);

    for rule in &draft.rules {
        if let Some(&symbol) = rule
            .read
            .iter()
            .chain(&rule.write)
            .find(|c| !tape.contains(*c))
        {
            return Err(DefinitionError::UnknownSymbol {
                state: rule.from.clone(),
                symbol,
            });
        }
    }

    Ok(())
}
