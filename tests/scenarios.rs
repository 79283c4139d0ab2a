//! End-to-end runs of the catalog machines through the public entry points.

use ntur::programs::{a_plus, contains_one_one, palindrome, right_runner};
use ntur::{
    run, DefinitionError, Direction, ExecutionResult, Explorer, ExplorerOptions, MachineDefinition,
    MachineError, RoundEvent, TraceLevel, UndecidedReason, Verdict,
};

#[test]
fn a_plus_accepts_after_four_steps() {
    let machine = a_plus().unwrap();

    let result = run(&machine, ["aaa"], 100).unwrap();

    let accepted = result.configuration().expect("aaa is accepted");
    assert_eq!(accepted.depth(), 4);
    assert_eq!(machine.state_name(accepted.state()), "qacc");
    assert_eq!(accepted.heads(), vec![4]);
    assert_eq!(accepted.tapes()[0].len(), 4);
}

#[test]
fn a_plus_halts_on_missing_transition() {
    let machine = a_plus().unwrap();

    let result = run(&machine, ["ab"], 100).unwrap();

    assert!(matches!(
        result,
        ExecutionResult::Undecided(UndecidedReason::AllBranchesHalted)
    ));
    assert!(!result.is_rejected());
}

#[test]
fn a_plus_with_narrow_alphabet_rejects_input_up_front() {
    let machine = MachineDefinition::builder("a-only", 1)
        .states(["q0", "qacc", "qrej"])
        .input_alphabet(['a'])
        .start("q0")
        .accept("qacc")
        .reject("qrej")
        .rule("q0", ['a'], "q0", ['a'], [Direction::Right])
        .rule("q0", ['_'], "qacc", ['_'], [Direction::Right])
        .build()
        .unwrap();

    assert_eq!(
        run(&machine, ["ab"], 100).unwrap_err(),
        MachineError::InputAlphabet {
            tape: 0,
            position: 1,
            symbol: 'b',
        }
    );
}

#[test]
fn palindrome_accepts_10101() {
    let machine = palindrome().unwrap();
    let mut explorer = Explorer::new(&machine)
        .with_options(ExplorerOptions::default().with_trace(TraceLevel::Path));

    let result = explorer.run(["10101", "_"]).unwrap();

    assert!(result.is_accepted());
    let trace = result.trace().unwrap();
    assert_eq!(trace.verdict(), Some(Verdict::Accept));
    let first = trace.snapshots().next().unwrap();
    assert_eq!(first.tapes, vec!["10101".to_string(), "_".to_string()]);
    assert_eq!(first.state, "start");
    let last = trace.snapshots().last().unwrap();
    assert_eq!(last.state, "accept");
    assert_eq!(last.tapes[1], "$10_");
    assert!(explorer.stats().max_depth >= 7);
}

#[test]
fn palindrome_rejects_10100() {
    let machine = palindrome().unwrap();
    let mut explorer = Explorer::new(&machine);

    let result = explorer.run(["10100", "_"]).unwrap();

    assert!(result.is_rejected());
    assert!(explorer.stats().rejected_branches > 0);
    assert!(explorer.stats().frontier_sizes.iter().any(|&size| size > 1));
}

#[test]
fn right_runner_stops_at_step_bound() {
    let machine = right_runner().unwrap();
    let mut explorer =
        Explorer::new(&machine).with_options(ExplorerOptions::default().with_step_bound(10));

    let result = explorer.run(["aa"]).unwrap();

    assert!(matches!(
        result,
        ExecutionResult::Undecided(UndecidedReason::StepBoundExceeded)
    ));
    assert_eq!(explorer.stats().rounds, 10);
    assert_eq!(explorer.stats().max_depth, 10);
    assert_eq!(explorer.stats().frontier_sizes.len(), 11);
}

#[test]
fn reject_reached_at_the_step_bound_is_rejected() {
    let machine = contains_one_one().unwrap();

    // scanning the empty input rejects after exactly one step
    for step_bound in [1, 2, 100] {
        let result = run(&machine, [""], step_bound).unwrap();
        assert!(result.is_rejected(), "step bound {step_bound}");
    }
    assert!(matches!(
        run(&machine, [""], 0).unwrap(),
        ExecutionResult::Undecided(UndecidedReason::StepBoundExceeded)
    ));
}

#[test]
fn right_runner_stream_is_finite() {
    let machine = right_runner().unwrap();
    let explorer =
        Explorer::new(&machine).with_options(ExplorerOptions::default().with_step_bound(3));

    let depths: Vec<Option<usize>> = explorer
        .explore([""])
        .unwrap()
        .map(|event| match event {
            RoundEvent::Frontier { depth, .. } => Some(depth),
            RoundEvent::Finished(_) => None,
        })
        .collect();

    assert_eq!(depths, vec![Some(0), Some(1), Some(2), Some(3), None]);
}

#[test]
fn full_trace_serializes_every_round() {
    let machine = palindrome().unwrap();
    let mut explorer = Explorer::new(&machine)
        .with_options(ExplorerOptions::default().with_trace(TraceLevel::Full));

    explorer.run(["0", "_"]).unwrap();

    let trace = explorer.recorder().trace();
    let examined: usize = explorer.stats().configurations_visited;
    assert!(trace.snapshots().count() >= examined);
    assert_eq!(trace.verdict(), Some(Verdict::Accept));

    let json = trace.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["records"].as_array().unwrap().len(),
        trace.records.len()
    );
}

#[test]
fn mismatched_rule_arity_is_a_definition_error() {
    let err = MachineDefinition::builder("bad", 2)
        .states(["q0", "qa", "qr"])
        .input_alphabet(['0'])
        .start("q0")
        .accept("qa")
        .reject("qr")
        .rule("q0", ['0', '_'], "qa", ['0', '_'], [Direction::Right])
        .build()
        .unwrap_err();

    assert!(matches!(err, DefinitionError::TransitionArity(_)));
}
