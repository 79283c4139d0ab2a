//! Property-based tests for tapes, stepping and exploration.
//!
//! These tests use proptest to generate small random machines and inputs.

use std::collections::HashSet;
use std::sync::Arc;

use ntur::{
    Configuration, Direction, ExecutionResult, Explorer, ExplorerOptions, MachineDefinition,
    RoundEvent, StateId, SymbolId, Tape, TransitionRule, UndecidedReason,
};
use proptest::prelude::*;

const STATES: [&str; 4] = ["q0", "q1", "acc", "rej"];
const SYMBOLS: [char; 3] = ['_', 'a', 'b'];

/// (from, read, to, write, move) as indices into `STATES`, `SYMBOLS` and directions.
type RawRule = (usize, usize, usize, usize, usize);

fn direction(index: usize) -> Direction {
    [Direction::Left, Direction::Right, Direction::Stay][index % 3]
}

prop_compose! {
    fn arbitrary_rule()(
        from in 0..4usize,
        read in 0..3usize,
        to in 0..4usize,
        write in 0..3usize,
        mv in 0..3usize,
    ) -> RawRule {
        (from, read, to, write, mv)
    }
}

prop_compose! {
    fn arbitrary_input()(cells in prop::collection::vec(prop::sample::select(vec!['a', 'b']), 0..6)) -> String {
        cells.into_iter().collect()
    }
}

fn machine(rules: &[RawRule]) -> MachineDefinition {
    rules
        .iter()
        .fold(
            MachineDefinition::builder("random", 1)
                .states(STATES)
                .input_alphabet(['a', 'b'])
                .start("q0")
                .accept("acc")
                .reject("rej"),
            |builder, &(from, read, to, write, mv)| {
                builder.rule(
                    STATES[from],
                    [SYMBOLS[read]],
                    STATES[to],
                    [SYMBOLS[write]],
                    [direction(mv)],
                )
            },
        )
        .build()
        .unwrap()
}

/// Keeps only the first rule for each (from, read) key.
fn deterministic(rules: Vec<RawRule>) -> Vec<RawRule> {
    let mut seen = HashSet::new();
    rules
        .into_iter()
        .filter(|&(from, read, ..)| seen.insert((from, read)))
        .collect()
}

fn sequential(step_bound: usize) -> ExplorerOptions {
    ExplorerOptions::default()
        .with_step_bound(step_bound)
        .with_parallel_threshold(None)
}

proptest! {
    #[test]
    fn bounded_runs_terminate_with_one_verdict(
        rules in prop::collection::vec(arbitrary_rule(), 0..10),
        input in arbitrary_input(),
        step_bound in 0..6usize,
    ) {
        let machine = machine(&rules);
        let mut explorer = Explorer::new(&machine).with_options(sequential(step_bound));

        let result = explorer.run([input.as_str()]).unwrap();

        let verdicts = [result.is_accepted(), result.is_rejected(), result.is_undecided()];
        prop_assert_eq!(verdicts.iter().filter(|&&v| v).count(), 1);
        prop_assert!(explorer.stats().rounds <= step_bound);
        prop_assert!(explorer.stats().frontier_sizes.len() <= step_bound + 1);
    }

    #[test]
    fn verdicts_reached_within_the_bound_are_stable(
        rules in prop::collection::vec(arbitrary_rule(), 0..10),
        input in arbitrary_input(),
        step_bound in 0..5usize,
        extra in 1..4usize,
    ) {
        let machine = machine(&rules);
        let mut short = Explorer::new(&machine).with_options(sequential(step_bound));
        let mut long = Explorer::new(&machine).with_options(sequential(step_bound + extra));

        let a = short.run([input.as_str()]).unwrap();
        let b = long.run([input.as_str()]).unwrap();

        let bounded = |result: &ExecutionResult| {
            matches!(result, ExecutionResult::Undecided(UndecidedReason::StepBoundExceeded))
        };
        if !bounded(&a) {
            prop_assert_eq!(a.verdict(), b.verdict());
            prop_assert_eq!(&short.stats().frontier_sizes, &long.stats().frontier_sizes);
            prop_assert_eq!(short.stats().rejected_branches, long.stats().rejected_branches);
            prop_assert_eq!(short.stats().halted_branches, long.stats().halted_branches);
        }
        if !bounded(&b) && long.stats().max_depth <= step_bound {
            prop_assert_eq!(a.verdict(), b.verdict());
        }
    }

    #[test]
    fn accepted_configuration_is_shallowest(
        rules in prop::collection::vec(arbitrary_rule(), 0..10),
        input in arbitrary_input(),
    ) {
        let machine = machine(&rules);
        let explorer = Explorer::new(&machine).with_options(sequential(5));

        let mut first_accept_depth = None;
        let mut result = None;
        for event in explorer.explore([input.as_str()]).unwrap() {
            match event {
                RoundEvent::Frontier { depth, configurations } => {
                    if first_accept_depth.is_none()
                        && configurations.iter().any(|c| c.state() == machine.accept())
                    {
                        first_accept_depth = Some(depth);
                    }
                }
                RoundEvent::Finished(finished) => result = Some(finished),
            }
        }

        match result {
            Some(ExecutionResult::Accepted { configuration, .. }) => {
                prop_assert_eq!(Some(configuration.depth()), first_accept_depth);
            }
            _ => prop_assert_eq!(first_accept_depth, None),
        }
    }

    #[test]
    fn deterministic_machines_keep_a_single_branch(
        rules in prop::collection::vec(arbitrary_rule(), 0..12),
        input in arbitrary_input(),
    ) {
        let machine = machine(&deterministic(rules));
        let mut explorer = Explorer::new(&machine).with_options(sequential(8));

        explorer.run([input.as_str()]).unwrap();

        prop_assert!(explorer.stats().frontier_sizes.iter().all(|&size| size <= 1));
    }

    #[test]
    fn reject_state_has_no_children(
        rules in prop::collection::vec(arbitrary_rule(), 0..10),
        input in arbitrary_input(),
    ) {
        let machine = machine(&rules);
        let explorer = Explorer::new(&machine).with_options(sequential(5));

        for event in explorer.explore([input.as_str()]).unwrap() {
            if let RoundEvent::Frontier { configurations, .. } = event {
                for configuration in configurations {
                    if let Some(parent) = configuration.parent() {
                        prop_assert_ne!(parent.state(), machine.reject());
                    }
                }
            }
        }
    }

    #[test]
    fn parallel_and_sequential_agree(
        rules in prop::collection::vec(arbitrary_rule(), 0..10),
        input in arbitrary_input(),
    ) {
        let machine = machine(&rules);

        let mut one = Explorer::new(&machine).with_options(sequential(5));
        let mut many = Explorer::new(&machine)
            .with_options(sequential(5).with_parallel_threshold(Some(1)));

        let a = one.run([input.as_str()]).unwrap();
        let b = many.run([input.as_str()]).unwrap();

        prop_assert_eq!(a.verdict(), b.verdict());
        prop_assert_eq!(one.stats(), many.stats());
        prop_assert_eq!(
            a.configuration().map(|c| c.heads()),
            b.configuration().map(|c| c.heads())
        );
    }

    #[test]
    fn writing_at_the_end_grows_by_one(cells in prop::collection::vec(0..3u32, 0..8)) {
        let length = cells.len();
        let mut tape = Tape::new(cells.into_iter().map(SymbolId).collect());
        for _ in 0..length {
            tape.shift(Direction::Right);
        }
        let root = Arc::new(Configuration::root(StateId(0), vec![tape]));

        let rule = TransitionRule::new(StateId(0), vec![SymbolId(1)], vec![Direction::Stay]);
        let child = Configuration::step(&root, &rule);

        prop_assert_eq!(child.tapes()[0].len(), length + 1);
        prop_assert_eq!(root.tapes()[0].len(), length);
    }

    #[test]
    fn head_follows_clamped_moves(moves in prop::collection::vec(0..3usize, 0..40)) {
        let mut tape = Tape::new(Vec::new());
        let mut expected: usize = 0;

        for mv in moves {
            let direction = direction(mv);
            tape.write(SymbolId(1));
            tape.shift(direction);
            expected = match direction {
                Direction::Left => expected.saturating_sub(1),
                Direction::Right => expected + 1,
                Direction::Stay => expected,
            };
            prop_assert_eq!(tape.head(), expected);
            prop_assert!(tape.head() <= tape.len());
        }
    }
}
