//! Property-based tests for the merging pipeline
//!
//! Uses proptest to verify:
//! - every sequence of the sample ends in exactly one state, before and after merging
//! - both searches leave a deterministic automaton behind
//! - a rejected recursive merge hands back the untouched automaton
//! - merging two disjoint pairs gives the same automaton in either order
//! - normalized rows never distribute more than their whole mass

use pamina::{CountAutomaton, Merge, Sample, Significance, State, Strategy, Traversal};
use proptest::prelude::*;
use proptest::strategy::Strategy as _;

/// Samples over `{a, b, c}` with at least one non-empty sequence
fn sample_strategy() -> impl proptest::strategy::Strategy<Value = Sample> {
    prop::collection::vec("[abc]{0,4}", 1..25)
        .prop_filter("some non-empty sequence", |sequences| {
            sequences.iter().any(|sequence| !sequence.is_empty())
        })
        .prop_map(Sample::new)
}

fn traversal_strategy() -> impl proptest::strategy::Strategy<Value = Traversal> {
    prop_oneof![
        Just(Traversal::DepthFirst),
        Just(Traversal::BreadthFirst),
        Just(Traversal::SiblingsFirst),
    ]
}

fn search_strategy() -> impl proptest::strategy::Strategy<Value = Strategy> {
    prop_oneof![Just(Strategy::Exhaustive), Just(Strategy::Frontier)]
}

fn alpha_strategy() -> impl proptest::strategy::Strategy<Value = Significance> {
    (0.01f64..0.99).prop_map(|alpha| Significance::new(alpha).unwrap())
}

fn ending_sequences(automaton: &CountAutomaton) -> u64 {
    automaton
        .states()
        .iter()
        .skip(1)
        .map(|state| automaton.terminations(state).unwrap())
        .sum()
}

proptest! {
    #[test]
    fn flow_is_conserved(
        sample in sample_strategy(),
        traversal in traversal_strategy(),
        strategy in search_strategy(),
        alpha in alpha_strategy(),
    ) {
        let pta = CountAutomaton::from_sample(&sample, traversal);
        let n = sample.len() as u64;
        prop_assert_eq!(pta.outgoing(&State::Root).unwrap(), n);
        prop_assert_eq!(ending_sequences(&pta), n);

        let merged = strategy.search(pta, alpha, &mut ()).automaton;
        prop_assert_eq!(merged.outgoing(&State::Root).unwrap(), n);
        prop_assert_eq!(ending_sequences(&merged), n);
    }

    #[test]
    fn searches_end_deterministic(
        sample in sample_strategy(),
        strategy in search_strategy(),
        alpha in alpha_strategy(),
    ) {
        let pta = CountAutomaton::from_sample(&sample, Traversal::SiblingsFirst);
        prop_assert!(pta.is_deterministic());
        let report = strategy.search(pta.clone(), alpha, &mut ());
        prop_assert!(report.automaton.is_deterministic());
        prop_assert!(report.automaton.size() + report.merges <= pta.size());
    }

    #[test]
    fn recursive_merges_are_transactional(
        sample in sample_strategy(),
        first in 1usize..64,
        second in 1usize..64,
        alpha in alpha_strategy(),
    ) {
        let pta = CountAutomaton::from_sample(&sample, Traversal::SiblingsFirst);
        let (first, second) = (1 + first % (pta.size() - 1), 1 + second % (pta.size() - 1));
        prop_assume!(first != second);
        let (q1, q2) = (pta.states()[first].clone(), pta.states()[second].clone());

        match pta.clone().recursive_merge(&q1, &q2, alpha).unwrap() {
            Merge::Merged { result, .. } => {
                prop_assert!(result.is_deterministic());
                prop_assert!(result.size() < pta.size());
            }
            Merge::Rejected { original, conflict } => {
                prop_assert_eq!(&original, &pta);
                prop_assert!(pta.states().contains(&conflict.0));
            }
        }
    }

    #[test]
    fn rows_are_substochastic(
        sample in sample_strategy(),
        strategy in search_strategy(),
        alpha in alpha_strategy(),
    ) {
        let pta = CountAutomaton::from_sample(&sample, Traversal::SiblingsFirst);
        let probabilities = strategy.search(pta, alpha, &mut ()).automaton.normalize();
        for state in probabilities.states().iter() {
            let termination = probabilities.termination_probability(state).unwrap();
            prop_assert!((-1e-9..=1.0 + 1e-9).contains(&termination));
        }
    }

    #[test]
    fn disjoint_merges_commute(
        sample in sample_strategy(),
        positions in prop::collection::vec(1usize..64, 4),
    ) {
        let pta = CountAutomaton::from_sample(&sample, Traversal::BreadthFirst);
        let states = positions
            .iter()
            .map(|position| pta.states()[1 + position % (pta.size() - 1)].clone())
            .collect::<Vec<_>>();
        let distinct = states
            .iter()
            .enumerate()
            .all(|(i, state)| !states[..i].contains(state));
        prop_assume!(distinct);

        let one_way = pta
            .merge_states(&states[0], &states[1])
            .and_then(|merged| merged.merge_states(&states[2], &states[3]))
            .unwrap();
        let other_way = pta
            .merge_states(&states[2], &states[3])
            .and_then(|merged| merged.merge_states(&states[0], &states[1]))
            .unwrap();
        prop_assert_eq!(one_way, other_way);
    }
}
