use approx::assert_abs_diff_eq;
use ndarray::Array3;
use pamina::{
    learn, Alphabet, CountAutomaton, Error, LearnerConfig, PatternEstimator, Sample,
    SequenceMode, Significance, State, Strategy, Traversal,
};
use pretty_assertions::assert_eq;

const ARNOLDS: &str = "# arnolds
AB
ABA
ABB
ABCA
AC
ACC
BA
BAA
BC
BCA
";

fn arnolds() -> Sample {
    Sample::try_from(ARNOLDS).unwrap()
}

fn list_of_sequences() -> Sample {
    let mut sequences = vec!["0"; 8];
    sequences.extend(["01"; 7]);
    sequences.extend(["10"; 5]);
    sequences.extend(["11"; 5]);
    sequences.extend(["12"; 2]);
    sequences.extend(["1"; 3]);
    Sample::new(sequences)
}

#[test]
fn alergia_on_list_of_sequences() {
    let config = LearnerConfig::default().with_significance(0.2).unwrap();
    let learned = learn(&list_of_sequences(), &config);
    assert_eq!(learned.merges, 3);
    assert_eq!(learned.counts.states().to_string(), "[*, 0, 1, 3]");
    assert!(learned.counts.is_deterministic());
    assert_eq!(learned.counts.outgoing(&State::Root), Ok(30));
}

#[test]
fn frontier_then_exact_sequence() {
    let config = LearnerConfig::default()
        .with_significance(0.9)
        .unwrap()
        .with_strategy(Strategy::Frontier);
    let learned = learn(&arnolds(), &config);
    assert_eq!(learned.counts.states().to_string(), "[*, 0, 1, 5]");

    let estimator = learned.probabilities.estimator();
    assert_abs_diff_eq!(
        estimator.exact_sequence_probability("ABC").unwrap(),
        0.0016163599573759896,
        epsilon = 1e-15
    );
    let strings = estimator.enumerate_strings(1);
    let probabilities = estimator.string_probabilities(&strings).unwrap();
    assert_eq!(probabilities.len(), 3);
    assert_abs_diff_eq!(probabilities[0].1, 54.0 / 289.0, epsilon = 1e-12);

    let alpha = Significance::new(0.33).unwrap();
    assert_eq!(
        estimator.proportion_constraint("ABC", 10, alpha, SequenceMode::Sequence),
        Ok(false)
    );
}

#[test]
fn traversal_decides_the_merge_order() {
    let config = LearnerConfig::default().with_significance(0.9).unwrap();
    let siblings = learn(&arnolds(), &config);
    let breadth = learn(&arnolds(), &config.with_traversal(Traversal::BreadthFirst));
    assert_eq!(siblings.merges, 5);
    assert_eq!(siblings.counts.states().to_string(), "[*, 0, 1]");
    assert_eq!(breadth.merges, 4);
    assert_eq!(breadth.counts.states().to_string(), "[*, 0, 1, 7]");
}

#[test]
fn pattern_estimates_start_after_the_root() {
    let mut sequences = vec!["b"; 20];
    sequences.push("a");
    let learned = learn(&Sample::new(sequences), &LearnerConfig::default());
    let estimator = learned.probabilities.estimator();
    let a = estimator.symbol_probability('a').unwrap();
    assert_eq!(a.len(), learned.counts.size() - 1);
    assert!(a[0] < 0.1);
    let alpha = Significance::new(0.05).unwrap();
    assert_eq!(
        estimator.proportion_constraint("a", 21, alpha, SequenceMode::Pattern),
        Ok(false)
    );
}

#[test]
fn small_corpus() {
    let sample: Sample = "0\n0\n01\n10\n11".parse().unwrap();
    let pta = CountAutomaton::from_sample(&sample, Traversal::SiblingsFirst);
    let alpha = Significance::new(0.2).unwrap();
    let report = Strategy::Exhaustive.search(pta.clone(), alpha, &mut ());
    assert_eq!(report.merges, 2);
    let report = Strategy::Frontier.search(pta, Significance::new(0.9).unwrap(), &mut ());
    assert_eq!(report.merges, 3);
    assert_eq!(report.automaton.states().to_string(), "[*, 0, 1]");
}

#[test]
fn pattern_estimates_on_a_bare_tensor() {
    let alphabet = Alphabet::new(['a', 'b', 'c']);
    let mut tensor = Array3::zeros((3, 4, 4));
    for (symbol, from, to, p) in [
        (0, 0, 1, 0.23),
        (0, 2, 3, 1.0),
        (0, 3, 1, 0.21),
        (1, 0, 2, 0.31),
        (1, 1, 0, 1.0),
        (1, 3, 2, 0.16),
        (2, 0, 0, 0.23),
        (2, 3, 3, 0.26),
    ] {
        tensor[[symbol, from, to]] = p;
    }
    let estimator = PatternEstimator::new(&alphabet, tensor.view()).unwrap();
    let cc = estimator.pattern_probability("cc").unwrap();
    assert_abs_diff_eq!(cc[0], 0.21552208, epsilon = 1e-6);
    assert_abs_diff_eq!(cc[2], 0.1861079, epsilon = 1e-6);
    let alpha = Significance::new(0.05).unwrap();
    assert_eq!(
        estimator.proportion_constraint("cc", 15, alpha, SequenceMode::Pattern),
        Ok(true)
    );
    assert_eq!(
        estimator.pattern_probability("cx"),
        Err(Error::UnknownSymbol('x'))
    );
}

#[test]
fn malformed_inputs() {
    assert_eq!(
        Sample::try_from("AB\nA B\n"),
        Err(Error::MalformedSequence {
            line: 2,
            content: "A B".to_string()
        })
    );
    assert_eq!(
        LearnerConfig::default().with_significance(1.5),
        Err(Error::Significance(1.5))
    );
    assert_eq!(
        "greedy".parse::<Strategy>(),
        Err(Error::UnknownStrategy("greedy".to_string()))
    );
}
