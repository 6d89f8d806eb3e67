use owo_colors::OwoColorize;
use tracing::{info, trace};

use crate::{
    merge::TracingLogger, CountAutomaton, LearnerConfig, ProbabilityAutomaton, Sample,
};

/// Outcome of [`learn`].
#[derive(Clone, Debug, PartialEq)]
pub struct Learned {
    /// The merged count automaton.
    pub counts: CountAutomaton,
    /// Its normalized counterpart.
    pub probabilities: ProbabilityAutomaton,
    /// Number of top-level merges the search performed.
    pub merges: usize,
}

/// Infers a probabilistic automaton from `sample`. The steps are
/// - build the prefix tree acceptor in the configured traversal order
/// - reduce it with the configured merge search, reporting merges through `tracing`
/// - normalize the counts into probabilities
pub fn learn(sample: &Sample, config: &LearnerConfig) -> Learned {
    let pta = CountAutomaton::from_sample(sample, config.traversal);
    trace!("{}\n{}", "PREFIX TREE".bold(), pta);

    let mut logger = TracingLogger::new(config.verbosity);
    let report = config
        .strategy
        .search(pta, config.significance, &mut logger);
    info!(
        "{} {} states after {} merges",
        "learned".green(),
        report.automaton.size(),
        report.merges
    );

    let probabilities = report.automaton.normalize();
    Learned {
        counts: report.automaton,
        probabilities,
        merges: report.merges,
    }
}
