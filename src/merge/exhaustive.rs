use std::collections::VecDeque;

use tracing::{debug, info};

use super::{recursive_merge_at, Merge, MergeEvent, MergeLogger, MergeReport};
use crate::{
    automaton::{CountAutomaton, Label},
    Significance,
};

/// ALERGIA. Candidate pairs are taken in the order of [`CountAutomaton::candidate_pairs`]. A
/// pair that passes the compatibility test is merged recursively, and after every successful
/// merge the candidates are computed afresh, so pairs that failed before get another chance
/// on the smaller automaton. The search ends once every remaining candidate has failed.
pub fn exhaustive<L: Label, G: MergeLogger<L>>(
    automaton: CountAutomaton<L>,
    alpha: Significance,
    logger: &mut G,
) -> MergeReport<L> {
    debug!(
        "exhaustive search on {} states at significance {alpha}",
        automaton.size()
    );
    let mut current = automaton;
    let mut merges = 0;
    let mut candidates = VecDeque::from(current.candidates());

    while let Some((first, second)) = candidates.pop_front() {
        let compatible = current.compatible_at(first, second, alpha);
        logger.log(MergeEvent::Tested {
            first: current.states()[first].clone(),
            second: current.states()[second].clone(),
            compatible,
        });
        if !compatible {
            continue;
        }

        current = match recursive_merge_at(current, first, second, alpha, logger) {
            Merge::Merged { result, .. } => {
                merges += 1;
                candidates = VecDeque::from(result.candidates());
                result
            }
            Merge::Rejected { original, .. } => original,
        };
    }

    info!(
        "exhaustive search finished after {merges} merges with {} states",
        current.size()
    );
    MergeReport {
        automaton: current,
        merges,
    }
}
