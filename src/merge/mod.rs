//! Merging states of a [`CountAutomaton`] and the two searches built on top of it.
//!
//! A single merge folds one state into another. Since that can make the automaton
//! non-deterministic, [`CountAutomaton::recursive_merge`] keeps merging the ambiguous
//! destinations as long as they pass the compatibility test, and rolls back to the
//! original otherwise. The searches in [`exhaustive()`] and [`frontier()`] decide which pairs
//! are proposed.

use std::cmp::Ordering;

use itertools::iproduct;
use ndarray::Array3;

use crate::{
    automaton::{CountAutomaton, Label, State},
    Error, HasAlphabet, Result, Significance, Strategy,
};

mod exhaustive;
pub use exhaustive::exhaustive;

mod frontier;
pub use frontier::{frontier, Frontier};

mod logging;
pub use logging::{MergeEvent, MergeLogbook, MergeLogger, TracingLogger};

/// Outcome of a recursive merge on `M`, which is either a plain [`CountAutomaton`] or a
/// [`Frontier`] that also tracks red states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Merge<M, L: Label = usize> {
    /// The merge and all merges it triggered went through.
    Merged {
        /// The deterministic result.
        result: M,
        /// Number of follow-up merges.
        cascade: usize,
    },
    /// Some pair of destinations was incompatible, nothing was changed.
    Rejected {
        /// The value the merge was attempted on.
        original: M,
        /// The incompatible pair.
        conflict: (State<L>, State<L>),
    },
}

impl<M, L: Label> Merge<M, L> {
    /// Returns true if the merge went through.
    pub fn is_merged(&self) -> bool {
        matches!(self, Merge::Merged { .. })
    }

    /// The merged result, or the untouched original if the merge was rejected.
    pub fn into_inner(self) -> M {
        match self {
            Merge::Merged { result, .. } => result,
            Merge::Rejected { original, .. } => original,
        }
    }
}

/// What a merge search returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeReport<L: Label = usize> {
    /// The reduced, deterministic automaton.
    pub automaton: CountAutomaton<L>,
    /// Number of successful top-level merges.
    pub merges: usize,
}

/// Values that a recursive merge can operate on.
pub(crate) trait Mergeable<L: Label>: Sized {
    fn automaton(&self) -> &CountAutomaton<L>;

    /// Merges the states at the two positions, the one further in front survives.
    fn merge_at(&self, first: usize, second: usize) -> Self;
}

impl<L: Label> Mergeable<L> for CountAutomaton<L> {
    fn automaton(&self) -> &CountAutomaton<L> {
        self
    }

    fn merge_at(&self, first: usize, second: usize) -> Self {
        self.merge_positions(first, second)
    }
}

impl<L: Label> CountAutomaton<L> {
    pub(crate) fn merge_positions(&self, first: usize, second: usize) -> Self {
        let (keep, drop) = (first.min(second), first.max(second));
        debug_assert!(keep > 0 && keep != drop, "cannot merge {first} with {second}");

        let target = |position: usize| match position.cmp(&drop) {
            Ordering::Less => position,
            Ordering::Equal => keep,
            Ordering::Greater => position - 1,
        };
        let size = self.size() - 1;
        let mut counts = Array3::zeros((self.alphabet().len(), size, size));
        for ((symbol, from, to), &count) in self.counts().indexed_iter() {
            if count > 0 {
                counts[[symbol, target(from), target(to)]] += count;
            }
        }

        CountAutomaton::from_raw(self.alphabet().clone(), counts, self.states().without(drop))
    }

    /// Resolves two identities to positions that may be merged.
    pub(crate) fn mergeable_positions(
        &self,
        first: &State<L>,
        second: &State<L>,
    ) -> Result<(usize, usize)> {
        let (i, j) = (self.states().locate(first)?, self.states().locate(second)?);
        if i == j || i == 0 || j == 0 {
            return Err(Error::InvalidMerge(first.show(), second.show()));
        }
        Ok((i, j))
    }

    /// Folds `second` into `first` or vice versa, whichever sits further back disappears. The
    /// survivor receives all incoming and outgoing counts of both, and a transition between the
    /// two becomes a loop.
    pub fn merge_states(&self, first: &State<L>, second: &State<L>) -> Result<Self> {
        let (i, j) = self.mergeable_positions(first, second)?;
        Ok(self.merge_positions(i, j))
    }

    /// For every symbol (in alphabet order) and every row (in positional order) that leads to
    /// more than one destination, the positions of the first two destinations.
    pub(crate) fn conflicts(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (symbols, size, _) = self.counts().dim();
        iproduct!(0..symbols, 0..size).filter_map(move |(symbol, from)| {
            let mut targets = (0..size).filter(move |&to| self.counts()[[symbol, from, to]] > 0);
            Some((targets.next()?, targets.next()?))
        })
    }

    /// The pairs of destinations that violate determinism. For every symbol (in alphabet order)
    /// and every row (in positional order) that leads to more than one destination, the first
    /// two destinations are reported.
    pub fn nondeterministic_pairs(&self) -> Vec<(State<L>, State<L>)> {
        self.conflicts()
            .map(|(a, b)| (self.states()[a].clone(), self.states()[b].clone()))
            .collect()
    }

    /// Returns true if no state has two destinations for the same symbol.
    pub fn is_deterministic(&self) -> bool {
        self.conflicts().next().is_none()
    }

    pub(crate) fn candidates(&self) -> Vec<(usize, usize)> {
        (1..self.size())
            .flat_map(|j| (1..j).map(move |i| (j, i)))
            .collect()
    }

    /// Every pair of non-root states, the one further back first, ordered by that state and
    /// then by its partner.
    pub fn candidate_pairs(&self) -> Vec<(State<L>, State<L>)> {
        self.candidates()
            .into_iter()
            .map(|(j, i)| (self.states()[j].clone(), self.states()[i].clone()))
            .collect()
    }

    /// Merges `first` and `second`, then keeps merging the pairs of destinations that are no
    /// longer deterministic as long as they are compatible at level `alpha`. If one of them is
    /// not, the whole attempt is abandoned and the automaton is handed back unchanged in
    /// [`Merge::Rejected`].
    pub fn recursive_merge(
        self,
        first: &State<L>,
        second: &State<L>,
        alpha: Significance,
    ) -> Result<Merge<Self, L>> {
        let (i, j) = self.mergeable_positions(first, second)?;
        Ok(recursive_merge_at(self, i, j, alpha, &mut ()))
    }
}

pub(crate) fn recursive_merge_at<L, M, G>(
    original: M,
    first: usize,
    second: usize,
    alpha: Significance,
    logger: &mut G,
) -> Merge<M, L>
where
    L: Label,
    M: Mergeable<L>,
    G: MergeLogger<L>,
{
    let states = original.automaton().states();
    let (first_state, second_state) = (states[first].clone(), states[second].clone());

    let mut current = original.merge_at(first, second);
    let mut cascade = 0;
    loop {
        let Some((a, b)) = current.automaton().conflicts().next() else {
            break;
        };
        let compatible = current.automaton().compatible_at(a, b, alpha);
        let states = current.automaton().states();
        let conflict = (states[a].clone(), states[b].clone());
        logger.log(MergeEvent::Cascade {
            first: conflict.0.clone(),
            second: conflict.1.clone(),
            compatible,
        });
        if !compatible {
            logger.log(MergeEvent::Rejected {
                first: first_state,
                second: second_state,
                conflict: conflict.clone(),
            });
            return Merge::Rejected { original, conflict };
        }
        current = current.merge_at(a, b);
        cascade += 1;
    }

    logger.log(MergeEvent::Merged {
        first: first_state,
        second: second_state,
        cascade,
        size: current.automaton().size(),
    });
    Merge::Merged {
        result: current,
        cascade,
    }
}

impl Strategy {
    /// Runs the merge search this strategy stands for.
    pub fn search<L: Label, G: MergeLogger<L>>(
        self,
        automaton: CountAutomaton<L>,
        alpha: Significance,
        logger: &mut G,
    ) -> MergeReport<L> {
        match self {
            Strategy::Exhaustive => exhaustive(automaton, alpha, logger),
            Strategy::Frontier => frontier(automaton, alpha, logger),
        }
    }
}
