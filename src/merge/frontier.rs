use itertools::{iproduct, Itertools};
use tracing::{debug, info, trace};

use super::{recursive_merge_at, Merge, MergeEvent, MergeLogger, MergeReport, Mergeable};
use crate::{
    automaton::{CountAutomaton, Label, State},
    Error, HasAlphabet, Result, Significance,
};

/// A [`CountAutomaton`] together with its red states, the part of the automaton that is
/// considered final. The blue states are the successors of red states that are not red
/// themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frontier<L: Label = usize> {
    automaton: CountAutomaton<L>,
    red: Vec<State<L>>,
}

impl<L: Label> Frontier<L> {
    /// Starts with the state of the empty prefix as the only red state.
    pub fn new(automaton: CountAutomaton<L>) -> Self {
        let red = automaton.states().get(1).cloned().into_iter().collect();
        Self { automaton, red }
    }

    /// Uses the given states as red, failing if one of them is not part of the automaton or
    /// is the root.
    pub fn with_red<I: IntoIterator<Item = State<L>>>(
        automaton: CountAutomaton<L>,
        red: I,
    ) -> Result<Self> {
        let red = red.into_iter().sorted().dedup().collect_vec();
        for state in &red {
            if automaton.states().locate(state)? == 0 {
                return Err(Error::InvalidMerge(state.show(), state.show()));
            }
        }
        Ok(Self { automaton, red })
    }

    /// The underlying automaton.
    pub fn automaton(&self) -> &CountAutomaton<L> {
        &self.automaton
    }

    /// Gives up the red states.
    pub fn into_automaton(self) -> CountAutomaton<L> {
        self.automaton
    }

    /// The red states in ascending order.
    pub fn red(&self) -> &[State<L>] {
        &self.red
    }

    fn red_positions(&self) -> Vec<usize> {
        self.red
            .iter()
            .filter_map(|state| self.automaton.states().position(state))
            .collect()
    }

    /// Blue positions in the order they are discovered: red states in red order, then symbols,
    /// then destinations.
    pub(crate) fn blue_at(&self) -> Vec<usize> {
        let red = self.red_positions();
        let (symbols, size, _) = self.automaton.counts().dim();
        let mut blue = Vec::new();
        for (from, symbol, to) in iproduct!(red.iter().copied(), 0..symbols, 0..size) {
            if self.automaton.counts()[[symbol, from, to]] > 0
                && !red.contains(&to)
                && !blue.contains(&to)
            {
                blue.push(to);
            }
        }
        blue
    }

    /// The blue states in discovery order.
    pub fn blue(&self) -> Vec<State<L>> {
        self.blue_at()
            .into_iter()
            .map(|position| self.automaton.states()[position].clone())
            .collect()
    }

    /// Adds `state` to the red states.
    pub fn promote(&mut self, state: State<L>) {
        if let Err(position) = self.red.binary_search(&state) {
            self.red.insert(position, state);
        }
    }

    /// Like [`CountAutomaton::recursive_merge`], but a red state that is merged away passes
    /// its colour on to the survivor.
    pub fn recursive_merge(
        self,
        first: &State<L>,
        second: &State<L>,
        alpha: Significance,
    ) -> Result<Merge<Self, L>> {
        let (i, j) = self.automaton.mergeable_positions(first, second)?;
        Ok(recursive_merge_at(self, i, j, alpha, &mut ()))
    }
}

impl<L: Label> Mergeable<L> for Frontier<L> {
    fn automaton(&self) -> &CountAutomaton<L> {
        &self.automaton
    }

    fn merge_at(&self, first: usize, second: usize) -> Self {
        let states = self.automaton.states();
        let kept = &states[first.min(second)];
        let removed = &states[first.max(second)];

        let mut red = self.red.clone();
        if let Ok(position) = red.binary_search(removed) {
            red.remove(position);
            if let Err(position) = red.binary_search(kept) {
                trace!("{kept} inherits red from {removed}");
                red.insert(position, kept.clone());
            }
        }

        Self {
            automaton: self.automaton.merge_positions(first, second),
            red,
        }
    }
}

/// The red/blue search. The first blue state is compared with every red state in ascending
/// order and merged with the first one that is compatible and whose recursive merge goes
/// through. If there is none, it becomes red.
pub fn frontier<L: Label, G: MergeLogger<L>>(
    automaton: CountAutomaton<L>,
    alpha: Significance,
    logger: &mut G,
) -> MergeReport<L> {
    debug!(
        "frontier search on {} states over {} at significance {alpha}",
        automaton.size(),
        automaton.alphabet()
    );
    let mut current = Frontier::new(automaton);
    let mut merges = 0;

    while let Some(&blue) = current.blue_at().first() {
        let mut merged = false;
        for red in current.red_positions() {
            let compatible = current.automaton.compatible_at(red, blue, alpha);
            logger.log(MergeEvent::Tested {
                first: current.automaton.states()[red].clone(),
                second: current.automaton.states()[blue].clone(),
                compatible,
            });
            if !compatible {
                continue;
            }
            match recursive_merge_at(current, red, blue, alpha, logger) {
                Merge::Merged { result, .. } => {
                    current = result;
                    merges += 1;
                    merged = true;
                    break;
                }
                Merge::Rejected { original, .. } => current = original,
            }
        }

        if !merged {
            let state = current.automaton.states()[blue].clone();
            logger.log(MergeEvent::Promoted {
                state: state.clone(),
            });
            current.promote(state);
        }
    }

    info!(
        "frontier search finished after {merges} merges with {} states, {} of them red",
        current.automaton.size(),
        current.red.len()
    );
    MergeReport {
        automaton: current.into_automaton(),
        merges,
    }
}
