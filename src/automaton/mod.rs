use ndarray::Array3;
use tracing::debug;

use crate::{
    prefixtree::{state_paths, Traversal},
    Alphabet, Error, HasAlphabet, Map, Result, Sample,
};

mod states;
pub use states::{Label, State, StateList};

/// A probabilistic automaton in its unnormalized form: for every symbol `z` and every pair of
/// positions `(i, j)`, the entry `[z, i, j]` counts how often the transition from the state at
/// position `i` to the state at position `j` on `z` was observed.
///
/// The state at position 0 is always [`State::Root`]. Nothing ever enters the root and its only
/// outgoing flow is the edge into the state of the empty prefix, recorded on the first symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountAutomaton<L: Label = usize> {
    alphabet: Alphabet,
    counts: Array3<u64>,
    states: StateList<L>,
}

impl<L: Label> CountAutomaton<L> {
    /// Assembles an automaton from a count tensor of shape `(|alphabet|, n, n)` and the `n - 1`
    /// labels of the non-root states.
    pub fn from_parts<I: IntoIterator<Item = L>>(
        alphabet: Alphabet,
        counts: Array3<u64>,
        labels: I,
    ) -> Result<Self> {
        let states = StateList::new(labels)?;
        let expected = [alphabet.len(), states.len(), states.len()];
        let found = [counts.dim().0, counts.dim().1, counts.dim().2];
        if expected != found {
            return Err(Error::Shape { expected, found });
        }
        Ok(Self::from_raw(alphabet, counts, states))
    }

    pub(crate) fn from_raw(alphabet: Alphabet, counts: Array3<u64>, states: StateList<L>) -> Self {
        debug_assert_eq!(counts.dim(), (alphabet.len(), states.len(), states.len()));
        Self {
            alphabet,
            counts,
            states,
        }
    }

    /// The count tensor.
    pub fn counts(&self) -> &Array3<u64> {
        &self.counts
    }

    /// The state identities, ordered by position.
    pub fn states(&self) -> &StateList<L> {
        &self.states
    }

    /// Number of states, the root included.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Observed number of transitions from `from` to `to` on the symbol with index `symbol`.
    pub fn count(&self, from: &State<L>, symbol: usize, to: &State<L>) -> Result<u64> {
        let (i, j) = (self.states.locate(from)?, self.states.locate(to)?);
        Ok(self.counts.get([symbol, i, j]).copied().unwrap_or(0))
    }

    /// Replaces the labels of the non-root states, keeping positions and counts.
    pub fn relabel<M: Label, I: IntoIterator<Item = M>>(
        self,
        labels: I,
    ) -> Result<CountAutomaton<M>> {
        CountAutomaton::from_parts(self.alphabet, self.counts, labels)
    }

    /// Decomposes the automaton into alphabet, tensor and states.
    pub fn into_parts(self) -> (Alphabet, Array3<u64>, StateList<L>) {
        (self.alphabet, self.counts, self.states)
    }
}

impl CountAutomaton<usize> {
    /// Builds the prefix tree acceptor of `sample` over the symbols that occur in it. See
    /// [`CountAutomaton::from_sample_with_alphabet`].
    ///
    /// If every sequence is empty the alphabet is empty too, and the tensor has no slice to
    /// hold the root's flow: the result has the root and the empty-prefix state but no counts
    /// at all. Pass an explicit alphabet to keep the root flow in that case.
    pub fn from_sample(sample: &Sample, traversal: Traversal) -> Self {
        let alphabet = sample.alphabet();
        let paths = state_paths(sample, traversal);
        Self::from_paths(sample, alphabet, &paths)
    }

    /// Builds the prefix tree acceptor of `sample` as a count tensor. Every distinct prefix
    /// becomes a state, labelled with its index in the [`Traversal`] order, and the entry for
    /// an edge `p -z-> pz` is the number of sequences that start with `pz`. The root sends all
    /// sequences into the state of the empty prefix, provided `alphabet` has a first symbol to
    /// record that edge on.
    pub fn from_sample_with_alphabet(
        sample: &Sample,
        alphabet: Alphabet,
        traversal: Traversal,
    ) -> Result<Self> {
        for sequence in sample.iter() {
            alphabet.indices_of(sequence)?;
        }
        let paths = state_paths(sample, traversal);
        Ok(Self::from_paths(sample, alphabet, &paths))
    }

    /// Wraps a bare count tensor, labelling the non-root positions `0, 1, ...`.
    pub fn from_counts(alphabet: Alphabet, counts: Array3<u64>) -> Result<Self> {
        let labels = 0..counts.dim().1.saturating_sub(1);
        Self::from_parts(alphabet, counts, labels)
    }

    fn from_paths(sample: &Sample, alphabet: Alphabet, paths: &[String]) -> Self {
        let size = paths.len() + 1;
        let positions: Map<&str, usize> = paths
            .iter()
            .enumerate()
            .map(|(index, path)| (path.as_str(), index + 1))
            .collect();
        let prefix_counts = sample.prefix_counts();

        let mut counts = Array3::zeros((alphabet.len(), size, size));
        if alphabet.is_empty() {
            debug!("sample has no symbols, the root flow cannot be recorded");
        } else {
            counts[[0, 0, 1]] = sample.len() as u64;
        }

        for (index, path) in paths.iter().enumerate() {
            let Some((last, symbol)) = path
                .chars()
                .last()
                .and_then(|last| Some((last, alphabet.index_of(last)?)))
            else {
                continue;
            };
            let parent = &path[..path.len() - last.len_utf8()];
            counts[[symbol, positions[parent], index + 1]] = prefix_counts[path.as_str()];
        }
        debug!(
            "built prefix tree with {} states over {} from {} sequences",
            size,
            alphabet,
            sample.len()
        );

        Self::from_raw(alphabet, counts, StateList::enumerated(paths.len()))
    }
}

impl<L: Label> HasAlphabet for CountAutomaton<L> {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
}
