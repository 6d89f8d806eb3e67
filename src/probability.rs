use ndarray::{s, Array3};

use crate::{
    automaton::{CountAutomaton, Label, State, StateList},
    estimate::PatternEstimator,
    Alphabet, Error, HasAlphabet, Result,
};

/// A count automaton divided through by the flow into each state, so that the entry
/// `[z, i, j]` is the probability of moving from position `i` to position `j` while emitting
/// `z`. Whatever a row does not distribute is the probability of stopping.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityAutomaton<L: Label = usize> {
    alphabet: Alphabet,
    probabilities: Array3<f64>,
    states: StateList<L>,
}

impl<L: Label> ProbabilityAutomaton<L> {
    /// The probability tensor.
    pub fn probabilities(&self) -> &Array3<f64> {
        &self.probabilities
    }

    /// The state identities, ordered by position.
    pub fn states(&self) -> &StateList<L> {
        &self.states
    }

    /// Number of states, the root included.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Probability of moving from `from` to `to` on the symbol `symbol`.
    pub fn probability(&self, from: &State<L>, symbol: char, to: &State<L>) -> Result<f64> {
        let z = self
            .alphabet
            .index_of(symbol)
            .ok_or(Error::UnknownSymbol(symbol))?;
        let (i, j) = (self.states.locate(from)?, self.states.locate(to)?);
        Ok(self.probabilities[[z, i, j]])
    }

    /// Probability of stopping in `state`, i.e. one minus its outgoing mass.
    pub fn termination_probability(&self, state: &State<L>) -> Result<f64> {
        let position = self.states.locate(state)?;
        Ok(1.0 - self.probabilities.slice(s![.., position, ..]).sum())
    }

    /// The estimators for patterns and sequences under this automaton.
    pub fn estimator(&self) -> PatternEstimator<'_> {
        PatternEstimator::from_automaton(self)
    }
}

impl ProbabilityAutomaton<usize> {
    /// Wraps a bare probability tensor, labelling the non-root positions `0, 1, ...`.
    pub fn from_tensor(alphabet: Alphabet, probabilities: Array3<f64>) -> Result<Self> {
        let (symbols, rows, columns) = probabilities.dim();
        let states = StateList::new(0..rows.saturating_sub(1))?;
        let expected = [alphabet.len(), states.len(), states.len()];
        if expected != [symbols, rows, columns] {
            return Err(Error::Shape {
                expected,
                found: [symbols, rows, columns],
            });
        }
        Ok(Self {
            alphabet,
            probabilities,
            states,
        })
    }
}

impl<L: Label> HasAlphabet for ProbabilityAutomaton<L> {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
}

impl<L: Label> CountAutomaton<L> {
    /// Turns counts into transition probabilities. Every row is divided by the flow into its
    /// state (the root, which is never entered, by its outgoing flow). Rows of states that are
    /// never entered stay zero.
    pub fn normalize(&self) -> ProbabilityAutomaton<L> {
        let mut probabilities = self.counts().mapv(|count| count as f64);
        for position in 0..self.size() {
            let entered = self.entered_at(position);
            let mut row = probabilities.slice_mut(s![.., position, ..]);
            if entered == 0 {
                row.fill(0.0);
            } else {
                row /= entered as f64;
            }
        }
        ProbabilityAutomaton {
            alphabet: self.alphabet().clone(),
            probabilities,
            states: self.states().clone(),
        }
    }
}

impl<L: Label> From<&CountAutomaton<L>> for ProbabilityAutomaton<L> {
    fn from(automaton: &CountAutomaton<L>) -> Self {
        automaton.normalize()
    }
}
