use ndarray::s;
use tracing::trace;

use crate::{
    automaton::{CountAutomaton, Label, State},
    Error, HasAlphabet, Result, Significance,
};

impl<L: Label> CountAutomaton<L> {
    pub(crate) fn outgoing_at(&self, position: usize) -> u64 {
        self.counts().slice(s![.., position, ..]).sum()
    }

    pub(crate) fn entered_at(&self, position: usize) -> u64 {
        if position == 0 {
            self.outgoing_at(0)
        } else {
            self.counts().slice(s![.., .., position]).sum()
        }
    }

    pub(crate) fn exit_at(&self, position: usize, symbol: usize) -> f64 {
        match self.entered_at(position) {
            0 => 0.0,
            entered => {
                self.counts().slice(s![symbol, position, ..]).sum() as f64 / entered as f64
            }
        }
    }

    pub(crate) fn termination_at(&self, position: usize) -> f64 {
        1.0 - (0..self.alphabet().len())
            .map(|symbol| self.exit_at(position, symbol))
            .sum::<f64>()
    }

    /// The Hoeffding test on positions: two states are compatible if neither the probability of
    /// leaving on any symbol nor the probability of stopping differs by more than
    /// `c(alpha) * (1/sqrt(n1) + 1/sqrt(n2))`.
    pub(crate) fn compatible_at(&self, first: usize, second: usize, alpha: Significance) -> bool {
        let (n1, n2) = (self.entered_at(first), self.entered_at(second));
        debug_assert!(
            n1 > 0 && n2 > 0,
            "compatibility of a state that is never entered is undefined"
        );
        if n1 == 0 || n2 == 0 {
            return false;
        }
        let bound =
            alpha.hoeffding_factor() * (1.0 / (n1 as f64).sqrt() + 1.0 / (n2 as f64).sqrt());

        let exits_agree = (0..self.alphabet().len()).all(|symbol| {
            (self.exit_at(first, symbol) - self.exit_at(second, symbol)).abs() <= bound
        });
        let compatible = exits_agree
            && (self.termination_at(first) - self.termination_at(second)).abs() <= bound;
        trace!(
            "states {} and {} are {}compatible at {alpha}",
            self.states()[first],
            self.states()[second],
            if compatible { "" } else { "not " }
        );
        compatible
    }

    fn symbol_index(&self, symbol: char) -> Result<usize> {
        self.alphabet()
            .index_of(symbol)
            .ok_or(Error::UnknownSymbol(symbol))
    }

    /// Total flow into `state`. For the root, which nothing enters, this is its outgoing flow,
    /// i.e. the number of sequences the automaton was built from.
    pub fn entered(&self, state: &State<L>) -> Result<u64> {
        Ok(self.entered_at(self.states().locate(state)?))
    }

    /// Total flow out of `state`.
    pub fn outgoing(&self, state: &State<L>) -> Result<u64> {
        Ok(self.outgoing_at(self.states().locate(state)?))
    }

    /// Number of sequences that end in `state`.
    pub fn terminations(&self, state: &State<L>) -> Result<u64> {
        let position = self.states().locate(state)?;
        Ok(self
            .entered_at(position)
            .saturating_sub(self.outgoing_at(position)))
    }

    /// Fraction of the flow into `state` that leaves it on `symbol`.
    pub fn exit_probability(&self, state: &State<L>, symbol: char) -> Result<f64> {
        Ok(self.exit_at(self.states().locate(state)?, self.symbol_index(symbol)?))
    }

    /// Fraction of the flow into `state` that stops there.
    pub fn termination_probability(&self, state: &State<L>) -> Result<f64> {
        Ok(self.termination_at(self.states().locate(state)?))
    }

    /// Decides whether `first` and `second` may be merged, see [`Significance`] for how the
    /// level influences the outcome.
    pub fn compatible(
        &self,
        first: &State<L>,
        second: &State<L>,
        alpha: Significance,
    ) -> Result<bool> {
        let (first, second) = (self.states().locate(first)?, self.states().locate(second)?);
        Ok(self.compatible_at(first, second, alpha))
    }
}
