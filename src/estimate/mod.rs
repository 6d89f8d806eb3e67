//! Probabilities of patterns and sequences under a [`ProbabilityAutomaton`].
//!
//! All pattern estimators return one value per state: the entry at position `i` is the
//! probability that the pattern is observed when generation starts in the state at `i`.
//! An estimator taken from a [`ProbabilityAutomaton`] leaves the root out, so position 0 is
//! the state of the empty prefix and the root's artificial edge never counts as a symbol.

use itertools::Itertools;
use ndarray::{s, Array1, Array2, ArrayView2, ArrayView3, Axis};
use tracing::trace;

use crate::{
    automaton::Label, Alphabet, Error, HasAlphabet, ProbabilityAutomaton, Result,
    SequenceMode, Significance,
};

mod linalg;
mod normal;

pub use normal::{inverse_normal_cdf, proportion_significant};

/// Borrowed view of a probability tensor together with its alphabet.
#[derive(Clone, Debug)]
pub struct PatternEstimator<'a> {
    alphabet: &'a Alphabet,
    tensor: ArrayView3<'a, f64>,
}

impl<'a> PatternEstimator<'a> {
    /// Wraps a tensor of shape `(|alphabet|, n, n)`. Every position is taken to be a real
    /// state, the first one being where generation starts.
    pub fn new(alphabet: &'a Alphabet, tensor: ArrayView3<'a, f64>) -> Result<Self> {
        let (symbols, rows, columns) = tensor.dim();
        if symbols != alphabet.len() || rows != columns {
            return Err(Error::Shape {
                expected: [alphabet.len(), rows, rows],
                found: [symbols, rows, columns],
            });
        }
        Ok(Self { alphabet, tensor })
    }

    pub(crate) fn from_automaton<L: Label>(automaton: &'a ProbabilityAutomaton<L>) -> Self {
        Self {
            alphabet: automaton.alphabet(),
            tensor: automaton.probabilities().slice(s![.., 1.., 1..]),
        }
    }

    fn size(&self) -> usize {
        self.tensor.dim().1
    }

    fn slice(&self, symbol: usize) -> ArrayView2<'_, f64> {
        self.tensor.index_axis(Axis(0), symbol)
    }

    fn symbols_of(&self, word: &str, minimum: usize) -> Result<Vec<usize>> {
        let symbols = self.alphabet.indices_of(word)?;
        if symbols.len() < minimum {
            return Err(Error::PatternTooShort {
                minimum,
                length: symbols.len(),
            });
        }
        Ok(symbols)
    }

    /// `I - ρ_s`, where `ρ_s` sums the slices of all symbols other than `s`.
    fn avoiding(&self, symbol: usize) -> Array2<f64> {
        let mut matrix = Array2::eye(self.size());
        for other in (0..self.alphabet.len()).filter(|&other| other != symbol) {
            matrix -= &self.slice(other);
        }
        matrix
    }

    /// `γ_s`, the probability of leaving each state on `s`.
    fn exits(&self, symbol: usize) -> Array1<f64> {
        self.slice(symbol).sum_axis(Axis(1))
    }

    /// `M`, the sum of all slices.
    fn total(&self) -> Array2<f64> {
        self.tensor.sum_axis(Axis(0))
    }

    fn symbol_at(&self, symbol: usize) -> Result<Array1<f64>> {
        linalg::solve(self.avoiding(symbol), self.exits(symbol))
    }

    fn pattern_at(&self, symbols: &[usize]) -> Result<Array1<f64>> {
        let Some((&last, init)) = symbols.split_last() else {
            return Err(Error::PatternTooShort {
                minimum: 1,
                length: 0,
            });
        };
        let mut x = self.symbol_at(last)?;
        for &symbol in init.iter().rev() {
            x = linalg::solve(self.avoiding(symbol), self.slice(symbol).dot(&x))?;
        }
        Ok(x)
    }

    /// Probability of eventually emitting `symbol`, i.e. of emitting it after any number of
    /// other symbols.
    pub fn symbol_probability(&self, symbol: char) -> Result<Array1<f64>> {
        let symbol = self
            .alphabet
            .index_of(symbol)
            .ok_or(Error::UnknownSymbol(symbol))?;
        self.symbol_at(symbol)
    }

    /// Probability that the symbols of `pattern` occur in order, each of them possibly
    /// preceded by other symbols.
    pub fn pattern_probability(&self, pattern: &str) -> Result<Array1<f64>> {
        let symbols = self.symbols_of(pattern, 1)?;
        trace!("estimating pattern {pattern:?}");
        self.pattern_at(&symbols)
    }

    /// Probability that the step right after exactly `distance` arbitrary steps emits `symbol`.
    pub fn letter_at_distance(&self, symbol: char, distance: usize) -> Result<Array1<f64>> {
        let symbol = self
            .alphabet
            .index_of(symbol)
            .ok_or(Error::UnknownSymbol(symbol))?;
        Ok(linalg::matrix_power(&self.total(), distance).dot(&self.exits(symbol)))
    }

    /// Probability that the first symbol of `pattern` is emitted right after exactly
    /// `distance` arbitrary steps, and the remaining symbols occur in order afterwards.
    pub fn pattern_at_distance(&self, pattern: &str, distance: usize) -> Result<Array1<f64>> {
        let symbols = self.symbols_of(pattern, 2)?;
        let rest = self.pattern_at(&symbols[1..])?;
        let head = self.slice(symbols[0]).dot(&rest);
        Ok(linalg::matrix_power(&self.total(), distance).dot(&head))
    }

    /// Probability that `digram` occurs, propagated along the states that lead into it. The
    /// digram must consist of exactly two symbols.
    pub fn digram_probability(&self, digram: &str) -> Result<Array1<f64>> {
        let symbols = self.alphabet.indices_of(digram)?;
        let [first, second] = symbols[..] else {
            return Err(Error::DigramLength(symbols.len()));
        };
        let exits = self.exits(second);
        let slice = self.slice(first);
        let direct = Array1::from_iter((0..self.size()).map(|from| {
            (0..self.size())
                .find(|&to| slice[[from, to]] > 0.0)
                .map_or(0.0, |to| slice[[from, to]] * exits[to])
        }));
        linalg::solve(self.avoiding(first).reversed_axes(), direct)
    }

    /// Probability of emitting exactly `sequence` and stopping afterwards. The walk starts at
    /// position 0 and follows the first transition for every symbol. It is zero as soon as a
    /// symbol has no transition.
    pub fn exact_sequence_probability(&self, sequence: &str) -> Result<f64> {
        let symbols = self.alphabet.indices_of(sequence)?;
        if self.size() == 0 {
            return Ok(0.0);
        }

        let mut state = 0;
        let mut probability = 1.0;
        for symbol in symbols {
            let slice = self.slice(symbol);
            let Some(next) = (0..self.size()).find(|&to| slice[[state, to]] > 0.0) else {
                return Ok(0.0);
            };
            probability *= slice[[state, next]];
            state = next;
        }
        let outgoing = self.tensor.slice(s![.., state, ..]).sum();
        Ok(probability * (1.0 - outgoing).clamp(0.0, 1.0))
    }

    /// All strings over the alphabet of length `1..=max_len`, shortest first and in
    /// lexicographic order within one length.
    pub fn enumerate_strings(&self, max_len: usize) -> Vec<String> {
        (1..=max_len)
            .flat_map(|length| {
                (0..length)
                    .map(|_| self.alphabet.symbols().iter().copied())
                    .multi_cartesian_product()
                    .map(|symbols| symbols.into_iter().collect::<String>())
            })
            .collect()
    }

    /// The exact sequence probability of each string.
    pub fn string_probabilities<S: AsRef<str>, I: IntoIterator<Item = S>>(
        &self,
        strings: I,
    ) -> Result<Vec<(String, f64)>> {
        strings
            .into_iter()
            .map(|string| {
                let string = string.as_ref();
                Ok((string.to_string(), self.exact_sequence_probability(string)?))
            })
            .collect()
    }

    /// Decides whether `pattern` is frequent enough to be told apart from noise in a sample of
    /// size `n`. Depending on `mode`, the estimate is the pattern probability from position 0
    /// or the exact sequence probability.
    pub fn proportion_constraint(
        &self,
        pattern: &str,
        n: usize,
        alpha: Significance,
        mode: SequenceMode,
    ) -> Result<bool> {
        let estimate = match mode {
            SequenceMode::Pattern => self.pattern_probability(pattern)?[0],
            SequenceMode::Sequence => self.exact_sequence_probability(pattern)?,
        };
        Ok(proportion_significant(estimate, n, alpha))
    }
}

impl HasAlphabet for PatternEstimator<'_> {
    fn alphabet(&self) -> &Alphabet {
        self.alphabet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        prefixtree::Traversal,
        tests::{alpha, assert_close},
        CountAutomaton, Sample,
    };
    use approx::assert_abs_diff_eq;
    use ndarray::Array3;
    use pretty_assertions::assert_eq;

    fn jacquemont() -> ProbabilityAutomaton {
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
        ProbabilityAutomaton::from_tensor(Alphabet::new(['a', 'b', 'c']), tensor).unwrap()
    }

    fn bare(p: &ProbabilityAutomaton) -> PatternEstimator<'_> {
        PatternEstimator::new(p.alphabet(), p.probabilities().view()).unwrap()
    }

    fn arnolds_point_nine() -> ProbabilityAutomaton {
        let mut tensor = Array3::zeros((3, 4, 4));
        for (symbol, from, to, p) in [
            (0, 0, 1, 1.0),
            (0, 1, 2, 9.0 / 17.0),
            (0, 2, 3, 3.0 / 17.0),
            (1, 1, 1, 4.0 / 17.0),
            (1, 2, 2, 5.0 / 17.0),
            (2, 1, 2, 3.0 / 17.0),
            (2, 2, 1, 3.0 / 17.0),
        ] {
            tensor[[symbol, from, to]] = p;
        }
        ProbabilityAutomaton::from_tensor(Alphabet::new(['A', 'B', 'C']), tensor).unwrap()
    }

    #[test]
    fn symbol_probability() {
        let p = jacquemont();
        assert_close(
            &bare(&p).symbol_probability('c').unwrap(),
            &[0.47068936, 0.47068936, 0.42719615, 0.42719615],
        );
    }

    #[test]
    fn pattern_probability() {
        let p = jacquemont();
        assert_close(
            &bare(&p).pattern_probability("cc").unwrap(),
            &[0.21552208, 0.21552208, 0.1861079, 0.1861079],
        );
        assert_eq!(
            bare(&p).pattern_probability(""),
            Err(Error::PatternTooShort {
                minimum: 1,
                length: 0
            })
        );
        assert_eq!(
            bare(&p).pattern_probability("cd"),
            Err(Error::UnknownSymbol('d'))
        );
    }

    #[test]
    fn at_distance() {
        let p = jacquemont();
        let estimator = bare(&p);
        assert_close(
            &estimator.letter_at_distance('a', 2).unwrap(),
            &[0.201467, 0.3629, 0.2146, 0.137696],
        );
        assert_close(
            &estimator.pattern_at_distance("ab", 2).unwrap(),
            &[0.165817, 0.2079, 0.1346, 0.116896],
        );
        assert_close(
            &estimator.pattern_at_distance("abc", 2).unwrap(),
            &[0.0773778, 0.0949411, 0.06185016, 0.0546305],
        );
        assert_eq!(
            estimator.pattern_at_distance("a", 2),
            Err(Error::PatternTooShort {
                minimum: 2,
                length: 1
            })
        );
    }

    #[test]
    fn digram_probability() {
        let p = jacquemont();
        assert_close(
            &bare(&p).digram_probability("ab").unwrap(),
            &[0.2987013, 0.0, 0.29800281, 0.28378378],
        );
        assert_eq!(
            bare(&p).digram_probability("abc"),
            Err(Error::DigramLength(3))
        );
    }

    #[test]
    fn exact_sequences() {
        let p = arnolds_point_nine();
        let estimator = p.estimator();
        assert_abs_diff_eq!(
            estimator.exact_sequence_probability("ABC").unwrap(),
            0.0016163599573759896,
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(estimator.exact_sequence_probability("AAC").unwrap(), 0.0);
        let probabilities = estimator.string_probabilities(["A", "B", "C"]).unwrap();
        let expected = [
            ("A", 0.18685121107266434),
            ("B", 0.013840830449826992),
            ("C", 0.06228373702422145),
        ];
        for ((string, p), (expected_string, expected_p)) in probabilities.iter().zip(expected) {
            assert_eq!(string, expected_string);
            assert_abs_diff_eq!(*p, expected_p, epsilon = 1e-15);
        }
    }

    #[test]
    fn strings_are_enumerated_by_length() {
        let p = jacquemont();
        let strings = p.estimator().enumerate_strings(2);
        assert_eq!(strings.len(), 12);
        assert_eq!(&strings[..5], &["a", "b", "c", "aa", "ab"]);
        assert_eq!(strings.last().map(String::as_str), Some("cc"));
        assert!(p.estimator().enumerate_strings(0).is_empty());
    }

    #[test]
    fn proportion_constraints() {
        let jacquemont = jacquemont();
        let estimator = bare(&jacquemont);
        let pattern = SequenceMode::Pattern;
        assert_eq!(estimator.proportion_constraint("cc", 15, alpha(0.05), pattern), Ok(true));
        assert_eq!(estimator.proportion_constraint("bcc", 15, alpha(0.05), pattern), Ok(false));

        let arnolds = arnolds_point_nine();
        let estimator = arnolds.estimator();
        let sequence = SequenceMode::Sequence;
        assert_eq!(estimator.proportion_constraint("AAC", 10, alpha(0.33), sequence), Ok(true));
        assert_eq!(estimator.proportion_constraint("ABC", 10, alpha(0.33), sequence), Ok(false));
    }

    #[test]
    fn learned_automata_leave_the_root_out() {
        let mut sequences = vec!["b"; 20];
        sequences.push("a");
        let pta = CountAutomaton::from_sample(&Sample::new(sequences), Traversal::SiblingsFirst);
        let p = pta.normalize();
        let estimator = p.estimator();
        assert_close(
            &estimator.symbol_probability('a').unwrap(),
            &[1.0 / 21.0, 0.0, 0.0],
        );
        assert_close(
            &estimator.symbol_probability('b').unwrap(),
            &[20.0 / 21.0, 0.0, 0.0],
        );
        assert_close(&estimator.pattern_probability("aa").unwrap(), &[0.0, 0.0, 0.0]);
        assert_eq!(
            estimator.proportion_constraint("a", 21, alpha(0.05), SequenceMode::Pattern),
            Ok(false)
        );
        assert_eq!(
            estimator.proportion_constraint("b", 21, alpha(0.05), SequenceMode::Pattern),
            Ok(true)
        );
        assert_abs_diff_eq!(estimator.exact_sequence_probability("a").unwrap(), 1.0 / 21.0);
    }

    #[test]
    fn shapes_are_checked() {
        let alphabet = Alphabet::new(['a', 'b']);
        let tensor = Array3::<f64>::zeros((3, 2, 2));
        assert!(PatternEstimator::new(&alphabet, tensor.view()).is_err());
        let tensor = Array3::<f64>::zeros((2, 2, 2));
        assert!(PatternEstimator::new(&alphabet, tensor.view()).is_ok());
    }
}
