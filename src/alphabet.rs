use std::fmt::Display;

use itertools::Itertools;

use crate::{Error, Result};

/// A finite, totally ordered set of symbols. Every symbol is a single character and the
/// position of a symbol in the sorted order is its index along the first axis of a tensor.
///
/// # Example
/// ```
/// use pamina::Alphabet;
/// let alphabet = Alphabet::from_sequences(["ba", "ca", ""]);
/// assert_eq!(alphabet.symbols(), &['a', 'b', 'c']);
/// assert_eq!(alphabet.index_of('b'), Some(1));
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord, Default)]
pub struct Alphabet(Vec<char>);

impl Alphabet {
    /// Creates an alphabet from the given symbols, sorting them and dropping duplicates.
    pub fn new<I: IntoIterator<Item = char>>(symbols: I) -> Self {
        Self(symbols.into_iter().sorted().dedup().collect())
    }

    /// Collects every symbol that occurs in one of the given sequences.
    pub fn from_sequences<S: AsRef<str>, I: IntoIterator<Item = S>>(sequences: I) -> Self {
        Self::new(
            sequences
                .into_iter()
                .flat_map(|sequence| sequence.as_ref().chars().collect_vec()),
        )
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the alphabet has no symbols at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The symbols in ascending order.
    pub fn symbols(&self) -> &[char] {
        &self.0
    }

    /// Iterates over all symbols in ascending order.
    pub fn universe(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }

    /// Returns true if `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.index_of(symbol).is_some()
    }

    /// The index of `symbol`, if it is present.
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.0.binary_search(&symbol).ok()
    }

    /// The symbol with the given index.
    pub fn symbol(&self, index: usize) -> Option<char> {
        self.0.get(index).copied()
    }

    /// Translates a word into the indices of its symbols, failing on the first symbol that is
    /// not part of the alphabet.
    pub fn indices_of(&self, word: &str) -> Result<Vec<usize>> {
        word.chars()
            .map(|symbol| self.index_of(symbol).ok_or(Error::UnknownSymbol(symbol)))
            .collect()
    }
}

impl FromIterator<char> for Alphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.0.iter().join(", "))
    }
}

/// Abstracts posessing an [`Alphabet`].
pub trait HasAlphabet {
    /// Returns a reference to the alphabet.
    fn alphabet(&self) -> &Alphabet;
}

impl HasAlphabet for Alphabet {
    fn alphabet(&self) -> &Alphabet {
        self
    }
}

/// Extracts the sorted set of distinct symbols that occur in `sequences`.
pub fn alphabet<S: AsRef<str>, I: IntoIterator<Item = S>>(sequences: I) -> Alphabet {
    Alphabet::from_sequences(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn symbols_are_sorted_and_unique() {
        let digits = alphabet(["0", "01", "10", "11", "12", "1"]);
        assert_eq!(digits.symbols(), &['0', '1', '2']);

        let arnolds = alphabet(["AB", "ABA", "ABB", "ABCA", "AC", "ACC", "BA", "BAA"]);
        assert_eq!(arnolds.symbols(), &['A', 'B', 'C']);
        assert_eq!(arnolds.to_string(), "{A, B, C}");
    }

    #[test]
    fn empty_sequences_contribute_nothing() {
        assert!(alphabet(["", ""]).is_empty());
        assert!(alphabet(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn translating_words() {
        let alphabet = Alphabet::new(['c', 'a', 'b', 'a']);
        assert_eq!(alphabet.len(), 3);
        assert_eq!(alphabet.indices_of("cab"), Ok(vec![2, 0, 1]));
        assert_eq!(alphabet.indices_of("cad"), Err(Error::UnknownSymbol('d')));
        assert_eq!(alphabet.symbol(2), Some('c'));
        assert_eq!(alphabet.symbol(3), None);
    }
}
