use std::str::FromStr;

use tracing::trace;

use crate::{Alphabet, Error, Map, Result};

/// A multiset of finite sequences over single-character symbols. Duplicates are significant,
/// they are what the counts of a prefix tree are made of.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Sample {
    sequences: Vec<String>,
}

impl Sample {
    /// Creates a sample from the given sequences, keeping their order and multiplicity.
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(sequences: I) -> Self {
        Self {
            sequences: sequences.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of sequences, counting duplicates.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// True if the sample holds no sequence at all.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// The sequences in the order they were given.
    pub fn sequences(&self) -> &[String] {
        &self.sequences
    }

    /// Iterates over the sequences.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.sequences.iter().map(String::as_str)
    }

    /// The sorted set of symbols that occur in the sample.
    pub fn alphabet(&self) -> Alphabet {
        Alphabet::from_sequences(&self.sequences)
    }

    /// Length of the longest sequence.
    pub fn max_len(&self) -> usize {
        self.iter().map(|s| s.chars().count()).max().unwrap_or(0)
    }

    /// Counts, for every prefix of every sequence (the empty prefix included), how many
    /// sequences start with it.
    pub fn prefix_counts(&self) -> Map<String, u64> {
        let mut counts: Map<String, u64> = Map::default();
        for sequence in self.iter() {
            *counts.entry(String::new()).or_default() += 1;
            for (position, symbol) in sequence.char_indices() {
                let end = position + symbol.len_utf8();
                *counts.entry(sequence[..end].to_string()).or_default() += 1;
            }
        }
        counts
    }

    /// Number of sequences that begin with `prefix`.
    pub fn count_with_prefix(&self, prefix: &str) -> u64 {
        self.iter().filter(|s| s.starts_with(prefix)).count() as u64
    }
}

impl<S: Into<String>> FromIterator<S> for Sample {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Reads one sequence per line. Blank lines and lines starting with `#` are skipped, a line
/// consisting of `-` or `ε` stands for the empty sequence.
impl TryFrom<&str> for Sample {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let sequences = value
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
            .map(|(number, line)| {
                let trimmed = line.trim();
                trace!("parsing sequence \"{trimmed}\"");
                match trimmed {
                    "-" | "ε" => Ok(String::new()),
                    word if word.chars().any(char::is_whitespace) => {
                        Err(Error::MalformedSequence {
                            line: number + 1,
                            content: line.to_string(),
                        })
                    }
                    word => Ok(word.to_string()),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { sequences })
    }
}

impl FromStr for Sample {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s)
    }
}
