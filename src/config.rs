use std::{fmt::Display, str::FromStr};

use crate::{prefixtree::Traversal, Error, Result};

/// A significance level for the statistical tests, guaranteed to lie in the open interval
/// `(0, 1)`. Smaller values make the compatibility test more permissive, so more states are
/// merged.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Significance(f64);

impl Significance {
    /// Wraps `alpha`, failing unless `0 < alpha < 1`.
    pub fn new(alpha: f64) -> Result<Self> {
        if alpha > 0.0 && alpha < 1.0 {
            Ok(Self(alpha))
        } else {
            Err(Error::Significance(alpha))
        }
    }

    /// The raw level.
    pub fn value(self) -> f64 {
        self.0
    }

    /// `sqrt(ln(2 / alpha) / 2)`, the factor in front of the Hoeffding bound.
    pub fn hoeffding_factor(self) -> f64 {
        (0.5 * (2.0 / self.0).ln()).sqrt()
    }
}

impl Default for Significance {
    fn default() -> Self {
        Self(0.05)
    }
}

impl TryFrom<f64> for Significance {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl Display for Significance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The order in which candidate pairs are proposed for merging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Classic ALERGIA: every pair of states is a candidate, and the candidate list starts over
    /// after each successful merge.
    #[default]
    Exhaustive,
    /// Red/blue search: only states on the frontier of the already confirmed (red) part are
    /// tried, against the red states.
    Frontier,
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "exhaustive" | "alergia" => Ok(Self::Exhaustive),
            "frontier" | "higuera" | "red-blue" => Ok(Self::Frontier),
            _ => Err(Error::UnknownStrategy(s.to_string())),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhaustive => write!(f, "exhaustive"),
            Self::Frontier => write!(f, "frontier"),
        }
    }
}

/// How much of the merge search is traced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    /// Nothing.
    #[default]
    Silent,
    /// Only what happens inside a recursive merge.
    Cascade,
    /// Every test, merge and promotion.
    Full,
}

impl FromStr for Verbosity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "silent" | "0" => Ok(Self::Silent),
            "recursive" | "cascade" | "1" => Ok(Self::Cascade),
            "all" | "full" | "2" => Ok(Self::Full),
            _ => Err(Error::UnknownVerbosity(s.to_string())),
        }
    }
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Silent => write!(f, "none"),
            Self::Cascade => write!(f, "recursive"),
            Self::Full => write!(f, "all"),
        }
    }
}

/// How a query string is read by the proportion test: as a pattern that may occur anywhere, or
/// as a complete sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SequenceMode {
    /// The probability that the pattern occurs from the initial state on.
    #[default]
    Pattern,
    /// The probability of emitting exactly this sequence and then stopping.
    Sequence,
}

impl FromStr for SequenceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pattern" => Ok(Self::Pattern),
            "sequence" | "exact" => Ok(Self::Sequence),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

impl Display for SequenceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern => write!(f, "pattern"),
            Self::Sequence => write!(f, "sequence"),
        }
    }
}

/// Everything that steers a learning run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LearnerConfig {
    /// Significance level of the compatibility test.
    pub significance: Significance,
    /// Merge search to run.
    pub strategy: Strategy,
    /// What the merge search reports through `tracing`.
    pub verbosity: Verbosity,
    /// Order in which prefix tree states are laid out.
    pub traversal: Traversal,
}

impl LearnerConfig {
    /// Sets the significance level, failing unless `0 < alpha < 1`.
    pub fn with_significance(self, alpha: f64) -> Result<Self> {
        Ok(Self {
            significance: Significance::new(alpha)?,
            ..self
        })
    }

    /// Sets the merge strategy.
    pub fn with_strategy(self, strategy: Strategy) -> Self {
        Self { strategy, ..self }
    }

    /// Sets the verbosity.
    pub fn with_verbosity(self, verbosity: Verbosity) -> Self {
        Self { verbosity, ..self }
    }

    /// Sets the traversal order.
    pub fn with_traversal(self, traversal: Traversal) -> Self {
        Self { traversal, ..self }
    }
}
