//! Passive learning of probabilistic automata from sequence samples, and estimation of pattern
//! probabilities under the learned automata.
//!
//! A [`Sample`] is turned into a prefix tree acceptor ([`CountAutomaton::from_sample`]) whose
//! states are then merged as long as the Hoeffding test considers them compatible. The merging
//! either tests every pair ([`exhaustive`]) or grows a red core of final states ([`frontier`]).
//! Normalizing the result yields a [`ProbabilityAutomaton`], on which the [`PatternEstimator`]
//! computes the probability of observing patterns and sequences.
#![warn(missing_docs)]

mod alphabet;
pub use alphabet::{alphabet, Alphabet, HasAlphabet};

mod error;
pub use error::{Error, Result};

mod sample;
pub use sample::Sample;

mod prefixtree;
pub use prefixtree::{state_paths, Traversal};

mod automaton;
pub use automaton::{CountAutomaton, Label, State, StateList};

mod config;
pub use config::{LearnerConfig, SequenceMode, Significance, Strategy, Verbosity};

mod statistics;

pub mod merge;
pub use merge::{exhaustive, frontier, Merge, MergeReport};

mod probability;
pub use probability::ProbabilityAutomaton;

pub mod estimate;
pub use estimate::PatternEstimator;

mod display;

mod learn;
pub use learn::{learn, Learned};

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = ahash::AHashMap<K, V>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;
