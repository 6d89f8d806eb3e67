use thiserror::Error;

/// Everything that can go wrong while building, merging or querying an automaton.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A state identity that does not occur in the automaton.
    #[error("state {0} does not exist")]
    UnknownState(String),
    /// The same label was given to two states.
    #[error("state label {0} occurs more than once")]
    DuplicateState(String),
    /// Merging the root or merging a state with itself.
    #[error("states {0} and {1} cannot be merged")]
    InvalidMerge(String, String),
    /// A tensor whose dimensions do not fit the alphabet or the state list.
    #[error("tensor has shape {found:?} but {expected:?} was expected")]
    Shape {
        /// The shape implied by alphabet and states.
        expected: [usize; 3],
        /// The shape of the tensor that was passed in.
        found: [usize; 3],
    },
    /// A symbol that is not part of the alphabet.
    #[error("symbol {0:?} is not part of the alphabet")]
    UnknownSymbol(char),
    /// A line of a sample that is not a valid sequence.
    #[error("line {line} is not a valid sequence: {content:?}")]
    MalformedSequence {
        /// One-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },
    /// Significance levels live in the open interval (0, 1).
    #[error("significance level must lie strictly between 0 and 1, got {0}")]
    Significance(f64),
    /// A pattern that is too short for the requested estimator.
    #[error("pattern needs at least {minimum} symbols, got {length}")]
    PatternTooShort {
        /// Smallest admissible length.
        minimum: usize,
        /// Length of the pattern that was given.
        length: usize,
    },
    /// Digrams consist of exactly two symbols.
    #[error("a digram consists of exactly two symbols, got {0}")]
    DigramLength(usize),
    /// The linear system behind an estimator has no unique solution.
    #[error("linear system is singular")]
    Singular,
    /// A name that does not denote any merge strategy.
    #[error("unknown merge strategy `{0}`")]
    UnknownStrategy(String),
    /// A name that does not denote any verbosity level.
    #[error("unknown verbosity level `{0}`")]
    UnknownVerbosity(String),
    /// A name that does not denote any traversal order.
    #[error("unknown traversal order `{0}`")]
    UnknownTraversal(String),
    /// A name that does not denote any way of reading a query sequence.
    #[error("unknown sequence mode `{0}`")]
    UnknownMode(String),
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
