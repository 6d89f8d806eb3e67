use std::fmt::Display;

use owo_colors::OwoColorize;

use crate::{
    automaton::{Label, State},
    Verbosity,
};

/// Something that happened during a merge search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeEvent<L: Label = usize> {
    /// A candidate pair proposed by the search was put through the compatibility test.
    Tested {
        /// The first state of the pair.
        first: State<L>,
        /// The second state of the pair.
        second: State<L>,
        /// Outcome of the test.
        compatible: bool,
    },
    /// A pair of destinations that a merge made ambiguous was tested while restoring
    /// determinism.
    Cascade {
        /// The first destination.
        first: State<L>,
        /// The second destination.
        second: State<L>,
        /// Outcome of the test.
        compatible: bool,
    },
    /// A recursive merge went through.
    Merged {
        /// The first state of the pair.
        first: State<L>,
        /// The second state of the pair.
        second: State<L>,
        /// Number of follow-up merges that were needed.
        cascade: usize,
        /// Number of states afterwards, the root included.
        size: usize,
    },
    /// A recursive merge was rolled back.
    Rejected {
        /// The first state of the pair.
        first: State<L>,
        /// The second state of the pair.
        second: State<L>,
        /// The incompatible pair that caused the rollback.
        conflict: (State<L>, State<L>),
    },
    /// A blue state was found to be distinct from every red state.
    Promoted {
        /// The new red state.
        state: State<L>,
    },
}

impl<L: Label> MergeEvent<L> {
    /// The lowest [`Verbosity`] at which the event is reported.
    pub fn verbosity(&self) -> Verbosity {
        match self {
            MergeEvent::Cascade { .. } | MergeEvent::Rejected { .. } => Verbosity::Cascade,
            _ => Verbosity::Full,
        }
    }

    /// Returns true for a successful merge.
    pub fn is_merge(&self) -> bool {
        matches!(self, MergeEvent::Merged { .. })
    }
}

impl<L: Label> Display for MergeEvent<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeEvent::Tested {
                first,
                second,
                compatible,
            } => write!(f, "testing {first} ~ {second}: {compatible}"),
            MergeEvent::Cascade {
                first,
                second,
                compatible,
            } => write!(f, "cascading into {first} ~ {second}: {compatible}"),
            MergeEvent::Merged {
                first,
                second,
                cascade,
                size,
            } => write!(
                f,
                "merged {first} and {second} with {cascade} follow-up merges, {size} states left"
            ),
            MergeEvent::Rejected {
                first,
                second,
                conflict: (a, b),
            } => write!(f, "rolled back merge of {first} and {second}, {a} and {b} differ"),
            MergeEvent::Promoted { state } => write!(f, "promoted {state} to red"),
        }
    }
}

/// A sink for [`MergeEvent`]s. The unit type discards everything.
pub trait MergeLogger<L: Label> {
    /// Records `event`.
    fn log(&mut self, event: MergeEvent<L>);
}

impl<L: Label> MergeLogger<L> for () {
    fn log(&mut self, _event: MergeEvent<L>) {}
}

/// Forwards events to `tracing`, dropping those above the configured [`Verbosity`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TracingLogger(Verbosity);

impl TracingLogger {
    /// Creates a logger reporting everything up to `verbosity`.
    pub fn new(verbosity: Verbosity) -> Self {
        Self(verbosity)
    }
}

impl<L: Label> MergeLogger<L> for TracingLogger {
    fn log(&mut self, event: MergeEvent<L>) {
        if self.0 == Verbosity::Silent || event.verbosity() > self.0 {
            return;
        }
        match &event {
            MergeEvent::Merged { .. } => tracing::info!("{} {event}", "merge".green().bold()),
            MergeEvent::Rejected { .. } => tracing::info!("{} {event}", "merge".red().bold()),
            MergeEvent::Promoted { .. } => tracing::info!("{} {event}", "red".bold()),
            _ => tracing::info!("{} {event}", "test".bold()),
        }
    }
}

/// Keeps every event, mostly useful for inspecting a search after the fact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeLogbook<L: Label = usize>(Vec<MergeEvent<L>>);

impl<L: Label> Default for MergeLogbook<L> {
    fn default() -> Self {
        Self(vec![])
    }
}

impl<L: Label> MergeLogbook<L> {
    /// An empty logbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in the order they happened.
    pub fn events(&self) -> &[MergeEvent<L>] {
        &self.0
    }

    /// Number of successful top-level merges.
    pub fn merges(&self) -> usize {
        self.0.iter().filter(|event| event.is_merge()).count()
    }

    /// The red states in the order they were promoted.
    pub fn promotions(&self) -> Vec<&State<L>> {
        self.0
            .iter()
            .filter_map(|event| match event {
                MergeEvent::Promoted { state } => Some(state),
                _ => None,
            })
            .collect()
    }

    /// Number of recursive merges that were rolled back.
    pub fn rollbacks(&self) -> usize {
        self.0
            .iter()
            .filter(|event| matches!(event, MergeEvent::Rejected { .. }))
            .count()
    }
}

impl<L: Label> MergeLogger<L> for MergeLogbook<L> {
    fn log(&mut self, event: MergeEvent<L>) {
        self.0.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn merged(first: usize, second: usize) -> MergeEvent {
        MergeEvent::Merged {
            first: State::Labelled(first),
            second: State::Labelled(second),
            cascade: 0,
            size: 3,
        }
    }

    #[test]
    fn logbook_counts_merges() {
        let mut logbook = MergeLogbook::new();
        logbook.log(MergeEvent::Tested {
            first: State::Labelled(1),
            second: State::Labelled(0),
            compatible: true,
        });
        logbook.log(merged(1, 0));
        logbook.log(MergeEvent::Promoted {
            state: State::Labelled(4),
        });
        assert_eq!(logbook.merges(), 1);
        assert_eq!(logbook.rollbacks(), 0);
        assert_eq!(logbook.promotions(), vec![&State::Labelled(4)]);
        assert_eq!(logbook.events().len(), 3);
    }

    #[test]
    #[traced_test]
    fn tracing_logger_respects_verbosity() {
        let mut cascade = TracingLogger::new(Verbosity::Cascade);
        cascade.log(merged(7, 3));
        assert!(!logs_contain("merged 7 and 3"));
        cascade.log(MergeEvent::Rejected {
            first: State::Labelled(7),
            second: State::Labelled(3),
            conflict: (State::Labelled(8), State::Labelled(5)),
        });
        assert!(logs_contain("8 and 5 differ"));

        let mut full = TracingLogger::new(Verbosity::Full);
        full.log(merged(9, 2));
        assert!(logs_contain("merged 9 and 2"));

        let mut silent = TracingLogger::new(Verbosity::Silent);
        silent.log(MergeEvent::<usize>::Promoted {
            state: State::Labelled(11),
        });
        assert!(!logs_contain("promoted 11"));
    }
}
