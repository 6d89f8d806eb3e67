use std::{
    fmt::{Debug, Display},
    hash::Hash,
    ops::Index,
};

use itertools::Itertools;

use crate::{Error, Map, Result};

/// Anything that can be used to name a state. We require `Display` so that states can be
/// shown in tables and log messages.
pub trait Label: Clone + Eq + Hash + Ord + Debug + Display {
    /// Renders the label as a string.
    fn show(&self) -> String {
        self.to_string()
    }
}
impl<T: Clone + Eq + Hash + Ord + Debug + Display> Label for T {}

/// The identity of a state. Every automaton has exactly one [`State::Root`], the artificial
/// start state that precedes the state of the empty prefix. All other states carry a label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State<L = usize> {
    /// The artificial start state, always at position 0.
    Root,
    /// Any other state.
    Labelled(L),
}

impl<L> State<L> {
    /// Returns true for the root.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// The label, if this is not the root.
    pub fn label(&self) -> Option<&L> {
        match self {
            Self::Root => None,
            Self::Labelled(label) => Some(label),
        }
    }
}

impl<L> From<L> for State<L> {
    fn from(label: L) -> Self {
        Self::Labelled(label)
    }
}

impl<L: Display> Display for State<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "*"),
            Self::Labelled(label) => write!(f, "{label}"),
        }
    }
}

/// An ordered list of state identities together with an index from identity to position.
/// Position 0 always holds the root, and the position of a state is its row and column in
/// the tensor of the automaton the list belongs to.
#[derive(Clone, Debug)]
pub struct StateList<L: Label = usize> {
    states: Vec<State<L>>,
    index: Map<State<L>, usize>,
}

impl<L: Label> StateList<L> {
    /// Creates the list `[*, labels...]`, failing if a label occurs twice.
    pub fn new<I: IntoIterator<Item = L>>(labels: I) -> Result<Self> {
        let states = std::iter::once(State::Root)
            .chain(labels.into_iter().map(State::Labelled))
            .collect_vec();
        let mut index: Map<State<L>, usize> = Map::default();
        for (position, state) in states.iter().enumerate() {
            if index.insert(state.clone(), position).is_some() {
                return Err(Error::DuplicateState(state.show()));
            }
        }
        Ok(Self { states, index })
    }

    /// Number of states, the root included.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if the list holds no states at all.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Position of `state`, if it is present.
    pub fn position(&self, state: &State<L>) -> Option<usize> {
        self.index.get(state).copied()
    }

    /// Position of `state`, or [`Error::UnknownState`].
    pub fn locate(&self, state: &State<L>) -> Result<usize> {
        self.position(state)
            .ok_or_else(|| Error::UnknownState(state.show()))
    }

    /// The state at `position`.
    pub fn get(&self, position: usize) -> Option<&State<L>> {
        self.states.get(position)
    }

    /// Returns true if `state` is part of the list.
    pub fn contains(&self, state: &State<L>) -> bool {
        self.index.contains_key(state)
    }

    /// Iterates over all states in positional order, starting with the root.
    pub fn iter(&self) -> std::slice::Iter<'_, State<L>> {
        self.states.iter()
    }

    /// The labels of all states except the root, in positional order.
    pub fn labels(&self) -> impl Iterator<Item = &L> + '_ {
        self.states.iter().filter_map(State::label)
    }

    /// The list with the state at `position` removed. Everything behind it moves up by one.
    pub(crate) fn without(&self, position: usize) -> Self {
        let mut states = self.states.clone();
        states.remove(position);
        let index = states
            .iter()
            .enumerate()
            .map(|(position, state)| (state.clone(), position))
            .collect();
        Self { states, index }
    }
}

impl StateList<usize> {
    /// The list `[*, 0, 1, ..., count - 1]`.
    pub(crate) fn enumerated(count: usize) -> Self {
        let states = std::iter::once(State::Root)
            .chain((0..count).map(State::Labelled))
            .collect_vec();
        let index = states
            .iter()
            .enumerate()
            .map(|(position, state)| (*state, position))
            .collect();
        Self { states, index }
    }
}

impl<L: Label> Default for StateList<L> {
    fn default() -> Self {
        Self {
            states: vec![State::Root],
            index: Map::from_iter([(State::Root, 0)]),
        }
    }
}

impl<L: Label> PartialEq for StateList<L> {
    fn eq(&self, other: &Self) -> bool {
        self.states == other.states
    }
}
impl<L: Label> Eq for StateList<L> {}

impl<L: Label> Index<usize> for StateList<L> {
    type Output = State<L>;

    fn index(&self, position: usize) -> &Self::Output {
        &self.states[position]
    }
}

impl<'a, L: Label> IntoIterator for &'a StateList<L> {
    type Item = &'a State<L>;
    type IntoIter = std::slice::Iter<'a, State<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

impl<L: Label> Display for StateList<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.states.iter().join(", "))
    }
}
