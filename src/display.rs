use std::fmt::{Display, Formatter};

use itertools::Itertools;
use ndarray::{s, Array3};
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style, Table};

use crate::{
    automaton::{CountAutomaton, Label, StateList},
    Alphabet, HasAlphabet, ProbabilityAutomaton,
};

/// One row per state, one column per symbol. A cell lists the `target:weight` pairs of all
/// transitions on that symbol, the last column holds what the state does not pass on.
fn transition_table<L, T, F>(
    alphabet: &Alphabet,
    states: &StateList<L>,
    tensor: &Array3<T>,
    remainder: impl Fn(usize) -> String,
    weight: F,
) -> Table
where
    L: Label,
    T: Copy + Default + PartialEq,
    F: Fn(T) -> String,
{
    let mut builder = Builder::default();
    builder.set_header(
        std::iter::once("δ".bright_yellow().to_string())
            .chain(alphabet.universe().map(|symbol| symbol.purple().to_string()))
            .chain(std::iter::once("⊣".bright_yellow().to_string())),
    );
    for (position, state) in states.iter().enumerate() {
        let mut row = vec![state.show().blue().bold().to_string()];
        for symbol in 0..alphabet.len() {
            let cell = tensor
                .slice(s![symbol, position, ..])
                .indexed_iter()
                .filter(|&(_, &value)| value != T::default())
                .map(|(target, &value)| format!("{}:{}", states[target].show().blue(), weight(value)))
                .join(", ");
            row.push(if cell.is_empty() {
                "-".dimmed().to_string()
            } else {
                cell
            });
        }
        row.push(remainder(position));
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::modern());
    table
}

impl<L: Label> CountAutomaton<L> {
    /// The transition counts as a table, with the number of sequences ending in each state in
    /// the last column.
    pub fn transition_table(&self) -> Table {
        transition_table(
            self.alphabet(),
            self.states(),
            self.counts(),
            |position| {
                self.entered_at(position)
                    .saturating_sub(self.outgoing_at(position))
                    .to_string()
            },
            |count| count.to_string(),
        )
    }
}

impl<L: Label> Display for CountAutomaton<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.transition_table())
    }
}

impl<L: Label> ProbabilityAutomaton<L> {
    /// The transition probabilities as a table, with the termination probability of each state
    /// in the last column.
    pub fn transition_table(&self) -> Table {
        transition_table(
            self.alphabet(),
            self.states(),
            self.probabilities(),
            |position| {
                let outgoing: f64 = self.probabilities().slice(s![.., position, ..]).sum();
                format!("{:.3}", (1.0 - outgoing).clamp(0.0, 1.0))
            },
            |probability| format!("{probability:.3}"),
        )
    }
}

impl<L: Label> Display for ProbabilityAutomaton<L> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.transition_table())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        tests::{alpha, list_of_sequences},
        CountAutomaton, Traversal,
    };

    #[test]
    fn count_table() {
        let pta = CountAutomaton::from_sample(&list_of_sequences(), Traversal::SiblingsFirst);
        let table = pta.transition_table();
        assert_eq!(table.count_rows(), pta.size() + 1);
        assert_eq!(table.count_columns(), 5);
        let rendered = pta.to_string();
        assert!(rendered.contains(":30"));
        assert!(rendered.contains(":15"));
    }

    #[test]
    fn probability_table() {
        let pta = CountAutomaton::from_sample(&list_of_sequences(), Traversal::SiblingsFirst);
        let merged = crate::exhaustive(pta, alpha(0.2), &mut ()).automaton;
        let rendered = merged.normalize().to_string();
        assert!(rendered.contains(":1.000"));
        assert!(rendered.contains(":0.500"));
        assert!(rendered.contains("1.000"));
    }
}
