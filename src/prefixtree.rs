use std::{collections::VecDeque, fmt::Display, str::FromStr};

use itertools::Itertools;
use tracing::trace;

use crate::{Error, Sample};

/// The order in which the nodes of a prefix tree are enumerated, which in turn fixes the
/// positions of the states in a tensor built from the tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Level by level. Within a level, prefixes appear in lexicographic order.
    BreadthFirst,
    /// Pre-order: a prefix is followed by all of its extensions before its next sibling.
    DepthFirst,
    /// All children of a node are listed (in symbol order) before descending into the first
    /// of them, so siblings always end up next to each other.
    #[default]
    SiblingsFirst,
}

impl FromStr for Traversal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breadth" | "breadth-first" | "bfs" => Ok(Self::BreadthFirst),
            "depth" | "depth-first" | "dfs" => Ok(Self::DepthFirst),
            "siblings" | "siblings-first" => Ok(Self::SiblingsFirst),
            _ => Err(Error::UnknownTraversal(s.to_string())),
        }
    }
}

impl Display for Traversal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BreadthFirst => write!(f, "breadth-first"),
            Self::DepthFirst => write!(f, "depth-first"),
            Self::SiblingsFirst => write!(f, "siblings-first"),
        }
    }
}

/// Groups the remainders of `words` by their first symbol. The groups are returned in
/// ascending symbol order and only contain the words that actually continue.
fn children<'a>(words: &[&'a str]) -> Vec<(char, Vec<&'a str>)> {
    words
        .iter()
        .filter_map(|&word| {
            let symbol = word.chars().next()?;
            Some((symbol, &word[symbol.len_utf8()..]))
        })
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(symbol, _)| *symbol)
        .collect()
}

fn preorder(access: &str, words: &[&str], paths: &mut Vec<String>) {
    for (symbol, rest) in children(words) {
        let path = format!("{access}{symbol}");
        trace!("adding state {path:?}");
        paths.push(path.clone());
        preorder(&path, &rest, paths);
    }
}

fn siblings_first(access: &str, words: &[&str], paths: &mut Vec<String>) {
    let groups = children(words)
        .into_iter()
        .map(|(symbol, rest)| (format!("{access}{symbol}"), rest))
        .collect_vec();
    for (path, _) in &groups {
        trace!("adding state {path:?}");
        paths.push(path.clone());
    }
    for (path, rest) in &groups {
        siblings_first(path, rest, paths);
    }
}

/// Lists every distinct prefix of the sample's sequences, the empty prefix first, in the
/// requested [`Traversal`] order. The position of a prefix in this list (shifted by one for
/// the root) becomes the position of the corresponding state.
pub fn state_paths(sample: &Sample, traversal: Traversal) -> Vec<String> {
    let words = sample.iter().collect_vec();
    let mut paths = vec![String::new()];

    match traversal {
        Traversal::DepthFirst => preorder("", &words, &mut paths),
        Traversal::SiblingsFirst => siblings_first("", &words, &mut paths),
        Traversal::BreadthFirst => {
            let mut queue = VecDeque::from_iter([(String::new(), words)]);
            while let Some((access, words)) = queue.pop_front() {
                for (symbol, rest) in children(&words) {
                    let path = format!("{access}{symbol}");
                    trace!("adding state {path:?}");
                    paths.push(path.clone());
                    queue.push_back((path, rest));
                }
            }
        }
    }

    paths
}
