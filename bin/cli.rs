use clap::{Args, Parser, Subcommand, ValueEnum};
use pamina::{LearnerConfig, SequenceMode, Strategy, Traversal, Verbosity};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Pamina {
    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub verbose: bool,
    /// Turn on debugging information
    #[arg(short, long, global = true)]
    pub debug: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Learns an automaton from a sample and prints its transition table")]
    Learn {
        #[command(flatten)]
        learner: LearnerArgs,
        /// Print the normalized automaton as well
        #[arg(short, long)]
        probabilities: bool,
    },
    #[command(about = "Learns an automaton and estimates the probability of a pattern under it")]
    Estimate {
        #[command(flatten)]
        learner: LearnerArgs,
        /// The pattern, symbol, digram or sequence to evaluate
        pattern: String,
        #[arg(short, long, value_enum, default_value_t = Query::Pattern)]
        query: Query,
        /// Number of arbitrary steps before the pattern starts, for distance queries
        #[arg(long, default_value_t = 0)]
        distance: usize,
        /// Also decide whether the pattern is frequent enough given the sample size
        #[arg(long)]
        proportion: bool,
        #[arg(long, default_value = "pattern")]
        mode: SequenceMode,
    },
    #[command(about = "Learns an automaton and lists the probabilities of all short strings")]
    Strings {
        #[command(flatten)]
        learner: LearnerArgs,
        /// Longest string to enumerate
        #[arg(short = 'n', long, default_value_t = 3)]
        max_len: usize,
    },
}

#[derive(Args)]
pub struct LearnerArgs {
    /// Sample file with one sequence per line, stdin if missing
    #[arg(short, long)]
    pub input: Option<String>,
    /// Output file, stdout if missing
    #[arg(short, long)]
    pub output: Option<String>,
    /// Significance level of the compatibility test
    #[arg(short, long, default_value_t = 0.05)]
    pub alpha: f64,
    /// exhaustive (alergia) or frontier (red-blue)
    #[arg(short, long, default_value = "exhaustive")]
    pub strategy: Strategy,
    /// Layout of the prefix tree: siblings, depth or breadth
    #[arg(short, long, default_value = "siblings")]
    pub traversal: Traversal,
    /// Which merges to report: none, recursive or all
    #[arg(short, long, default_value = "none")]
    pub report: Verbosity,
}

impl LearnerArgs {
    pub fn config(&self) -> pamina::Result<LearnerConfig> {
        Ok(LearnerConfig::default()
            .with_significance(self.alpha)?
            .with_strategy(self.strategy)
            .with_traversal(self.traversal)
            .with_verbosity(self.report))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Query {
    Pattern,
    Symbol,
    Digram,
    Exact,
    Distance,
}
