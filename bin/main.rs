use anyhow::{bail, Context};
use clap::Parser;
use itertools::Itertools;
use pamina::{learn, HasAlphabet, Learned, PatternEstimator, SequenceMode};
use tabled::{builder::Builder, settings::Style};
use tracing::{debug, info, Level};

mod cli;
mod io;

use cli::{Commands, LearnerArgs, Pamina, Query};

fn run_learner(args: &LearnerArgs) -> anyhow::Result<(Learned, usize)> {
    let sample = io::sample(args.input.as_ref())?;
    let config = args.config()?;
    debug!(
        "learning with {} at significance {}",
        config.strategy, config.significance
    );
    Ok((learn(&sample, &config), sample.len()))
}

fn evaluate(
    estimator: &PatternEstimator,
    query: Query,
    pattern: &str,
    distance: usize,
) -> anyhow::Result<Vec<f64>> {
    let single = || match pattern.chars().exactly_one() {
        Ok(symbol) => Ok(symbol),
        Err(_) => bail!("{query:?} queries take a single symbol, got {pattern:?}"),
    };
    let values = match query {
        Query::Pattern => estimator.pattern_probability(pattern)?,
        Query::Symbol => estimator.symbol_probability(single()?)?,
        Query::Digram => estimator.digram_probability(pattern)?,
        Query::Distance if pattern.chars().count() == 1 => {
            estimator.letter_at_distance(single()?, distance)?
        }
        Query::Distance => estimator.pattern_at_distance(pattern, distance)?,
        Query::Exact => vec![estimator.exact_sequence_probability(pattern)?].into(),
    };
    debug!("evaluated {pattern:?} over {}", estimator.alphabet());
    Ok(values.to_vec())
}

fn main() -> anyhow::Result<()> {
    let cli = Pamina::parse();

    let level = if cli.verbose {
        Level::TRACE
    } else if cli.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Could not install the tracing subscriber")?;

    match cli.command {
        Commands::Learn {
            learner,
            probabilities,
        } => {
            let (learned, _) = run_learner(&learner)?;
            let mut output = learned.counts.to_string();
            if probabilities {
                output = format!("{output}\n{}", learned.probabilities);
            }
            io::to_file_or_stdout(learner.output.as_ref(), &output)
        }
        Commands::Estimate {
            learner,
            pattern,
            query,
            distance,
            proportion,
            mode,
        } => {
            let (learned, n) = run_learner(&learner)?;
            let estimator = learned.probabilities.estimator();
            let values = evaluate(&estimator, query, &pattern, distance)?;

            let mut builder = Builder::default();
            builder.set_header(["state", "probability"]);
            if query == Query::Exact {
                builder.push_record([pattern.clone(), values[0].to_string()]);
            } else {
                let states = learned.probabilities.states().iter().skip(1);
                for (state, value) in states.zip(&values) {
                    builder.push_record([state.to_string(), value.to_string()]);
                }
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            let mut output = table.to_string();

            if proportion {
                let mode = match query {
                    Query::Exact => SequenceMode::Sequence,
                    _ => mode,
                };
                let significant = estimator.proportion_constraint(
                    &pattern,
                    n,
                    learner.config()?.significance,
                    mode,
                )?;
                info!("proportion test on {n} sequences: {significant}");
                output = format!("{output}\nsignificant: {significant}");
            }
            io::to_file_or_stdout(learner.output.as_ref(), &output)
        }
        Commands::Strings { learner, max_len } => {
            let (learned, _) = run_learner(&learner)?;
            let estimator = learned.probabilities.estimator();
            let strings = estimator.enumerate_strings(max_len);
            let mut builder = Builder::default();
            builder.set_header(["string", "probability"]);
            for (string, probability) in estimator.string_probabilities(&strings)? {
                builder.push_record([string, probability.to_string()]);
            }
            let mut table = builder.build();
            table.with(Style::rounded());
            io::to_file_or_stdout(learner.output.as_ref(), &table.to_string())
        }
    }
}
