//! Score command - compare two fingerprint files and print the scored pairs.

use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_store, OutputFormat, ScoringArgs};
use crate::similarity::graph::{GraphKind, SimilarityGraph};
use crate::similarity::scorer::SimilarityScorer;

/// Arguments for the score command
#[derive(Args)]
pub struct ScoreArgs {
    /// Fingerprints of dataset A (one hex fingerprint per line)
    #[arg(required = true)]
    pub input_a: PathBuf,

    /// Fingerprints of dataset B (one hex fingerprint per line)
    #[arg(required = true)]
    pub input_b: PathBuf,

    /// Keep only the k best candidates per record of A
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    #[command(flatten)]
    pub scoring: ScoringArgs,
}

/// Execute the score command
///
/// # Errors
///
/// Returns an error if inputs cannot be parsed or scoring fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ScoreArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let store_a = load_store(&args.input_a, verbose)?;
    let store_b = load_store(&args.input_b, verbose)?;

    let scorer = SimilarityScorer::with_config(args.scoring.to_config());
    let graph = match args.top_k {
        Some(k) => scorer.score_top_k(&store_a, &store_b, k)?,
        None => scorer.score_all(&store_a, &store_b)?,
    };

    if verbose {
        eprintln!("Scored {} candidate pairs", graph.len());
    }

    match format {
        OutputFormat::Text => print_text_graph(&args, &graph),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&graph)?),
        OutputFormat::Tsv => print_tsv_graph(&graph),
    }

    Ok(())
}

fn print_text_graph(args: &ScoreArgs, graph: &SimilarityGraph) {
    println!("Similarity Scores");
    println!("{}", "=".repeat(60));
    println!("\nDataset A: {} ({} records)", args.input_a.display(), graph.n_a());
    println!("Dataset B: {} ({} records)", args.input_b.display(), graph.n_b());
    match graph.kind() {
        GraphKind::TopK { k } => println!("Mode: top-{k} per record"),
        GraphKind::Dense => println!("Mode: all pairs"),
        GraphKind::Sparse => println!("Mode: sparse"),
    }
    println!("Pairs: {}\n", graph.len());

    for edge in graph.edges() {
        println!(
            "  A[{}] ~ B[{}]  {:.2}%",
            edge.index_a,
            edge.index_b,
            edge.score * 100.0
        );
    }
}

fn print_tsv_graph(graph: &SimilarityGraph) {
    println!("index_a\tindex_b\tscore");
    for edge in graph.edges() {
        println!("{}\t{}\t{:.6}", edge.index_a, edge.index_b, edge.score);
    }
}
