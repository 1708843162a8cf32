use std::path::PathBuf;

use clap::Args;

use crate::cli::{load_store, OutputFormat, ScoringArgs};
use crate::core::types::MatchMethod;
use crate::matching::engine::{MatchError, Matcher, MatchingConfig, DEFAULT_THRESHOLD};
use crate::matching::mapping::Mapping;
use crate::similarity::scorer::SimilarityScorer;

#[derive(Args)]
pub struct LinkArgs {
    /// Fingerprints of dataset A (one hex fingerprint per line)
    #[arg(required = true)]
    pub input_a: PathBuf,

    /// Fingerprints of dataset B (one hex fingerprint per line)
    #[arg(required = true)]
    pub input_b: PathBuf,

    /// Matching strategy: threshold, bipartite, weighted, greedy, or none
    /// (none passes top-k candidates through and needs --top-k)
    #[arg(short, long, default_value = "threshold")]
    pub method: String,

    /// Minimum similarity for a pair to be linked (inclusive)
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Score only the k best candidates per record of A
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// With --method none, report every surviving candidate instead of the best
    #[arg(long)]
    pub multi_valued: bool,

    #[command(flatten)]
    pub scoring: ScoringArgs,
}

/// Execute link subcommand
///
/// # Errors
///
/// Returns an error if the inputs cannot be parsed, scoring fails, or the
/// matching options are invalid.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: LinkArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    // Validate matching options before doing any scoring work
    let method = parse_method(&args.method)?;
    let matcher = Matcher::with_config(
        MatchingConfig::default()
            .with_threshold(args.threshold)
            .with_method(method)
            .with_multi_valued(args.multi_valued),
    )?;

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

    let mapping = matcher.map(&graph)?;
    if verbose {
        eprintln!("Linked {} of {} records", mapping.len(), store_a.len());
    }

    match format {
        OutputFormat::Text => print_text_mapping(&args, &mapping, store_a.len()),
        OutputFormat::Json => print_json_mapping(&args, &mapping)?,
        OutputFormat::Tsv => print_tsv_mapping(&mapping),
    }

    Ok(())
}

/// `none` selects pass-through; anything else must name a strategy
fn parse_method(name: &str) -> Result<Option<MatchMethod>, MatchError> {
    if name.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    name.parse::<MatchMethod>()
        .map(Some)
        .map_err(|e| MatchError::UnknownMethod(e.0))
}

fn method_label(method: Option<MatchMethod>) -> String {
    match method {
        None => "none (pass-through)".to_string(),
        Some(m) if m.is_optimal() => format!("{m} (optimal)"),
        Some(m) => m.to_string(),
    }
}

fn print_text_mapping(args: &LinkArgs, mapping: &Mapping, n_a: usize) {
    println!("Linkage Results");
    println!("{}", "=".repeat(60));
    println!("\nDataset A: {}", args.input_a.display());
    println!("Dataset B: {}", args.input_b.display());
    println!("Method: {}", method_label(mapping.method()));
    println!("Threshold: {:.2}%", args.threshold * 100.0);
    println!("Linked: {} of {} records", mapping.len(), n_a);
    println!("Total score: {:.4}\n", mapping.total_score());

    for (index_a, targets) in mapping.links() {
        let rendered: Vec<String> = targets
            .iter()
            .map(|t| format!("B[{}] ({:.2}%)", t.index_b, t.score * 100.0))
            .collect();
        println!("  A[{}] -> {}", index_a, rendered.join(", "));
    }
}

fn print_json_mapping(args: &LinkArgs, mapping: &Mapping) -> anyhow::Result<()> {
    let links: Vec<serde_json::Value> = mapping
        .edges()
        .map(|e| {
            serde_json::json!({
                "index_a": e.index_a,
                "index_b": e.index_b,
                "score": e.score,
            })
        })
        .collect();

    let output = serde_json::json!({
        "input_a": args.input_a.display().to_string(),
        "input_b": args.input_b.display().to_string(),
        "method": mapping.method(),
        "threshold": args.threshold,
        "linked": mapping.len(),
        "total_score": mapping.total_score(),
        "links": links,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_mapping(mapping: &Mapping) {
    println!("index_a\tindex_b\tscore");
    for edge in mapping.edges() {
        println!("{}\t{}\t{:.6}", edge.index_a, edge.index_b, edge.score);
    }
}
