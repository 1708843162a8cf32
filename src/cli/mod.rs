//! Command-line interface for bloomlink.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **score**: Score two fingerprint files against each other
//! - **link**: Score, then resolve the scores into a one-to-one mapping
//!
//! ## Usage
//!
//! ```text
//! # Best 5 candidates per record of A
//! bloomlink score a.txt b.txt --top-k 5
//!
//! # Optimal linkage at the default 0.95 threshold
//! bloomlink link a.txt b.txt --method bipartite
//!
//! # Top-3 candidates per record, no conflict resolution
//! bloomlink link a.txt b.txt --top-k 3 --method none --multi-valued
//!
//! # JSON output for scripting
//! bloomlink link a.txt b.txt --format json
//! ```

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::core::store::FingerprintStore;
use crate::parsing;
use crate::similarity::scorer::{ScoringConfig, DEFAULT_CHUNK_ROWS};

pub mod link;
pub mod score;

#[derive(Parser)]
#[command(name = "bloomlink")]
#[command(version)]
#[command(about = "Link records across two datasets of Bloom-filter fingerprints")]
#[command(
    long_about = "bloomlink finds which fingerprint in dataset A most plausibly encodes the same entity as which fingerprint in dataset B.\n\nInputs are text files with one hex-encoded fingerprint per line. Fingerprints are compared with the Dice coefficient and the scores are resolved into a one-to-one mapping using one of four strategies:\n- threshold: fast, best candidate per record\n- greedy: fast, descending score\n- bipartite: optimal assignment\n- weighted: optimal, via min-cost flow"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score every fingerprint of A against B
    Score(score::ScoreArgs),

    /// Score and resolve into a mapping from A to B
    Link(link::LinkArgs),
}

/// Options shared by every command that scores fingerprints
#[derive(clap::Args)]
pub struct ScoringArgs {
    /// Drop pairs scoring below this value
    #[arg(long, default_value = "0.0")]
    pub min_score: f64,

    /// Score on a single thread
    #[arg(long)]
    pub serial: bool,

    /// Records of A scored per parallel task
    #[arg(long, default_value_t = DEFAULT_CHUNK_ROWS)]
    pub chunk_rows: usize,
}

impl ScoringArgs {
    #[must_use]
    pub fn to_config(&self) -> ScoringConfig {
        ScoringConfig::default()
            .with_min_score(self.min_score)
            .with_parallel(!self.serial)
            .with_chunk_rows(self.chunk_rows)
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Read a fingerprint file, attaching the path to any error
pub(crate) fn load_store(path: &Path, verbose: bool) -> anyhow::Result<FingerprintStore> {
    let store = parsing::parse_fingerprint_file(path)
        .with_context(|| format!("Failed to read fingerprints from {}", path.display()))?;

    if verbose {
        let bits = store.get(0).map_or(0, |fp| fp.bit_len());
        eprintln!(
            "{}: {} fingerprints of {} bits",
            path.display(),
            store.len(),
            bits
        );
    }

    Ok(store)
}
