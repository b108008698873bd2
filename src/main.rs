mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use thiserror::Error;

use crate::input::manifest::parse_manifest;
use crate::input::taxonomy::parse_taxonomy;
use crate::input::{GeneCalls, GenomeSource, InputError, genome_id_from_path, load_genome};
use crate::model::taxonomy::TaxonomicLevel;
use crate::model::thresholds::{AbundanceCutoff, ConfigError, ThresholdProfile};
use crate::pipeline::stage7_report::{Stage7Input, write_reports};
use crate::pipeline::{GenomeInput, score_batch};

#[derive(Debug, Parser)]
#[command(name = "kira-chimeraqc", version)]
#[command(about = "Genome chimerism and contamination scoring from gene-to-reference alignments.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score one genome or every genome of a manifest.
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Tabular alignment output (query, reference genome, percent identity).
    #[arg(long, value_name = "FILE", conflicts_with = "manifest", help_heading = "Input")]
    alignments: Option<PathBuf>,

    /// Gene-call FASTA used for the alignment.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["manifest", "genes_called"], help_heading = "Input")]
    gene_calls: Option<PathBuf>,

    /// Number of called genes, when the FASTA is not at hand.
    #[arg(long, value_name = "N", conflicts_with = "manifest", help_heading = "Input")]
    genes_called: Option<usize>,

    /// Genome name; defaults to the alignment file name.
    #[arg(long, value_name = "ID", requires = "alignments", help_heading = "Input")]
    genome_id: Option<String>,

    /// TSV of genome, alignments, gene calls (path or count).
    #[arg(long, value_name = "FILE", help_heading = "Input")]
    manifest: Option<PathBuf>,

    /// Reference genome -> lineage table.
    #[arg(long, value_name = "FILE", help_heading = "Input")]
    taxonomy: PathBuf,

    #[arg(long, value_name = "DIR", help_heading = "Output")]
    out: PathBuf,

    /// Append null-model separation columns.
    #[arg(long, help_heading = "Output")]
    null_model: bool,

    /// JSON scoring profile; flags below override it.
    #[arg(long, value_name = "FILE", help_heading = "Scoring")]
    config: Option<PathBuf>,

    /// Major clades need more than 10 genes instead of a 2% share.
    #[arg(long, conflicts_with = "abundance_threshold", help_heading = "Scoring")]
    sensitive: bool,

    #[arg(long, value_name = "F", help_heading = "Scoring")]
    abundance_threshold: Option<f64>,

    #[arg(long, value_name = "F", help_heading = "Scoring")]
    min_retained_index: Option<f64>,

    #[arg(long, value_name = "F", help_heading = "Scoring")]
    pass_cutoff: Option<f64>,

    #[arg(long, value_name = "N", help_heading = "Scoring")]
    min_genes_called: Option<usize>,

    /// Comma-separated levels, e.g. phylum,genus.
    #[arg(long, value_name = "LEVELS", value_delimiter = ',', help_heading = "Scoring")]
    levels: Option<Vec<TaxonomicLevel>>,

    /// Also score the species level.
    #[arg(long, help_heading = "Scoring")]
    species: bool,

    #[arg(long, value_name = "N")]
    threads: Option<usize>,
}

#[derive(Debug, Error)]
enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("{0}")]
    Usage(String),
    #[error("failed to configure thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to write reports: {0}")]
    Report(#[from] std::io::Error),
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    if let Err(err) = run(cli.command) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), RunError> {
    let Command::Run(args) = command;

    let profile = build_profile(&args)?;
    let sources = collect_sources(&args)?;

    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()?;
    }

    tracing::info!(
        genomes = sources.len(),
        levels = ?profile.levels,
        abundance = %profile.abundance.describe(),
        "scoring"
    );

    let taxonomy = parse_taxonomy(&args.taxonomy)?;
    for level in &profile.levels {
        if !taxonomy.levels.contains(level) {
            tracing::warn!(%level, "taxonomy table has no column for level");
        }
    }

    let inputs = sources
        .par_iter()
        .map(|source| match load_genome(source, &taxonomy) {
            Ok(genome) => GenomeInput::Ready(genome),
            Err(err) => {
                tracing::warn!(genome = %source.id, "{err}");
                GenomeInput::Missing {
                    id: source.id.clone(),
                    reason: err.to_string(),
                }
            }
        })
        .collect::<Vec<_>>();

    let scores = score_batch(&inputs, &profile);

    write_reports(
        &Stage7Input {
            genomes: &scores,
            profile: &profile,
            tool_name: "kira-chimeraqc".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            git_hash: read_git_hash(Path::new(".")),
        },
        &args.out,
    )?;

    Ok(())
}

fn build_profile(args: &RunArgs) -> Result<ThresholdProfile, RunError> {
    let mut profile = match &args.config {
        Some(path) => load_profile(path)?,
        None => ThresholdProfile::default_v1(),
    };

    if args.sensitive {
        profile.abundance = ThresholdProfile::sensitive_v1().abundance;
    }
    if let Some(theta) = args.abundance_threshold {
        profile.abundance = AbundanceCutoff::Fraction(theta);
    }
    if let Some(v) = args.min_retained_index {
        profile.min_genes_retained_index = v;
    }
    if let Some(v) = args.pass_cutoff {
        profile.pass_cutoff = v;
    }
    if let Some(n) = args.min_genes_called {
        profile.min_genes_called = n;
    }
    if let Some(levels) = &args.levels {
        profile.levels = levels.clone();
    }
    if args.species {
        profile = profile.with_species();
    }
    if args.null_model {
        profile.null_model = true;
    }

    Ok(profile.validated()?)
}

fn load_profile(path: &Path) -> Result<ThresholdProfile, RunError> {
    let text = std::fs::read_to_string(path).map_err(|source| RunError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RunError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

fn collect_sources(args: &RunArgs) -> Result<Vec<GenomeSource>, RunError> {
    let sources = if let Some(manifest) = &args.manifest {
        parse_manifest(manifest)?
    } else {
        let alignments = args.alignments.clone().ok_or_else(|| {
            RunError::Usage("either --manifest or --alignments is required".to_string())
        })?;
        let gene_calls = match (&args.gene_calls, args.genes_called) {
            (Some(path), _) => GeneCalls::Fasta(path.clone()),
            (None, Some(n)) => GeneCalls::Count(n),
            (None, None) => {
                return Err(RunError::Usage(
                    "--gene-calls or --genes-called is required with --alignments".to_string(),
                ));
            }
        };
        let id = args
            .genome_id
            .clone()
            .unwrap_or_else(|| genome_id_from_path(&alignments));
        vec![GenomeSource {
            id,
            alignments,
            gene_calls,
        }]
    };

    let mut seen = std::collections::HashSet::new();
    for source in &sources {
        if !seen.insert(source.id.as_str()) {
            tracing::warn!(genome = %source.id, "genome listed more than once");
        }
    }
    Ok(sources)
}

fn read_git_hash(repo_root: &Path) -> Option<String> {
    let head = repo_root.join(".git/HEAD");
    let content = std::fs::read_to_string(head).ok()?;
    if let Some(ref_line) = content.strip_prefix("ref: ") {
        let ref_path = repo_root.join(".git").join(ref_line.trim());
        return std::fs::read_to_string(ref_path)
            .ok()
            .map(|s| s.trim().to_string());
    }
    Some(content.trim().to_string())
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
