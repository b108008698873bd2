use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod alignments;
pub mod gene_calls;
pub mod manifest;
pub mod reader;
pub mod taxonomy;

use alignments::{AlignmentHit, contig_of, parse_alignments};
use gene_calls::read_gene_ids;
use taxonomy::TaxonomyTable;

use crate::model::genome::{GeneMapping, Genome, GenomeBuilder};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error in {}:{line}: {msg}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        msg: String,
    },
}

impl InputError {
    pub fn parse(path: &Path, line: usize, msg: impl Into<String>) -> Self {
        InputError::Parse {
            path: path.to_path_buf(),
            line,
            msg: msg.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneCalls {
    Fasta(PathBuf),
    Count(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeSource {
    pub id: String,
    pub alignments: PathBuf,
    pub gene_calls: GeneCalls,
}

/// `sample.fa.diamond.out.gz` -> `sample.fa`
pub fn genome_id_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    for suffix in [".diamond.out", ".blast.out", ".m8", ".tsv", ".out"] {
        if let Some(stem) = name.strip_suffix(suffix) {
            if !stem.is_empty() {
                return stem.to_string();
            }
        }
    }
    name.to_string()
}

pub fn load_genome(source: &GenomeSource, taxonomy: &TaxonomyTable) -> Result<Genome, InputError> {
    let hits = parse_alignments(&source.alignments)?;
    let n_hits = hits.len();

    let mut builder;
    let mut unknown_references = 0usize;

    match &source.gene_calls {
        GeneCalls::Fasta(path) => {
            let ids = read_gene_ids(path)?;
            let mut seen: HashSet<&str> = HashSet::with_capacity(ids.len());
            let unique = ids
                .iter()
                .filter(|id| seen.insert(id.as_str()))
                .collect::<Vec<_>>();
            if unique.len() < ids.len() {
                tracing::warn!(
                    genome = %source.id,
                    duplicates = ids.len() - unique.len(),
                    "duplicate gene ids in gene calls; counting each once"
                );
            }
            builder = GenomeBuilder::new(&source.id, unique.len());
            let mut by_query: HashMap<&str, &AlignmentHit> =
                hits.iter().map(|h| (h.query.as_str(), h)).collect();
            for id in unique {
                let mapping = by_query
                    .remove(id.as_str())
                    .and_then(|hit| resolve_mapping(hit, taxonomy, &mut unknown_references));
                builder.push_gene(id.as_str(), contig_of(id), mapping);
            }
            let orphans = hits
                .iter()
                .filter(|h| by_query.contains_key(h.query.as_str()))
                .collect::<Vec<_>>();
            if !orphans.is_empty() {
                tracing::warn!(
                    genome = %source.id,
                    genes = orphans.len(),
                    "aligned genes absent from gene calls"
                );
                for hit in orphans {
                    let mapping = resolve_mapping(hit, taxonomy, &mut unknown_references);
                    builder.push_gene(hit.query.as_str(), contig_of(&hit.query), mapping);
                }
            }
        }
        GeneCalls::Count(n) => {
            builder = GenomeBuilder::new(&source.id, *n);
            for hit in &hits {
                let mapping = resolve_mapping(hit, taxonomy, &mut unknown_references);
                builder.push_gene(hit.query.as_str(), contig_of(&hit.query), mapping);
            }
        }
    }

    if unknown_references > 0 {
        tracing::warn!(
            genome = %source.id,
            hits = unknown_references,
            "hits to references missing from the taxonomy are treated as unmapped"
        );
    }

    let genome = builder.build();
    tracing::info!(
        genome = %genome.id,
        called = genome.n_genes_called,
        aligned = n_hits,
        mapped = genome.n_genes_mapped(),
        contigs = genome.n_contigs(),
        "loaded genome"
    );
    Ok(genome)
}

fn resolve_mapping(
    hit: &AlignmentHit,
    taxonomy: &TaxonomyTable,
    unknown_references: &mut usize,
) -> Option<GeneMapping> {
    match taxonomy.get(&hit.reference) {
        Some(lineage) => Some(GeneMapping {
            lineage: lineage.clone(),
            identity: hit.identity,
        }),
        None => {
            *unknown_references += 1;
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
