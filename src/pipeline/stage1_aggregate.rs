use std::collections::{BTreeMap, BTreeSet};

use crate::model::genome::Genome;
use crate::model::issues::RowIssue;
use crate::model::taxonomy::TaxonomicLevel;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CladeBucket {
    pub genes: Vec<usize>,
    pub contigs: BTreeSet<usize>,
    pub identity_sum: f64,
}

impl CladeBucket {
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    pub fn mean_identity(&self) -> f64 {
        if self.genes.is_empty() {
            0.0
        } else {
            self.identity_sum / self.genes.len() as f64
        }
    }
}

/// Clade label -> bucket, for a single genome at a single level.
#[derive(Debug, Clone, PartialEq)]
pub struct CladeTable {
    pub level: TaxonomicLevel,
    pub n_genes_mapped: usize,
    pub clades: BTreeMap<String, CladeBucket>,
}

impl CladeTable {
    pub fn n_clades(&self) -> usize {
        self.clades.len()
    }
}

pub fn aggregate_clades(genome: &Genome, level: TaxonomicLevel) -> Result<CladeTable, RowIssue> {
    let mut clades: BTreeMap<String, CladeBucket> = BTreeMap::new();
    // label at `level` -> (labels at every coarser level, first gene that defined them)
    let mut ancestors: BTreeMap<&str, (Vec<&str>, &str)> = BTreeMap::new();
    let coarser = &TaxonomicLevel::ALL[..level.index()];
    let mut n_genes_mapped = 0usize;

    for (idx, gene, mapping) in genome.mapped_genes() {
        n_genes_mapped += 1;
        let lineage = mapping.lineage.as_ref();
        let label = lineage
            .label(level)
            .ok_or_else(|| RowIssue::LineageInconsistency {
                level,
                gene: gene.id.clone(),
                detail: format!("no {level} label in lineage"),
            })?;
        if let Some(gap) = lineage.first_gap_above(level) {
            return Err(RowIssue::LineageInconsistency {
                level,
                gene: gene.id.clone(),
                detail: format!("{level} label {label} has no {gap} ancestor"),
            });
        }
        // gaps were rejected above, so every coarser label is present
        let path = coarser
            .iter()
            .map(|&l| lineage.label(l).unwrap_or_default())
            .collect::<Vec<_>>();
        match ancestors.get(label) {
            Some((seen, first_gene)) => {
                let conflict = coarser
                    .iter()
                    .zip(seen.iter().zip(&path))
                    .find(|(_, (a, b))| a != b);
                if let Some((ancestor, (seen_label, label_here))) = conflict {
                    return Err(RowIssue::LineageInconsistency {
                        level,
                        gene: gene.id.clone(),
                        detail: format!(
                            "{level} {label} placed under {ancestor} {label_here}, but under {seen_label} for gene {first_gene}"
                        ),
                    });
                }
            }
            None => {
                ancestors.insert(label, (path, gene.id.as_str()));
            }
        }

        let bucket = clades.entry(label.to_string()).or_default();
        bucket.genes.push(idx);
        bucket.contigs.insert(gene.contig);
        bucket.identity_sum += mapping.identity;
    }

    Ok(CladeTable {
        level,
        n_genes_mapped,
        clades,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_aggregate.rs"]
mod tests;
