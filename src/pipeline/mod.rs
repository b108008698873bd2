pub mod stage1_aggregate;
pub mod stage2_filter;
pub mod stage3_diversity;
pub mod stage4_separation;
pub mod stage5_identity;
pub mod stage6_compose;
pub mod stage7_report;

use rayon::prelude::*;

use crate::model::genome::Genome;
use crate::model::issues::RowIssue;
use crate::model::scores::ScoreRow;
use crate::model::taxonomy::TaxonomicLevel;
use crate::model::thresholds::ThresholdProfile;
use stage1_aggregate::aggregate_clades;
use stage2_filter::filter_major_clades;
use stage3_diversity::score_diversity;
use stage4_separation::{SeparationParams, score_separation};
use stage5_identity::score_identity;
use stage6_compose::{Stage6Inputs, compose_row};

/// A genome ready for scoring, or the reason its inputs could not be assembled.
#[derive(Debug, Clone)]
pub enum GenomeInput {
    Ready(Genome),
    Missing { id: String, reason: String },
}

impl GenomeInput {
    pub fn id(&self) -> &str {
        match self {
            GenomeInput::Ready(genome) => &genome.id,
            GenomeInput::Missing { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LevelOutcome {
    Scored(ScoreRow),
    /// Row emitted with zeroed metrics.
    Degraded { row: ScoreRow, issue: RowIssue },
    /// No row for this level.
    Failed {
        genome: String,
        level: TaxonomicLevel,
        issue: RowIssue,
    },
}

impl LevelOutcome {
    pub fn row(&self) -> Option<&ScoreRow> {
        match self {
            LevelOutcome::Scored(row) | LevelOutcome::Degraded { row, .. } => Some(row),
            LevelOutcome::Failed { .. } => None,
        }
    }

    pub fn issue(&self) -> Option<&RowIssue> {
        match self {
            LevelOutcome::Scored(_) => None,
            LevelOutcome::Degraded { issue, .. } | LevelOutcome::Failed { issue, .. } => {
                Some(issue)
            }
        }
    }

    pub fn level(&self) -> TaxonomicLevel {
        match self {
            LevelOutcome::Scored(row) | LevelOutcome::Degraded { row, .. } => row.taxonomic_level,
            LevelOutcome::Failed { level, .. } => *level,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenomeScores {
    pub genome: String,
    /// One entry per configured level, coarse to fine.
    pub outcomes: Vec<LevelOutcome>,
}

impl GenomeScores {
    pub fn rows(&self) -> impl Iterator<Item = &ScoreRow> {
        self.outcomes.iter().filter_map(LevelOutcome::row)
    }
}

pub fn score_batch(inputs: &[GenomeInput], profile: &ThresholdProfile) -> Vec<GenomeScores> {
    inputs
        .par_iter()
        .map(|input| match input {
            GenomeInput::Ready(genome) => score_genome(genome, profile),
            GenomeInput::Missing { reason, .. } => {
                score_missing(input.id(), 0, 0, 0, reason, profile)
            }
        })
        .collect()
}

pub fn score_genome(genome: &Genome, profile: &ThresholdProfile) -> GenomeScores {
    let n_genes_mapped = genome.n_genes_mapped();
    let n_contigs = genome.n_contigs();

    if let Some(reason) = missing_input_reason(genome, n_genes_mapped, profile) {
        tracing::warn!(genome = %genome.id, "{reason}; emitting zeroed rows");
        return score_missing(
            &genome.id,
            genome.n_genes_called,
            n_genes_mapped,
            n_contigs,
            &reason,
            profile,
        );
    }

    let outcomes = profile
        .levels
        .par_iter()
        .map(|&level| score_level(genome, level, n_genes_mapped, n_contigs, profile))
        .collect::<Vec<_>>();

    GenomeScores {
        genome: genome.id.clone(),
        outcomes,
    }
}

pub fn score_level(
    genome: &Genome,
    level: TaxonomicLevel,
    n_genes_mapped: usize,
    n_contigs: usize,
    profile: &ThresholdProfile,
) -> LevelOutcome {
    let table = match aggregate_clades(genome, level) {
        Ok(table) => table,
        Err(issue) => {
            tracing::warn!(genome = %genome.id, %level, "{issue}");
            return LevelOutcome::Failed {
                genome: genome.id.clone(),
                level,
                issue,
            };
        }
    };

    let retained = filter_major_clades(&table, genome.n_genes_called, profile.abundance);
    let diversity = score_diversity(&retained.counts());
    let separation = score_separation(
        genome,
        &retained,
        SeparationParams {
            min_genes_retained_index: profile.min_genes_retained_index,
            null_model: profile.null_model,
        },
    );
    let identity = score_identity(&retained);

    for clade in &retained.clades {
        tracing::trace!(
            genome = %genome.id,
            level = %table.level,
            clade = clade.label,
            genes = clade.bucket.gene_count(),
            contigs = clade.bucket.contigs.len(),
            identity = clade.bucket.mean_identity(),
            "major clade"
        );
    }
    tracing::debug!(
        genome = %genome.id,
        %level,
        clades = table.n_clades(),
        major = retained.clades.len(),
        retained = retained.n_genes_retained,
        raw_css = separation.raw,
        "scored level"
    );

    LevelOutcome::Scored(compose_row(&Stage6Inputs {
        genome,
        level,
        n_genes_mapped,
        n_contigs,
        retained: &retained,
        diversity,
        separation,
        identity,
        pass_cutoff: profile.pass_cutoff,
    }))
}

fn missing_input_reason(
    genome: &Genome,
    n_genes_mapped: usize,
    profile: &ThresholdProfile,
) -> Option<String> {
    if genome.n_genes_called == 0 {
        Some("no genes called".to_string())
    } else if genome.n_genes_called < profile.min_genes_called {
        Some(format!(
            "only {} genes called (minimum {})",
            genome.n_genes_called, profile.min_genes_called
        ))
    } else if n_genes_mapped > genome.n_genes_called {
        Some(format!(
            "{} genes mapped but only {} called",
            n_genes_mapped, genome.n_genes_called
        ))
    } else {
        None
    }
}

fn score_missing(
    genome: &str,
    n_genes_called: usize,
    n_genes_mapped: usize,
    n_contigs: usize,
    reason: &str,
    profile: &ThresholdProfile,
) -> GenomeScores {
    let outcomes = profile
        .levels
        .iter()
        .map(|&level| LevelOutcome::Degraded {
            row: ScoreRow::zeroed(genome, level, n_genes_called, n_genes_mapped, n_contigs),
            issue: RowIssue::MissingInput(reason.to_string()),
        })
        .collect();
    GenomeScores {
        genome: genome.to_string(),
        outcomes,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
