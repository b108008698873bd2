use crate::model::genome::Genome;
use crate::model::scores::ScoreRow;
use crate::model::taxonomy::TaxonomicLevel;
use crate::pipeline::stage2_filter::RetainedGenes;
use crate::pipeline::stage3_diversity::DiversityScores;
use crate::pipeline::stage4_separation::SeparationScores;
use crate::pipeline::stage5_identity::IdentityScores;

#[derive(Debug, Clone)]
pub struct Stage6Inputs<'a> {
    pub genome: &'a Genome,
    pub level: TaxonomicLevel,
    pub n_genes_mapped: usize,
    pub n_contigs: usize,
    pub retained: &'a RetainedGenes<'a>,
    pub diversity: DiversityScores,
    pub separation: SeparationScores,
    pub identity: IdentityScores,
    pub pass_cutoff: f64,
}

pub fn compose_row(inputs: &Stage6Inputs<'_>) -> ScoreRow {
    let css = inputs.separation.clade_separation_score;
    ScoreRow {
        genome: inputs.genome.id.clone(),
        n_genes_called: inputs.genome.n_genes_called,
        n_genes_mapped: inputs.n_genes_mapped,
        n_contigs: inputs.n_contigs,
        taxonomic_level: inputs.level,
        proportion_genes_retained_in_major_clades: inputs
            .retained
            .proportion_genes_retained_in_major_clades,
        genes_retained_index: inputs.retained.genes_retained_index,
        clade_separation_score: css,
        contamination_portion: inputs.diversity.contamination_portion,
        n_effective_surplus_clades: inputs.diversity.n_effective_surplus_clades,
        mean_hit_identity: inputs.identity.mean_hit_identity,
        reference_representation_score: inputs.identity.reference_representation_score,
        pass: passes(css, inputs.pass_cutoff),
        null_model: inputs.separation.null_model,
    }
}

/// Strict: a score equal to the cutoff fails.
pub fn passes(clade_separation_score: f64, cutoff: f64) -> bool {
    clade_separation_score > cutoff
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_compose.rs"]
mod tests;
