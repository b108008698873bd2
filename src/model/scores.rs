use serde::Serialize;

use crate::model::taxonomy::TaxonomicLevel;

/// Expected separation under random clade placement, with the score it gates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NullModelScores {
    pub mean_random_clade_separation_score: f64,
    pub clade_separation_score_adjusted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub genome: String,
    pub n_genes_called: usize,
    pub n_genes_mapped: usize,
    pub n_contigs: usize,
    pub taxonomic_level: TaxonomicLevel,
    pub proportion_genes_retained_in_major_clades: f64,
    pub genes_retained_index: f64,
    pub clade_separation_score: f64,
    pub contamination_portion: f64,
    pub n_effective_surplus_clades: f64,
    pub mean_hit_identity: f64,
    pub reference_representation_score: f64,
    #[serde(rename = "pass.GUNC")]
    pub pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_model: Option<NullModelScores>,
}

impl ScoreRow {
    pub fn zeroed(
        genome: &str,
        level: TaxonomicLevel,
        n_genes_called: usize,
        n_genes_mapped: usize,
        n_contigs: usize,
    ) -> Self {
        Self {
            genome: genome.to_string(),
            n_genes_called,
            n_genes_mapped,
            n_contigs,
            taxonomic_level: level,
            proportion_genes_retained_in_major_clades: 0.0,
            genes_retained_index: 0.0,
            clade_separation_score: 0.0,
            contamination_portion: 0.0,
            n_effective_surplus_clades: 0.0,
            mean_hit_identity: 0.0,
            reference_representation_score: 0.0,
            pass: false,
            null_model: None,
        }
    }
}
