use crate::pipeline::stage2_filter::RetainedGenes;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentityScores {
    pub mean_hit_identity: f64,
    pub reference_representation_score: f64,
}

pub fn score_identity(retained: &RetainedGenes<'_>) -> IdentityScores {
    let mean_hit_identity = mean_hit_identity(retained);
    IdentityScores {
        mean_hit_identity,
        reference_representation_score: retained.genes_retained_index * mean_hit_identity,
    }
}

/// Mean alignment identity over genes of major clades only.
pub fn mean_hit_identity(retained: &RetainedGenes<'_>) -> f64 {
    if retained.n_genes_retained == 0 {
        return 0.0;
    }
    let sum = retained
        .clades
        .iter()
        .map(|c| c.bucket.identity_sum)
        .sum::<f64>();
    sum / retained.n_genes_retained as f64
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_identity.rs"]
mod tests;
