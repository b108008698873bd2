//! Clade separation score (CSS).
//!
//! CSS is the completeness of the clade labelling of retained genes with
//! respect to their contigs: `I(contig; clade) / H(clade)`. It is 1 when every
//! contig carries a single clade and drops towards 0 as contigs mix clades.

use std::collections::BTreeMap;

use crate::model::genome::Genome;
use crate::model::scores::NullModelScores;
use crate::pipeline::stage2_filter::RetainedGenes;

/// Contigs up to this size use the exact binomial entropy estimate.
const MAX_EXACT_BUCKET_SIZE: usize = 500;
const ADJUSTMENT_MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparationScores {
    /// Score before the retained-index override.
    pub raw: f64,
    pub clade_separation_score: f64,
    pub null_model: Option<NullModelScores>,
}

#[derive(Debug, Clone, Copy)]
pub struct SeparationParams {
    pub min_genes_retained_index: f64,
    pub null_model: bool,
}

pub fn score_separation(
    genome: &Genome,
    retained: &RetainedGenes<'_>,
    params: SeparationParams,
) -> SeparationScores {
    let pairs = retained
        .gene_clades()
        .map(|(gene, clade)| (genome.genes[gene].contig, clade))
        .collect::<Vec<_>>();

    let raw = clade_separation_score(&pairs);
    let trusted = retained.genes_retained_index >= params.min_genes_retained_index;
    let css = if trusted { raw } else { 0.0 };

    let null_model = params.null_model.then(|| {
        let expected = expected_clade_separation_score(&pairs);
        let adjusted = if css > expected + ADJUSTMENT_MARGIN
            && retained.genes_retained_index > params.min_genes_retained_index
        {
            css
        } else {
            0.0
        };
        NullModelScores {
            mean_random_clade_separation_score: expected,
            clade_separation_score_adjusted: adjusted,
        }
    });

    SeparationScores {
        raw,
        clade_separation_score: css,
        null_model,
    }
}

/// `pairs` holds one `(contig, clade)` entry per retained gene.
pub fn clade_separation_score(pairs: &[(usize, usize)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let n = pairs.len() as f64;

    let mut joint: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    let mut contig_totals: BTreeMap<usize, usize> = BTreeMap::new();
    let mut clade_totals: BTreeMap<usize, usize> = BTreeMap::new();
    for &(contig, clade) in pairs {
        *joint.entry((contig, clade)).or_insert(0) += 1;
        *contig_totals.entry(contig).or_insert(0) += 1;
        *clade_totals.entry(clade).or_insert(0) += 1;
    }

    let clade_entropy = entropy(clade_totals.values().copied());
    if clade_entropy == 0.0 {
        return 1.0;
    }

    let ln_n = n.ln();
    let mut mutual_information = 0.0;
    for (&(contig, clade), &count) in &joint {
        let a = contig_totals[&contig] as f64;
        let b = clade_totals[&clade] as f64;
        let c = count as f64;
        mutual_information += (c / n) * (c.ln() + ln_n - a.ln() - b.ln());
    }

    (mutual_information / clade_entropy).clamp(0.0, 1.0)
}

/// Expected CSS when clades are drawn at random onto contigs of the observed sizes.
pub fn expected_clade_separation_score(pairs: &[(usize, usize)]) -> f64 {
    let mut contig_sizes: BTreeMap<usize, usize> = BTreeMap::new();
    let mut clade_totals: BTreeMap<usize, usize> = BTreeMap::new();
    for &(contig, clade) in pairs {
        *contig_sizes.entry(contig).or_insert(0) += 1;
        *clade_totals.entry(clade).or_insert(0) += 1;
    }

    let clade_entropy = entropy(clade_totals.values().copied());
    if clade_entropy == 0.0 {
        return 0.0;
    }

    // bucket size -> number of contigs of that size
    let mut buckets: BTreeMap<usize, usize> = BTreeMap::new();
    for &size in contig_sizes.values() {
        *buckets.entry(size).or_insert(0) += 1;
    }

    let total = pairs.len() as f64;
    let probabilities = clade_totals
        .values()
        .map(|&c| c as f64 / total)
        .collect::<Vec<_>>();

    let mut expected_entropy = 0.0;
    for (&size, &n_contigs) in &buckets {
        let weight = (size * n_contigs) as f64 / total;
        let bucket_entropy = if size <= MAX_EXACT_BUCKET_SIZE {
            expected_entropy_estimate(&probabilities, size)
        } else {
            clade_entropy
        };
        expected_entropy += weight * bucket_entropy;
    }

    1.0 - expected_entropy / clade_entropy
}

/// Expected plug-in entropy of `sample_count` draws from `probabilities`.
pub fn expected_entropy_estimate(probabilities: &[f64], sample_count: usize) -> f64 {
    if sample_count < 2 {
        return 0.0;
    }
    let n = sample_count as f64;
    let ln_n = n.ln();
    let mut entropy = 0.0;
    for &p in probabilities {
        if p <= 0.0 || p >= 1.0 {
            continue;
        }
        let ln_p = p.ln();
        let ln_q = (1.0 - p).ln();
        let mut ln_binom = 0.0;
        for k in 1..sample_count {
            let kf = k as f64;
            ln_binom += (n - kf + 1.0).ln() - kf.ln();
            let ln_mass = ln_binom + kf * ln_p + (n - kf) * ln_q;
            entropy += ln_mass.exp() * kf * (kf.ln() - ln_n);
        }
    }
    -entropy / n
}

fn entropy(counts: impl Iterator<Item = usize> + Clone) -> f64 {
    let total = counts.clone().sum::<usize>() as f64;
    if total == 0.0 {
        return 0.0;
    }
    let ln_total = total.ln();
    let h = counts
        .filter(|&c| c > 0)
        .map(|c| {
            let c = c as f64;
            -(c / total) * (c.ln() - ln_total)
        })
        .sum::<f64>();
    if h.abs() < 1e-15 { 0.0 } else { h }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_separation.rs"]
mod tests;
