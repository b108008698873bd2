#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiversityScores {
    pub n_effective_surplus_clades: f64,
    pub contamination_portion: f64,
}

pub fn score_diversity(counts: &[usize]) -> DiversityScores {
    DiversityScores {
        n_effective_surplus_clades: effective_surplus_clades(counts),
        contamination_portion: contamination_portion(counts),
    }
}

/// Inverse Simpson index minus the one clade a clean genome is expected to have.
pub fn effective_surplus_clades(counts: &[usize]) -> f64 {
    let total = counts.iter().sum::<usize>();
    if total == 0 || counts.len() < 2 {
        return 0.0;
    }
    let denom = (total as f64) * (total as f64);
    let simpson = counts
        .iter()
        .map(|&c| (c as f64) * (c as f64) / denom)
        .sum::<f64>();
    (1.0 / simpson - 1.0).max(0.0)
}

/// Share of retained genes outside the most abundant clade.
pub fn contamination_portion(counts: &[usize]) -> f64 {
    let total = counts.iter().sum::<usize>();
    if total == 0 || counts.len() < 2 {
        return 0.0;
    }
    let max = counts.iter().copied().max().unwrap_or(0);
    1.0 - max as f64 / total as f64
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_diversity.rs"]
mod tests;
