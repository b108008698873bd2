use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::taxonomy::TaxonomicLevel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum AbundanceCutoff {
    /// Clade is major when `gene_count / n_genes_mapped > fraction`.
    Fraction(f64),
    /// Clade is major when `gene_count > genes`.
    GeneCount(u32),
}

impl AbundanceCutoff {
    pub fn is_major(self, gene_count: usize, n_genes_mapped: usize) -> bool {
        match self {
            AbundanceCutoff::Fraction(theta) => {
                n_genes_mapped > 0 && gene_count as f64 / n_genes_mapped as f64 > theta
            }
            AbundanceCutoff::GeneCount(min) => gene_count > min as usize,
        }
    }

    pub fn describe(self) -> String {
        match self {
            AbundanceCutoff::Fraction(theta) => format!("fraction>{theta}"),
            AbundanceCutoff::GeneCount(n) => format!("genes>{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdProfile {
    pub abundance: AbundanceCutoff,
    pub min_genes_retained_index: f64,
    pub pass_cutoff: f64,
    pub levels: Vec<TaxonomicLevel>,
    pub min_genes_called: usize,
    pub null_model: bool,
}

impl Default for ThresholdProfile {
    fn default() -> Self {
        Self::default_v1()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must lie in [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("no taxonomic levels configured")]
    EmptyLevelSet,
    #[error("taxonomic level {0} listed more than once")]
    DuplicateLevel(TaxonomicLevel),
}

impl ThresholdProfile {
    pub fn default_v1() -> Self {
        Self {
            abundance: AbundanceCutoff::Fraction(0.02),
            min_genes_retained_index: 0.4,
            pass_cutoff: 0.45,
            levels: TaxonomicLevel::default_levels(),
            min_genes_called: 10,
            null_model: false,
        }
    }

    /// Absolute clade cutoff of ten genes, for small or fragmented inputs.
    pub fn sensitive_v1() -> Self {
        let mut base = Self::default_v1();
        base.abundance = AbundanceCutoff::GeneCount(10);
        base
    }

    pub fn with_species(mut self) -> Self {
        if !self.levels.contains(&TaxonomicLevel::Species) {
            self.levels.push(TaxonomicLevel::Species);
        }
        self
    }

    /// Checks ranges and puts levels in coarse-to-fine order.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if let AbundanceCutoff::Fraction(theta) = self.abundance {
            check_unit("abundance threshold", theta)?;
        }
        check_unit("min_genes_retained_index", self.min_genes_retained_index)?;
        check_unit("pass_cutoff", self.pass_cutoff)?;
        if self.levels.is_empty() {
            return Err(ConfigError::EmptyLevelSet);
        }
        self.levels.sort();
        if let Some(w) = self.levels.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigError::DuplicateLevel(w[0]));
        }
        Ok(self)
    }
}

fn check_unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange { name, value })
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/thresholds.rs"]
mod tests;
