pub mod json;
pub mod text;

use serde::Serialize;

use crate::model::taxonomy::TaxonomicLevel;
use crate::model::thresholds::ThresholdProfile;

#[derive(Debug, Clone, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
    pub git_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenomeSummary {
    pub genome: String,
    pub levels_scored: usize,
    pub failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_input: Option<String>,
    pub max_css_level: Option<TaxonomicLevel>,
    pub max_css: f64,
    pub pass_all_levels: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelSummary {
    pub level: TaxonomicLevel,
    pub n_rows: usize,
    pub n_failed: usize,
    pub css_median: f64,
    pub css_p90: f64,
    pub contamination_median: f64,
    pub genes_retained_index_median: f64,
    pub pass_fraction: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub tool: ToolMeta,
    pub config: ThresholdProfile,
    pub n_genomes: usize,
    pub n_rows: usize,
    pub n_failures: usize,
    pub levels: Vec<LevelSummary>,
    pub genomes: Vec<GenomeSummary>,
}

pub fn format_f64_6(v: f64) -> String {
    format!("{:.6}", v)
}

pub fn format_bool(v: bool) -> &'static str {
    if v { "True" } else { "False" }
}

pub fn quantile_indexed(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let idx = ((n - 1) as f64 * p).ceil() as usize;
    sorted[idx]
}

pub fn median(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.5)
}

pub fn p90(values: &[f64]) -> f64 {
    quantile_indexed(values, 0.90)
}

pub fn bool_fraction(values: &[bool]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| v).count() as f64 / values.len() as f64
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
