use thiserror::Error;

use crate::model::taxonomy::TaxonomicLevel;

/// Per-genome or per-level problem that is reported next to the scored rows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowIssue {
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("lineage inconsistency at {level} (gene {gene}): {detail}")]
    LineageInconsistency {
        level: TaxonomicLevel,
        gene: String,
        detail: String,
    },
}

impl RowIssue {
    pub fn kind(&self) -> &'static str {
        match self {
            RowIssue::MissingInput(_) => "MissingInput",
            RowIssue::LineageInconsistency { .. } => "LineageInconsistency",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            RowIssue::MissingInput(reason) => reason.clone(),
            RowIssue::LineageInconsistency { gene, detail, .. } => {
                format!("gene {gene}: {detail}")
            }
        }
    }
}
