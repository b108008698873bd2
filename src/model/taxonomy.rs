use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomicLevel {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    #[serde(alias = "specI")]
    Species,
}

impl TaxonomicLevel {
    pub const COUNT: usize = 7;

    pub const ALL: [TaxonomicLevel; Self::COUNT] = [
        TaxonomicLevel::Kingdom,
        TaxonomicLevel::Phylum,
        TaxonomicLevel::Class,
        TaxonomicLevel::Order,
        TaxonomicLevel::Family,
        TaxonomicLevel::Genus,
        TaxonomicLevel::Species,
    ];

    /// Kingdom through genus; species is opt-in.
    pub fn default_levels() -> Vec<TaxonomicLevel> {
        Self::ALL[..6].to_vec()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TaxonomicLevel::Kingdom => "kingdom",
            TaxonomicLevel::Phylum => "phylum",
            TaxonomicLevel::Class => "class",
            TaxonomicLevel::Order => "order",
            TaxonomicLevel::Family => "family",
            TaxonomicLevel::Genus => "genus",
            TaxonomicLevel::Species => "species",
        }
    }

    pub fn parent(self) -> Option<TaxonomicLevel> {
        match self.index() {
            0 => None,
            i => Some(Self::ALL[i - 1]),
        }
    }
}

impl fmt::Display for TaxonomicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaxonomicLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kingdom" | "domain" | "superkingdom" => Ok(TaxonomicLevel::Kingdom),
            "phylum" => Ok(TaxonomicLevel::Phylum),
            "class" => Ok(TaxonomicLevel::Class),
            "order" => Ok(TaxonomicLevel::Order),
            "family" => Ok(TaxonomicLevel::Family),
            "genus" => Ok(TaxonomicLevel::Genus),
            "species" | "speci" => Ok(TaxonomicLevel::Species),
            other => Err(format!("unknown taxonomic level: {other}")),
        }
    }
}

/// One optional clade label per level, coarse to fine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lineage {
    labels: [Option<String>; TaxonomicLevel::COUNT],
}

impl Lineage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, level: TaxonomicLevel, label: impl Into<String>) {
        self.labels[level.index()] = Some(label.into());
    }

    pub fn label(&self, level: TaxonomicLevel) -> Option<&str> {
        self.labels[level.index()].as_deref()
    }

    /// Coarsest level without a label while `level` itself has one.
    pub fn first_gap_above(&self, level: TaxonomicLevel) -> Option<TaxonomicLevel> {
        TaxonomicLevel::ALL[..level.index()]
            .iter()
            .copied()
            .find(|l| self.labels[l.index()].is_none())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/taxonomy.rs"]
mod tests;
