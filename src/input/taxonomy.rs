use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::input::InputError;
use crate::input::reader::for_each_line;
use crate::model::taxonomy::{Lineage, TaxonomicLevel};

/// Reference genome id -> lineage.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTable {
    pub lineages: HashMap<String, Arc<Lineage>>,
    /// Levels that have a column in the table.
    pub levels: Vec<TaxonomicLevel>,
}

impl TaxonomyTable {
    pub fn get(&self, reference: &str) -> Option<&Arc<Lineage>> {
        self.lineages.get(reference)
    }

    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }
}

/// Header-driven TSV: a `genome` column plus one column per taxonomic level.
pub fn parse_taxonomy(path: &Path) -> Result<TaxonomyTable, InputError> {
    let mut genome_col: Option<usize> = None;
    let mut level_cols: Vec<(usize, TaxonomicLevel)> = Vec::new();
    let mut table = TaxonomyTable::default();
    let mut duplicates = 0usize;

    for_each_line(path, |line_no, line| {
        if line.trim().is_empty() {
            return Ok(());
        }
        let fields = line.split('\t').map(str::trim).collect::<Vec<_>>();

        let Some(key_col) = genome_col else {
            for (idx, name) in fields.iter().enumerate() {
                if name.eq_ignore_ascii_case("genome") {
                    genome_col = Some(idx);
                } else if let Ok(level) = name.parse::<TaxonomicLevel>() {
                    if level_cols.iter().any(|&(_, l)| l == level) {
                        return Err(InputError::parse(
                            path,
                            line_no,
                            format!("more than one column for level {level}"),
                        ));
                    }
                    level_cols.push((idx, level));
                }
            }
            if genome_col.is_none() {
                return Err(InputError::parse(path, line_no, "header has no genome column"));
            }
            table.levels = level_cols.iter().map(|&(_, level)| level).collect();
            table.levels.sort();
            return Ok(());
        };

        let Some(genome) = fields.get(key_col).filter(|g| !g.is_empty()) else {
            return Err(InputError::parse(path, line_no, "empty genome id"));
        };
        if table.lineages.contains_key(*genome) {
            duplicates += 1;
            return Ok(());
        }
        let mut lineage = Lineage::new();
        for &(idx, level) in &level_cols {
            if let Some(label) = fields.get(idx).copied().filter(|v| !is_missing_label(v)) {
                lineage.set(level, label);
            }
        }
        table.lineages.insert(genome.to_string(), Arc::new(lineage));
        Ok(())
    })?;

    if genome_col.is_none() {
        return Err(InputError::InvalidInput(format!(
            "taxonomy table {} is empty",
            path.display()
        )));
    }
    if table.is_empty() {
        tracing::warn!(path = %path.display(), "taxonomy table lists no reference genomes");
    }
    if duplicates > 0 {
        tracing::warn!(
            path = %path.display(),
            duplicates,
            "duplicate reference genomes in taxonomy; keeping first"
        );
    }
    tracing::info!(
        path = %path.display(),
        references = table.len(),
        levels = table.levels.len(),
        "loaded reference taxonomy"
    );
    Ok(table)
}

fn is_missing_label(value: &str) -> bool {
    value.is_empty()
        || value == "-"
        || value.eq_ignore_ascii_case("na")
        || value.eq_ignore_ascii_case("nan")
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/taxonomy.rs"]
mod tests;
