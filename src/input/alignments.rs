use std::collections::HashSet;
use std::path::Path;

use crate::input::InputError;
use crate::input::reader::for_each_line;

/// Best hit of one called gene against the reference set.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentHit {
    pub query: String,
    pub reference: String,
    /// Identity in [0, 1].
    pub identity: f64,
}

/// Reads a tabular alignment file: query, reference genome, percent identity, ...
///
/// Only the first hit of each query is kept.
pub fn parse_alignments(path: &Path) -> Result<Vec<AlignmentHit>, InputError> {
    let mut hits = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicates = 0usize;

    for_each_line(path, |line_no, line| {
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let mut fields = line.split('\t');
        let (Some(query), Some(reference), Some(pident)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(InputError::parse(
                path,
                line_no,
                "expected at least 3 tab-separated columns",
            ));
        };
        let pident: f64 = pident.trim().parse().map_err(|_| {
            InputError::parse(path, line_no, format!("invalid percent identity {pident:?}"))
        })?;
        if !(0.0..=100.0).contains(&pident) {
            return Err(InputError::parse(
                path,
                line_no,
                format!("percent identity {pident} outside [0, 100]"),
            ));
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(InputError::parse(path, line_no, "empty query id"));
        }
        if !seen.insert(query.to_string()) {
            duplicates += 1;
            return Ok(());
        }
        hits.push(AlignmentHit {
            query: query.to_string(),
            reference: reference.trim().to_string(),
            identity: pident / 100.0,
        });
        Ok(())
    })?;

    if duplicates > 0 {
        tracing::debug!(
            path = %path.display(),
            duplicates,
            "ignored secondary hits for already aligned genes"
        );
    }
    Ok(hits)
}

/// Gene ids are `<contig>_<n>`; an id without `_` is its own contig.
pub fn contig_of(gene_id: &str) -> &str {
    match gene_id.rsplit_once('_') {
        Some((contig, _)) if !contig.is_empty() => contig,
        _ => gene_id,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/alignments.rs"]
mod tests;
