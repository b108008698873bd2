use std::path::{Path, PathBuf};

use crate::input::reader::for_each_line;
use crate::input::{GeneCalls, GenomeSource, InputError};

/// Reads `genome<TAB>alignments<TAB>gene_calls` lines.
///
/// `gene_calls` is either a FASTA path or a plain gene count. Relative paths
/// resolve against the manifest's directory. A leading `genome` header is skipped.
pub fn parse_manifest(path: &Path) -> Result<Vec<GenomeSource>, InputError> {
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut sources = Vec::new();
    let mut first_record = true;

    for_each_line(path, |line_no, line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let fields = line.split('\t').map(str::trim).collect::<Vec<_>>();
        let is_header = first_record && fields[0].eq_ignore_ascii_case("genome");
        first_record = false;
        if is_header {
            return Ok(());
        }
        let [genome, alignments, gene_calls] = fields[..] else {
            return Err(InputError::parse(
                path,
                line_no,
                format!("expected 3 columns, found {}", fields.len()),
            ));
        };
        if genome.is_empty() {
            return Err(InputError::parse(path, line_no, "empty genome id"));
        }
        let gene_calls = match gene_calls.parse::<usize>() {
            Ok(count) => GeneCalls::Count(count),
            Err(_) => GeneCalls::Fasta(resolve(base, gene_calls)),
        };
        sources.push(GenomeSource {
            id: genome.to_string(),
            alignments: resolve(base, alignments),
            gene_calls,
        });
        Ok(())
    })?;

    if sources.is_empty() {
        return Err(InputError::InvalidInput(format!(
            "manifest {} lists no genomes",
            path.display()
        )));
    }
    Ok(sources)
}

fn resolve(base: &Path, value: &str) -> PathBuf {
    let p = PathBuf::from(value);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/manifest.rs"]
mod tests;
