use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::input::InputError;
use crate::input::reader::{for_each_line, is_gz};

/// Record ids of a gene-call FASTA, in file order.
pub fn read_gene_ids(path: &Path) -> Result<Vec<String>, InputError> {
    if is_gz(path) {
        let mut ids = Vec::new();
        for_each_line(path, |_, line| {
            if let Some(header) = line.strip_prefix('>') {
                ids.push(record_id(header).to_string());
            }
            Ok(())
        })?;
        return Ok(ids);
    }

    let file = File::open(path).map_err(|e| {
        InputError::MissingInput(format!("cannot open {}: {e}", path.display()))
    })?;
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    // SAFETY: the file is only read, and gene-call files are not rewritten while scoring.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(scan_headers(&mmap))
}

fn scan_headers(bytes: &[u8]) -> Vec<String> {
    bytes
        .split(|&b| b == b'\n')
        .filter_map(|line| line.strip_prefix(b">"))
        .map(|header| {
            let header = String::from_utf8_lossy(header);
            record_id(header.trim_end_matches('\r')).to_string()
        })
        .collect()
}

fn record_id(header: &str) -> &str {
    header.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/gene_calls.rs"]
mod tests;
