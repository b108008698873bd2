use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::input::InputError;

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path).map_err(|e| {
        InputError::MissingInput(format!("cannot open {}: {e}", path.display()))
    })?;
    if is_gz(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn is_gz(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Calls `f` with each line (trailing newline removed) and its 1-based number.
pub fn for_each_line<F>(path: &Path, mut f: F) -> Result<(), InputError>
where
    F: FnMut(usize, &str) -> Result<(), InputError>,
{
    let mut reader = open_maybe_gz(path)?;
    let mut buf = String::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        f(line_no, buf.trim_end_matches(['\n', '\r']))?;
    }
    Ok(())
}
