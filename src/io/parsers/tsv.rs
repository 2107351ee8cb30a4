//! Essential delimited-file parsing functionality, which wraps the [`csv`] crate.

use csv::{Reader, ReaderBuilder};
use std::path::PathBuf;

use crate::error::MethCovError;
use crate::io::file::InputFile;

/// Build a delimited reader which works on plaintext or gzip-compressed files.
///
/// Headerless files skip comment lines starting with `'#'`, a pseudo-standard
/// for metadata. Files with a header do not, since some header rows
/// (e.g. UCSC tables, `#bin\tchrom\t...`) themselves start with `'#'`.
///
/// Rows are allowed to have differing numbers of fields; callers validate
/// the column count themselves so they can report a useful error.
pub fn build_delimited_reader(
    filepath: impl Into<PathBuf>,
    delimiter: u8,
    has_headers: bool,
) -> Result<Reader<Box<dyn std::io::Read>>, MethCovError> {
    let stream = InputFile::new(filepath).stream()?;
    let comment = if has_headers { None } else { Some(b'#') };
    let reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_headers)
        .comment(comment)
        .flexible(true)
        .from_reader(stream);
    Ok(reader)
}
