//! Bismark-style coverage file parsing.
//!
//! A coverage file is a headerless TSV with exactly six columns:
//!
//! | column | content                          |
//! |--------|----------------------------------|
//! | 1      | chromosome                       |
//! | 2      | start position (1-based)         |
//! | 3      | end position (1-based)           |
//! | 4      | methylation rate, in percent     |
//! | 5      | methylated read count            |
//! | 6      | unmethylated read count          |
//!

use csv::{StringRecord, StringRecordsIntoIter};
use std::path::PathBuf;
use std::str::FromStr;

use super::parse_column;
use super::tsv::build_delimited_reader;
use crate::coverage::CoverageRecord;
use crate::error::MethCovError;

/// The number of columns in a coverage file.
pub const COVERAGE_COLUMNS: usize = 6;

const COLUMN_NAMES: [&str; COVERAGE_COLUMNS] = [
    "chromosome",
    "start",
    "end",
    "methylation rate",
    "methylated reads",
    "unmethylated reads",
];

/// A parsing iterator over the rows of a coverage file.
///
/// Records are yielded in file order and are *not* yet tagged as CpG sites;
/// see [`CoverageTable`] for that.
///
/// [`CoverageTable`]: crate::coverage::CoverageTable
pub struct CoverageIterator {
    inner: StringRecordsIntoIter<Box<dyn std::io::Read>>,
}

impl std::fmt::Debug for CoverageIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverageIterator").finish_non_exhaustive()
    }
}

impl CoverageIterator {
    /// Create a new parsing iterator over a (possibly gzip-compressed)
    /// coverage file. Lines starting with `'#'` are skipped.
    pub fn new(filepath: impl Into<PathBuf>) -> Result<Self, MethCovError> {
        let reader = build_delimited_reader(filepath, b'\t', false)?;
        Ok(Self {
            inner: reader.into_records(),
        })
    }
}

fn field<T: FromStr>(record: &StringRecord, index: usize, line: u64) -> Result<T, MethCovError> {
    let column = &record[index];
    parse_column(column).ok_or_else(|| MethCovError::InvalidCoverageField {
        line,
        column: COLUMN_NAMES[index],
        message: format!("could not parse '{}'", column),
    })
}

/// Parse one row of a coverage file into a [`CoverageRecord`].
pub fn parse_coverage_record(
    record: &StringRecord,
    line: u64,
) -> Result<CoverageRecord, MethCovError> {
    if record.len() != COVERAGE_COLUMNS {
        return Err(MethCovError::CoverageColumnCount {
            line,
            found: record.len(),
        });
    }
    let chromosome = record[0].trim().to_string();
    if chromosome.is_empty() {
        return Err(MethCovError::InvalidCoverageField {
            line,
            column: COLUMN_NAMES[0],
            message: "empty sequence name".to_string(),
        });
    }
    let methyl_rate: f64 = field(record, 3, line)?;
    if !(0.0..=100.0).contains(&methyl_rate) {
        return Err(MethCovError::InvalidCoverageField {
            line,
            column: COLUMN_NAMES[3],
            message: format!("{} is outside [0, 100]", methyl_rate),
        });
    }
    Ok(CoverageRecord::new(
        chromosome,
        field(record, 1, line)?,
        field(record, 2, line)?,
        methyl_rate,
        field(record, 4, line)?,
        field(record, 5, line)?,
    ))
}

impl Iterator for CoverageIterator {
    type Item = Result<CoverageRecord, MethCovError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        Some(result.map_err(MethCovError::from).and_then(|record| {
            let line = record.position().map_or(0, |pos| pos.line());
            parse_coverage_record(&record, line)
        }))
    }
}
