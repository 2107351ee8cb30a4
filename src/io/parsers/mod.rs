//! Parsing iterators and readers for coverage files and region catalogs.
//!
//! Coverage files are read off disk with a *parsing iterator*,
//! [`CoverageIterator`], which yields one [`CoverageRecord`] per row of a
//! (possibly gzip-compressed) Bismark-style coverage file. Region catalogs are
//! small and are read eagerly by [`read_catalog()`].
//!
//! Under the hood, both use the [`csv`] crate, through [`build_delimited_reader()`].
//!
//! [`CoverageIterator`]: coverage::CoverageIterator
//! [`CoverageRecord`]: crate::coverage::CoverageRecord
//! [`read_catalog()`]: catalog::read_catalog
//! [`build_delimited_reader()`]: tsv::build_delimited_reader

pub mod catalog;
pub mod coverage;
pub mod tsv;
pub mod utils;

pub use catalog::read_catalog;
pub use coverage::CoverageIterator;

/// Parse a single column into type `T`, or return `None` if it is not a valid `T`.
///
/// Surrounding whitespace is ignored.
pub fn parse_column<T: std::str::FromStr>(column: &str) -> Option<T> {
    column.trim().parse::<T>().ok()
}
