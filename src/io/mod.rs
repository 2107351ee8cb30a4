//! Types and methods for reading and parsing input and writing output.

pub mod file;
pub mod parsers;

pub use file::{write_csv, InputFile, OutputFile};
pub use parsers::{
    catalog::read_catalog, coverage::CoverageIterator, tsv::build_delimited_reader,
    utils::file_stem_base,
};
