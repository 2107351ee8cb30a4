//! Test cases and test utility functions.
//!

use flate2::write::GzEncoder;
use flate2::Compression;
use rand::{thread_rng, Rng};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

use crate::{coverage::CoverageRecord, regions::GenomicRegion, Position};

// Stochastic test data defaults
//
// Positions are drawn from a small window so that random regions overlap
// plenty of random records.
pub const MAX_POSITION: Position = 10_000;
pub const MAX_REGION_LEN: Position = 1_000;
pub const MAX_DEPTH: u32 = 120;

// number of chromosome sequences
pub const NCHROM: usize = 3;

/// One coverage row: chromosome, start, end, methylation rate, methylated and
/// unmethylated reads.
pub type CoverageRow<'a> = (&'a str, Position, Position, f64, u32, u32);

/// Format a coverage row the way it appears in a coverage file.
pub fn coverage_line(row: &CoverageRow) -> String {
    let (chrom, start, end, rate, methylated, unmethylated) = row;
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        chrom, start, end, rate, methylated, unmethylated
    )
}

/// Write a gzip-compressed coverage file at `path`.
pub fn write_coverage_file(path: impl AsRef<Path>, rows: &[CoverageRow]) {
    let file = File::create(path.as_ref()).expect("could not create coverage file");
    let mut encoder = GzEncoder::new(file, Compression::default());
    for row in rows {
        writeln!(encoder, "{}", coverage_line(row)).expect("could not write coverage row");
    }
    encoder.finish().expect("could not finish gzip stream");
}

/// Build a temporary gzip-compressed coverage file.
pub fn temp_coverage_file(rows: &[CoverageRow]) -> NamedTempFile {
    let file = Builder::new()
        .suffix(".cov.gz")
        .tempfile()
        .expect("could not create temporary file");
    write_coverage_file(file.path(), rows);
    file
}

/// Build a temporary coverage file of concatenated gzip members, one per
/// slice of rows (as `cat a.gz b.gz` or bgzip would produce).
pub fn temp_multi_member_coverage_file(members: &[&[CoverageRow]]) -> NamedTempFile {
    let mut file = Builder::new()
        .suffix(".cov.gz")
        .tempfile()
        .expect("could not create temporary file");
    for rows in members {
        let mut encoder = GzEncoder::new(file.as_file_mut(), Compression::default());
        for row in rows.iter() {
            writeln!(encoder, "{}", coverage_line(row)).expect("could not write coverage row");
        }
        encoder.finish().expect("could not finish gzip member");
    }
    file
}

/// Build a temporary plaintext file with `contents`.
pub fn temp_text_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("could not create temporary file");
    file.write_all(contents.as_bytes())
        .expect("could not write temporary file");
    file
}

/// Sample a random chromosome
pub fn random_chrom() -> String {
    let mut rng = thread_rng();
    format!("chr{}", rng.gen_range(1..NCHROM + 1))
}

/// Build `n` random (unsorted) coverage records, where about half of the
/// sampled positions also get a record at the next base.
pub fn random_coverage_records(n: usize) -> Vec<CoverageRecord> {
    let mut rng = thread_rng();
    let mut records = Vec::with_capacity(n);
    while records.len() < n {
        let chrom = random_chrom();
        let start = rng.gen_range(1..MAX_POSITION);
        let paired = rng.gen_bool(0.5);
        let positions = if paired { vec![start, start + 1] } else { vec![start] };
        for pos in positions {
            let methylated = rng.gen_range(0..=MAX_DEPTH);
            let unmethylated = rng.gen_range(0..=MAX_DEPTH);
            let rate = rng.gen_range(0.0..=100.0);
            records.push(CoverageRecord::new(
                chrom.clone(),
                pos,
                pos,
                rate,
                methylated,
                unmethylated,
            ));
        }
    }
    records.truncate(n);
    records
}

/// Build `n` random regions with unique names.
pub fn random_regions(n: usize) -> Vec<GenomicRegion> {
    let mut rng = thread_rng();
    (0..n)
        .map(|i| {
            let start = rng.gen_range(1..MAX_POSITION);
            let end = start + rng.gen_range(0..MAX_REGION_LEN);
            GenomicRegion::try_new(format!("region{}", i), random_chrom(), start, end)
                .expect("random region is valid")
        })
        .collect()
}
