//! Coverage records and the per-sample [`CoverageTable`].
//!
//! # CpG tagging
//!
//! A record is tagged as a CpG site if the record immediately before or after
//! it (in table order) is on the same chromosome and one base away, i.e. the
//! pair looks like the `C` of each strand of a `CG` dinucleotide. This is a
//! single O(n) pass over adjacent pairs, so it relies on the table being sorted
//! by position within each chromosome. [`CoverageTable::from_path()`] sorts the
//! table first (if asked to) so that it does not have to trust the file order.

use indexmap::IndexMap;
use log::{debug, info};
use std::ops::Range;
use std::path::Path;

use crate::error::MethCovError;
use crate::io::CoverageIterator;
use crate::traits::GenomicPosition;
use crate::Position;

/// One genomic position's methylation observation.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverageRecord {
    pub chromosome: String,
    pub start_loc: Position,
    pub end_loc: Position,
    /// Methylation rate in percent, as written in the coverage file.
    pub methyl_rate: f64,
    pub methylated_reads: u32,
    pub unmethylated_reads: u32,
    /// Derived; not part of the coverage file.
    pub is_cpg_site: bool,
}

impl CoverageRecord {
    /// Create a new record, not (yet) tagged as a CpG site.
    pub fn new(
        chromosome: impl Into<String>,
        start_loc: Position,
        end_loc: Position,
        methyl_rate: f64,
        methylated_reads: u32,
        unmethylated_reads: u32,
    ) -> Self {
        Self {
            chromosome: chromosome.into(),
            start_loc,
            end_loc,
            methyl_rate,
            methylated_reads,
            unmethylated_reads,
            is_cpg_site: false,
        }
    }

    /// Read depth: methylated plus unmethylated reads.
    pub fn depth(&self) -> u64 {
        self.methylated_reads as u64 + self.unmethylated_reads as u64
    }

    /// Whether `next` directly follows this record on the same chromosome.
    fn is_adjacent_to(&self, next: &CoverageRecord) -> bool {
        self.chromosome == next.chromosome && self.start_loc.checked_add(1) == Some(next.start_loc)
    }
}

impl GenomicPosition for CoverageRecord {
    fn seqname(&self) -> &str {
        &self.chromosome
    }
    fn position(&self) -> Position {
        self.start_loc
    }
}

/// Tag records that are part of an adjacent pair as CpG sites.
///
/// Tags are reciprocal: if a record is tagged because of its successor, the
/// successor is tagged because of it. Existing tags are overwritten.
pub fn tag_cpg_sites(records: &mut [CoverageRecord]) {
    for record in records.iter_mut() {
        record.is_cpg_site = false;
    }
    for i in 1..records.len() {
        if records[i - 1].is_adjacent_to(&records[i]) {
            records[i - 1].is_cpg_site = true;
            records[i].is_cpg_site = true;
        }
    }
}

/// Stable sort by (chromosome, start), with chromosomes kept in the order
/// they first appear.
pub fn sort_records(records: &mut [CoverageRecord]) {
    let mut rank: IndexMap<String, usize> = IndexMap::new();
    for record in records.iter() {
        if !rank.contains_key(&record.chromosome) {
            let next = rank.len();
            rank.insert(record.chromosome.clone(), next);
        }
    }
    records.sort_by_key(|record| (rank[&record.chromosome], record.start_loc));
}

/// All coverage records of one sample, in table order and tagged.
///
/// The table also records, for each chromosome, the run of rows it occupies.
/// If every chromosome is one contiguous run sorted by position (which is
/// always the case for a presorted table), region lookups are binary searches.
#[derive(Clone, Debug, Default)]
pub struct CoverageTable {
    records: Vec<CoverageRecord>,
    index: Option<IndexMap<String, Range<usize>>>,
}

impl CoverageTable {
    /// Build a table from records, optionally sorting them first, and tag CpG sites.
    pub fn from_records(mut records: Vec<CoverageRecord>, presort: bool) -> Self {
        if presort {
            sort_records(&mut records);
        }
        tag_cpg_sites(&mut records);
        let index = build_chromosome_index(&records);
        Self { records, index }
    }

    /// Read, (optionally) sort and tag a coverage file.
    ///
    /// # Errors
    ///
    /// Returns [`MethCovError::NotFound`] if the file does not exist, and
    /// a format error if any row does not have exactly six valid columns.
    pub fn from_path(filepath: impl AsRef<Path>, presort: bool) -> Result<Self, MethCovError> {
        let filepath = filepath.as_ref();
        let records = CoverageIterator::new(filepath)?.collect::<Result<Vec<_>, _>>()?;
        let table = Self::from_records(records, presort);
        info!(
            "read {} coverage records ({} CpG sites) from {}",
            table.len(),
            table.num_cpg_sites(),
            filepath.display()
        );
        if !table.is_indexed() {
            debug!(
                "{} is not sorted by position; regions will be found by a linear scan",
                filepath.display()
            );
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CoverageRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CoverageRecord> {
        self.records.iter()
    }

    pub fn num_cpg_sites(&self) -> usize {
        self.records.iter().filter(|r| r.is_cpg_site).count()
    }

    /// Whether region lookups can use the per-chromosome index.
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// The records on `chromosome` with `start <= start_loc <= end`, in table order.
    pub fn records_within<'a>(
        &'a self,
        chromosome: &'a str,
        start: Position,
        end: Position,
    ) -> Box<dyn Iterator<Item = &'a CoverageRecord> + 'a> {
        match &self.index {
            Some(index) => {
                let Some(run) = index.get(chromosome) else {
                    return Box::new(std::iter::empty());
                };
                let rows = &self.records[run.clone()];
                let first = rows.partition_point(|r| r.start_loc < start);
                Box::new(rows[first..].iter().take_while(move |r| r.start_loc <= end))
            }
            None => Box::new(self.records.iter().filter(move |r| {
                r.chromosome == chromosome && start <= r.start_loc && r.start_loc <= end
            })),
        }
    }
}

/// Map each chromosome to its run of rows, or `None` if some chromosome is
/// split over several runs or a run is not sorted by position.
fn build_chromosome_index(records: &[CoverageRecord]) -> Option<IndexMap<String, Range<usize>>> {
    let mut index: IndexMap<String, Range<usize>> = IndexMap::new();
    let mut run_start = 0;
    for i in 1..=records.len() {
        let run_ends = i == records.len() || records[i].chromosome != records[run_start].chromosome;
        if run_ends {
            let chromosome = &records[run_start].chromosome;
            if index.contains_key(chromosome) {
                return None;
            }
            index.insert(chromosome.clone(), run_start..i);
            run_start = i;
        } else if records[i].start_loc < records[i - 1].start_loc {
            return None;
        }
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{random_coverage_records, temp_coverage_file};

    fn record(chrom: &str, start: Position) -> CoverageRecord {
        CoverageRecord::new(chrom, start, start, 50.0, 1, 1)
    }

    #[test]
    fn test_adjacent_pair_tagged() {
        let table = CoverageTable::from_records(
            vec![record("1", 100), record("1", 101), record("1", 105)],
            false,
        );
        let tags: Vec<bool> = table.iter().map(|r| r.is_cpg_site).collect();
        assert_eq!(tags, vec![true, true, false]);
    }

    #[test]
    fn test_single_record_not_tagged() {
        let table = CoverageTable::from_records(vec![record("1", 100)], false);
        assert!(!table.records()[0].is_cpg_site);
    }

    #[test]
    fn test_no_adjacency_across_chromosomes() {
        let table = CoverageTable::from_records(vec![record("1", 100), record("2", 101)], false);
        assert!(table.iter().all(|r| !r.is_cpg_site));
    }

    #[test]
    fn test_unsorted_file_order_without_presort() {
        // 101 then 100 is not "start == next - 1" in file order
        let table = CoverageTable::from_records(vec![record("1", 101), record("1", 100)], false);
        assert!(table.iter().all(|r| !r.is_cpg_site));
        assert!(!table.is_indexed());
    }

    #[test]
    fn test_presort_restores_adjacency() {
        let table = CoverageTable::from_records(
            vec![record("2", 7), record("1", 101), record("2", 6), record("1", 100)],
            true,
        );
        let order: Vec<(&str, Position)> = table
            .iter()
            .map(|r| (r.chromosome.as_str(), r.start_loc))
            .collect();
        // chromosomes stay in first-appearance order
        assert_eq!(order, vec![("2", 6), ("2", 7), ("1", 100), ("1", 101)]);
        assert!(table.iter().all(|r| r.is_cpg_site));
        assert!(table.is_indexed());
    }

    #[test]
    fn test_tagging_is_reciprocal() {
        let mut records = random_coverage_records(5000);
        sort_records(&mut records);
        tag_cpg_sites(&mut records);
        for pair in records.windows(2) {
            if pair[0].is_adjacent_to(&pair[1]) {
                assert!(pair[0].is_cpg_site && pair[1].is_cpg_site);
            }
        }
        for (i, r) in records.iter().enumerate() {
            let left = i > 0 && records[i - 1].is_adjacent_to(r);
            let right = i + 1 < records.len() && r.is_adjacent_to(&records[i + 1]);
            assert_eq!(r.is_cpg_site, left || right);
        }
    }

    #[test]
    fn test_indexed_lookup_matches_linear_scan() {
        let records = random_coverage_records(5000);
        let sorted = CoverageTable::from_records(records.clone(), true);
        assert!(sorted.is_indexed());
        for (chrom, start, end) in [("chr1", 0, 2000), ("chr2", 500, 500), ("chr3", 10, 9000)] {
            let indexed: Vec<_> = sorted.records_within(chrom, start, end).collect();
            let linear: Vec<_> = sorted
                .iter()
                .filter(|r| r.chromosome == chrom && start <= r.start_loc && r.start_loc <= end)
                .collect();
            assert_eq!(indexed, linear);
        }
        assert_eq!(sorted.records_within("chrUn", 0, 10_000).count(), 0);
    }

    #[test]
    fn test_from_path() {
        let file = temp_coverage_file(&[
            ("1", 100, 100, 50.0, 5, 5),
            ("1", 101, 101, 40.0, 2, 3),
            ("1", 105, 105, 0.0, 0, 9),
        ]);
        let table = CoverageTable::from_path(file.path(), true).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.num_cpg_sites(), 2);
        assert_eq!(table.records()[1].depth(), 5);
    }

    #[test]
    fn test_from_path_not_found() {
        let err = CoverageTable::from_path("missing.cov.gz", true).unwrap_err();
        assert!(err.is_not_found());
    }
}
