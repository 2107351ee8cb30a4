//! Narrowing a [`CoverageTable`] to the regions of a [`RegionCatalog`].
//!

use log::debug;
use serde::Serialize;

use crate::coverage::{CoverageRecord, CoverageTable};
use crate::regions::{GenomicRegion, RegionCatalog};
use crate::traits::GenomicPosition;
use crate::Position;

/// Decimal places of methylation rates in filtered output.
pub const RATE_DECIMALS: i32 = 2;

/// Round `value` to `decimals` decimal places, with ties to even (the way
/// numeric libraries round, so `0.125` becomes `0.12`).
///
/// Rounding is idempotent.
pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// A coverage record narrowed to one region, with that region's name.
///
/// The methylation rate is rounded to [`RATE_DECIMALS`] places and the CpG
/// tag is dropped.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FilteredRecord {
    pub region_name: String,
    pub chromosome: String,
    pub start_loc: Position,
    pub end_loc: Position,
    pub methyl_rate: f64,
    pub methylated_reads: u32,
    pub unmethylated_reads: u32,
    /// Catalog index of the region, so regions sharing a name stay distinct.
    #[serde(skip)]
    pub region_index: usize,
}

impl FilteredRecord {
    pub fn new(record: &CoverageRecord, region: &GenomicRegion, region_index: usize) -> Self {
        Self {
            region_name: region.name.clone(),
            chromosome: record.chromosome.clone(),
            start_loc: record.start_loc,
            end_loc: record.end_loc,
            methyl_rate: round_decimals(record.methyl_rate, RATE_DECIMALS),
            methylated_reads: record.methylated_reads,
            unmethylated_reads: record.unmethylated_reads,
            region_index,
        }
    }
}

impl GenomicPosition for FilteredRecord {
    fn seqname(&self) -> &str {
        &self.chromosome
    }
    fn position(&self) -> Position {
        self.start_loc
    }
}

/// The records of `table` inside `region`, in table order.
///
/// A record is inside if it is on the region's chromosome and its *start*
/// is within `[region.start_loc, region.end_loc]`. No match gives an empty
/// vector. `region_index` is the region's position in its catalog.
pub fn filter_region(
    table: &CoverageTable,
    region: &GenomicRegion,
    region_index: usize,
) -> Vec<FilteredRecord> {
    table
        .records_within(&region.chromosome, region.start_loc, region.end_loc)
        .map(|record| FilteredRecord::new(record, region, region_index))
        .collect()
}

/// [`filter_region()`] for every region of `catalog`, concatenated in catalog order.
pub fn filter_regions(table: &CoverageTable, catalog: &RegionCatalog) -> Vec<FilteredRecord> {
    let mut filtered = Vec::new();
    for (index, region) in catalog.iter().enumerate() {
        let records = filter_region(table, region, index);
        if records.is_empty() {
            debug!("region '{}' has no coverage records", region.name);
        }
        filtered.extend(records);
    }
    filtered
}
