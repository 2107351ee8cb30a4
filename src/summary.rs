//! Region-span and whole-sample methylation summaries.
//!
//! # 🐌 Performance Note
//!
//! Both summaries loop over their input once, accumulating every statistic
//! at the same time rather than building filtered copies of the table.

use indexmap::IndexMap;
use num_traits::ToPrimitive;
use serde::Serialize;

use crate::config::DepthThresholds;
use crate::coverage::CoverageTable;
use crate::filter::{round_decimals, FilteredRecord, RATE_DECIMALS};
use crate::metadata::SampleMetadata;
use crate::Position;

/// Running arithmetic mean. The mean of nothing is `None`.
#[derive(Clone, Debug, Default)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; values that cannot be represented as `f64` are skipped.
    pub fn push<T: ToPrimitive>(&mut self, value: T) {
        if let Some(value) = value.to_f64() {
            self.sum += value;
            self.count += 1;
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Observed extent and mean methylation of one region's filtered records.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region_name: String,
    pub chromosome: String,
    pub min_loc: Position,
    pub max_loc: Position,
    pub average_methylation_rate: f64,
}

struct RegionAccumulator<'a> {
    region_name: &'a str,
    chromosome: &'a str,
    min_loc: Position,
    max_loc: Position,
    rates: MeanAccumulator,
}

/// Summarize filtered records per region, in order of first appearance.
///
/// Records are grouped by their catalog region (so same-named regions are
/// summarized separately). `min_loc` and `max_loc` are the smallest and
/// largest record starts; the average rate is rounded to two decimals.
/// Regions without records are simply absent.
pub fn summarize_regions(filtered: &[FilteredRecord]) -> Vec<RegionSummary> {
    let mut groups: IndexMap<usize, RegionAccumulator> = IndexMap::new();
    for record in filtered {
        let group = groups
            .entry(record.region_index)
            .or_insert_with(|| RegionAccumulator {
                region_name: &record.region_name,
                chromosome: &record.chromosome,
                min_loc: record.start_loc,
                max_loc: record.start_loc,
                rates: MeanAccumulator::new(),
            });
        group.min_loc = group.min_loc.min(record.start_loc);
        group.max_loc = group.max_loc.max(record.start_loc);
        group.rates.push(record.methyl_rate);
    }

    groups
        .into_values()
        .filter_map(|group| {
            let mean = group.rates.mean()?;
            Some(RegionSummary {
                region_name: group.region_name.to_string(),
                chromosome: group.chromosome.to_string(),
                min_loc: group.min_loc,
                max_loc: group.max_loc,
                average_methylation_rate: round_decimals(mean, RATE_DECIMALS),
            })
        })
        .collect()
}

/// Whole-sample statistics over an unfiltered coverage table.
///
/// Averages are `None` when no record qualifies.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSummary {
    pub num_sites: usize,
    pub average_depth: Option<f64>,
    /// Mean methylation rate over all CpG sites.
    pub average_methylation: Option<f64>,
    /// Mean over CpG sites in the lenient depth view.
    pub average_methylation_depth_ge2: Option<f64>,
    /// Mean over CpG sites in the strict depth view.
    pub average_methylation_depth_ge5: Option<f64>,
}

/// Compute the [`SampleSummary`] of a coverage table.
///
/// Depth means are over every record; methylation means only over records
/// tagged as CpG sites. See [`DepthThresholds`] for the two depth views.
pub fn summarize_sample(table: &CoverageTable, thresholds: &DepthThresholds) -> SampleSummary {
    let mut depth = MeanAccumulator::new();
    let mut all = MeanAccumulator::new();
    let mut lenient = MeanAccumulator::new();
    let mut strict = MeanAccumulator::new();

    for record in table.iter() {
        let site_depth = record.depth();
        depth.push(site_depth);
        if !record.is_cpg_site {
            continue;
        }
        all.push(record.methyl_rate);
        if thresholds.passes_lenient(site_depth) {
            lenient.push(record.methyl_rate);
        }
        if thresholds.passes_strict(site_depth) {
            strict.push(record.methyl_rate);
        }
    }

    SampleSummary {
        num_sites: table.len(),
        average_depth: depth.mean(),
        average_methylation: all.mean(),
        average_methylation_depth_ge2: lenient.mean(),
        average_methylation_depth_ge5: strict.mean(),
    }
}

/// One row of the batch summary table: sample metadata plus its [`SampleSummary`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleSummaryRow {
    pub id: String,
    pub age: String,
    pub tissue: String,
    pub num_sites: usize,
    pub average_depth: Option<f64>,
    pub average_methylation: Option<f64>,
    pub average_methylation_depth_ge2: Option<f64>,
    pub average_methylation_depth_ge5: Option<f64>,
}

impl SampleSummaryRow {
    pub fn new(metadata: SampleMetadata, summary: &SampleSummary) -> Self {
        Self {
            id: metadata.sample_id,
            age: metadata.age,
            tissue: metadata.tissue,
            num_sites: summary.num_sites,
            average_depth: summary.average_depth,
            average_methylation: summary.average_methylation,
            average_methylation_depth_ge2: summary.average_methylation_depth_ge2,
            average_methylation_depth_ge5: summary.average_methylation_depth_ge5,
        }
    }
}
