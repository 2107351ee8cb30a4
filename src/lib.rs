//! # methcov
//!
//! Region-restricted methylation summaries of bisulfite coverage files.
//!
//! A run reads each sample's coverage file into a [`CoverageTable`], tags
//! positions that are part of a CpG dinucleotide, narrows the table to every
//! region of a [`RegionCatalog`], and aggregates both per-region and
//! whole-sample (depth-thresholded) methylation statistics. The
//! [`BatchDriver`] does this for a whole directory of samples.
//!
//! ```no_run
//! use methcov::prelude::*;
//!
//! # fn main() -> Result<(), MethCovError> {
//! let catalog = RegionCatalog::from_path("cpg_islands.csv")?;
//! let table = CoverageTable::from_path("GSM001_M04_1wk_Liver.cov.txt.gz", true)?;
//!
//! let filtered = filter_regions(&table, &catalog);
//! let per_region = summarize_regions(&filtered);
//! let whole_sample = summarize_sample(&table, &DepthThresholds::default());
//! # Ok(())
//! # }
//! ```
//!
//! [`CoverageTable`]: crate::coverage::CoverageTable
//! [`RegionCatalog`]: crate::regions::RegionCatalog
//! [`BatchDriver`]: crate::batch::BatchDriver

pub mod batch;
pub mod config;
pub mod coverage;
pub mod error;
pub mod filter;
pub mod io;
pub mod metadata;
pub mod regions;
pub mod reporting;
pub mod summary;
pub mod test_utilities;
pub mod traits;

/// Genomic coordinate type (1-based, as written by the coverage format).
pub type Position = u32;

pub mod prelude {
    pub use crate::batch::{BatchDriver, BatchFailure, BatchOutcome, SampleOutput};
    pub use crate::config::{BatchConfig, CatalogOptions, DepthThresholds};
    pub use crate::coverage::{CoverageRecord, CoverageTable};
    pub use crate::error::MethCovError;
    pub use crate::filter::{filter_region, filter_regions, round_decimals, FilteredRecord};
    pub use crate::io::{write_csv, CoverageIterator, InputFile, OutputFile};
    pub use crate::metadata::SampleMetadata;
    pub use crate::regions::{GenomicRegion, RegionCatalog};
    pub use crate::reporting::{CommandOutput, Report};
    pub use crate::summary::{
        summarize_regions, summarize_sample, RegionSummary, SampleSummary, SampleSummaryRow,
    };
    pub use crate::traits::{GenericRange, GenomicPosition};
    pub use crate::Position;
}
