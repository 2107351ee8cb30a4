//! Named genomic regions and the [`RegionCatalog`] that holds them.
//!

use log::info;
use std::path::Path;

use crate::config::CatalogOptions;
use crate::error::MethCovError;
use crate::io::read_catalog;
use crate::traits::GenericRange;
use crate::Position;

/// A named, inclusive genomic interval of interest (e.g. a CpG island).
#[derive(Clone, Debug, PartialEq)]
pub struct GenomicRegion {
    pub name: String,
    pub chromosome: String,
    pub start_loc: Position,
    pub end_loc: Position,
}

impl GenomicRegion {
    /// Create a new region, checking that `start_loc <= end_loc`.
    pub fn try_new(
        name: impl Into<String>,
        chromosome: impl Into<String>,
        start_loc: Position,
        end_loc: Position,
    ) -> Result<Self, MethCovError> {
        let name = name.into();
        if start_loc > end_loc {
            return Err(MethCovError::InvalidRegion(name, start_loc, end_loc));
        }
        Ok(Self {
            name,
            chromosome: chromosome.into(),
            start_loc,
            end_loc,
        })
    }
}

impl GenericRange for GenomicRegion {
    fn seqname(&self) -> &str {
        &self.chromosome
    }
    fn start(&self) -> Position {
        self.start_loc
    }
    fn end(&self) -> Position {
        self.end_loc
    }
}

/// The regions of interest of a run, in catalog order.
///
/// Names are not deduplicated: two regions with the same name are still two
/// regions.
#[derive(Clone, Debug, Default)]
pub struct RegionCatalog {
    regions: Vec<GenomicRegion>,
}

impl RegionCatalog {
    pub fn new(regions: Vec<GenomicRegion>) -> Self {
        Self { regions }
    }

    /// Load a catalog file with the default [`CatalogOptions`].
    pub fn from_path(filepath: impl AsRef<Path>) -> Result<Self, MethCovError> {
        Self::from_path_with(filepath, &CatalogOptions::default())
    }

    /// Load a catalog file; see [`read_catalog()`] for the accepted layouts.
    pub fn from_path_with(
        filepath: impl AsRef<Path>,
        options: &CatalogOptions,
    ) -> Result<Self, MethCovError> {
        let filepath = filepath.as_ref();
        let regions = read_catalog(filepath, options)?;
        info!("loaded {} regions from {}", regions.len(), filepath.display());
        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GenomicRegion> {
        self.regions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GenomicRegion> {
        self.regions.iter()
    }
}

impl<'a> IntoIterator for &'a RegionCatalog {
    type Item = &'a GenomicRegion;
    type IntoIter = std::slice::Iter<'a, GenomicRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
