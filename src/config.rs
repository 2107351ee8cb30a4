//! Immutable run configuration, passed explicitly to the [`BatchDriver`].
//!
//! [`BatchDriver`]: crate::batch::BatchDriver

/// Depth thresholds of the whole-sample summary.
///
/// The *lenient* view keeps sites with `min_depth <= depth <= max_depth`; the
/// *strict* view narrows the lenient view further to `depth >= strict_min_depth`.
/// The upper bound therefore applies to both views.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthThresholds {
    pub min_depth: u64,
    pub max_depth: u64,
    pub strict_min_depth: u64,
}

impl Default for DepthThresholds {
    fn default() -> Self {
        Self {
            min_depth: 2,
            max_depth: 100,
            strict_min_depth: 5,
        }
    }
}

impl DepthThresholds {
    /// Whether a site of this depth is in the lenient (≥ `min_depth`) view.
    pub fn passes_lenient(&self, depth: u64) -> bool {
        self.min_depth <= depth && depth <= self.max_depth
    }

    /// Whether a site of this depth is in the strict (≥ `strict_min_depth`) view.
    /// Implies [`DepthThresholds::passes_lenient()`].
    pub fn passes_strict(&self, depth: u64) -> bool {
        self.passes_lenient(depth) && depth >= self.strict_min_depth
    }
}

/// Options for reading a region catalog.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogOptions {
    /// Turn `chr1` into `1`, for catalogs from UCSC-style references.
    pub strip_chr_prefix: bool,
}

/// Configuration of a batch run.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub thresholds: DepthThresholds,
    /// Sort each coverage table by (chromosome, position) before tagging CpG sites.
    pub presort: bool,
    /// Worker threads; `None` uses every available core.
    pub threads: Option<usize>,
    /// If not empty, only samples of these tissues are processed.
    pub tissues: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            thresholds: DepthThresholds::default(),
            presort: true,
            threads: None,
            tissues: Vec::new(),
        }
    }
}

impl BatchConfig {
    /// Whether samples of `tissue` should be processed.
    pub fn accepts_tissue(&self, tissue: &str) -> bool {
        self.tissues.is_empty() || self.tissues.iter().any(|t| t == tissue)
    }
}
