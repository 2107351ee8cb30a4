//! The [`BatchDriver`]: every sample of a directory against every region of a catalog.
//!
//! Each sample is an independent unit of work, processed on a [`rayon`] thread
//! pool. A sample that fails (malformed file name, missing or corrupt file, or
//! an error from the caller's sink) is recorded as a [`BatchFailure`] and the
//! batch carries on with the next one.

use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BatchConfig;
use crate::coverage::CoverageTable;
use crate::error::MethCovError;
use crate::filter::{filter_regions, FilteredRecord};
use crate::io::file_stem_base;
use crate::metadata::SampleMetadata;
use crate::regions::RegionCatalog;
use crate::reporting::{CommandOutput, Report};
use crate::summary::{
    summarize_regions, summarize_sample, RegionSummary, SampleSummary, SampleSummaryRow,
};

/// Everything computed for one sample.
#[derive(Clone, Debug)]
pub struct SampleOutput {
    /// 1-based position of the sample in the batch.
    pub index: usize,
    pub path: PathBuf,
    pub metadata: SampleMetadata,
    /// Filtered records of every region, concatenated in catalog order.
    pub filtered: Vec<FilteredRecord>,
    pub region_summaries: Vec<RegionSummary>,
    pub summary: SampleSummary,
    /// Number of catalog regions without any coverage record.
    pub empty_regions: usize,
}

impl SampleOutput {
    fn stem(&self) -> String {
        file_stem_base(&self.path).unwrap_or_else(|| self.metadata.sample_id.clone())
    }

    /// File name for the filtered records, `<stem>_<index>.csv`.
    pub fn filtered_filename(&self) -> String {
        format!("{}_{}.csv", self.stem(), self.index)
    }

    /// File name for the region summaries, `<stem>_summary_<index>.csv`.
    pub fn region_summary_filename(&self) -> String {
        format!("{}_summary_{}.csv", self.stem(), self.index)
    }

    pub fn summary_row(&self) -> SampleSummaryRow {
        SampleSummaryRow::new(self.metadata.clone(), &self.summary)
    }
}

/// A unit of work that failed, with enough context to diagnose it.
#[derive(Debug)]
pub struct BatchFailure {
    pub file: PathBuf,
    pub error: MethCovError,
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.error)
    }
}

/// The result of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Summary rows of every successful sample, in batch order.
    pub summaries: Vec<SampleSummaryRow>,
    pub failures: Vec<BatchFailure>,
    /// Samples not processed because their tissue is not in the allow-list.
    pub skipped: Vec<PathBuf>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.summaries.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

enum SampleResult {
    Done(SampleSummaryRow, usize),
    Skipped(PathBuf, String),
    Failed(BatchFailure),
}

/// Runs the whole pipeline for a batch of coverage files.
#[derive(Clone, Debug)]
pub struct BatchDriver {
    config: BatchConfig,
    catalog: RegionCatalog,
}

impl BatchDriver {
    pub fn new(config: BatchConfig, catalog: RegionCatalog) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// The regular files of `dir`, in directory listing order.
    pub fn list_samples(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, MethCovError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MethCovError::NotFound(dir.to_path_buf()),
            _ => MethCovError::IOError(e),
        })?;
        let mut samples = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                samples.push(entry.path());
            } else {
                debug!("skipping non-file entry {}", entry.path().display());
            }
        }
        Ok(samples)
    }

    /// Read, filter and summarize one sample.
    ///
    /// The file name is checked first, so a malformed name fails without
    /// reading the file.
    pub fn process_sample(
        &self,
        path: impl AsRef<Path>,
        index: usize,
    ) -> Result<SampleOutput, MethCovError> {
        let path = path.as_ref();
        let metadata = SampleMetadata::from_path(path)?;
        self.process_sample_with(path, index, metadata)
    }

    /// Read, filter and summarize one sample whose file name has already been
    /// parsed into `metadata`.
    pub fn process_sample_with(
        &self,
        path: impl AsRef<Path>,
        index: usize,
        metadata: SampleMetadata,
    ) -> Result<SampleOutput, MethCovError> {
        let path = path.as_ref();
        let table = CoverageTable::from_path(path, self.config.presort)?;

        let filtered = filter_regions(&table, &self.catalog);
        let region_summaries = summarize_regions(&filtered);
        let summary = summarize_sample(&table, &self.config.thresholds);
        let empty_regions = self.catalog.len() - region_summaries.len();

        Ok(SampleOutput {
            index,
            path: path.to_path_buf(),
            metadata,
            filtered,
            region_summaries,
            summary,
            empty_regions,
        })
    }

    fn run_one<F>(&self, index: usize, path: &Path, sink: &F) -> SampleResult
    where
        F: Fn(&SampleOutput) -> Result<(), MethCovError> + Sync,
    {
        let failed = |error| {
            SampleResult::Failed(BatchFailure {
                file: path.to_path_buf(),
                error,
            })
        };
        let metadata = match SampleMetadata::from_path(path) {
            Ok(metadata) if !self.config.accepts_tissue(&metadata.tissue) => {
                return SampleResult::Skipped(path.to_path_buf(), metadata.tissue)
            }
            Ok(metadata) => metadata,
            Err(e) => return failed(e),
        };
        let output = match self.process_sample_with(path, index, metadata) {
            Ok(output) => output,
            Err(e) => return failed(e),
        };
        if let Err(e) = sink(&output) {
            return failed(e);
        }
        info!(
            "sample {} ({}): {} filtered records in {} regions",
            index,
            output.metadata.sample_id,
            output.filtered.len(),
            output.region_summaries.len()
        );
        SampleResult::Done(output.summary_row(), output.empty_regions)
    }

    /// Process every sample file of `dir`; see [`BatchDriver::run_paths()`].
    ///
    /// # Errors
    ///
    /// Only batch-level problems are errors: `dir` not existing or not being
    /// readable, or the thread pool failing to start.
    pub fn run<F>(
        &self,
        dir: impl AsRef<Path>,
        sink: F,
    ) -> Result<CommandOutput<BatchOutcome>, MethCovError>
    where
        F: Fn(&SampleOutput) -> Result<(), MethCovError> + Sync,
    {
        let samples = Self::list_samples(dir)?;
        self.run_paths(&samples, sink)
    }

    /// Process each coverage file of `paths` in parallel, passing each
    /// [`SampleOutput`] to `sink` (e.g. to write per-sample files).
    ///
    /// Sample `i` of `paths` gets index `i + 1`. The sink is called from
    /// worker threads. Summary rows and failures come back in `paths` order.
    pub fn run_paths<F>(
        &self,
        paths: &[PathBuf],
        sink: F,
    ) -> Result<CommandOutput<BatchOutcome>, MethCovError>
    where
        F: Fn(&SampleOutput) -> Result<(), MethCovError> + Sync,
    {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.threads.unwrap_or(0))
            .build()?;
        info!(
            "processing {} samples against {} regions on {} threads",
            paths.len(),
            self.catalog.len(),
            pool.current_num_threads()
        );

        let results: Vec<SampleResult> = pool.install(|| {
            paths
                .par_iter()
                .enumerate()
                .map(|(i, path)| self.run_one(i + 1, path, &sink))
                .collect()
        });

        let mut outcome = BatchOutcome::default();
        let mut report = Report::new();
        for result in results {
            match result {
                SampleResult::Done(row, empty_regions) => {
                    if empty_regions > 0 {
                        report.add_issue(format!(
                            "{}: {} of {} regions had no coverage records",
                            row.id,
                            empty_regions,
                            self.catalog.len()
                        ));
                    }
                    outcome.summaries.push(row);
                }
                SampleResult::Skipped(path, tissue) => {
                    debug!("skipped {} (tissue '{}')", path.display(), tissue);
                    report.add_issue(format!(
                        "{}: skipped, tissue '{}' is not selected",
                        path.display(),
                        tissue
                    ));
                    outcome.skipped.push(path);
                }
                SampleResult::Failed(failure) => {
                    warn!("{}", failure);
                    report.add_issue(format!("failed: {}", failure));
                    outcome.failures.push(failure);
                }
            }
        }
        info!(
            "batch finished: {} succeeded, {} failed, {} skipped",
            outcome.succeeded(),
            outcome.failed(),
            outcome.skipped.len()
        );
        Ok(CommandOutput::new(outcome, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::GenomicRegion;
    use crate::test_utilities::write_coverage_file;
    use std::sync::Mutex;

    fn catalog() -> RegionCatalog {
        RegionCatalog::new(vec![
            GenomicRegion::try_new("island", "1", 100, 110).unwrap(),
            GenomicRegion::try_new("desert", "2", 1, 1000).unwrap(),
        ])
    }

    #[test]
    fn test_process_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GSM001_M04_1wk_Liver.cov.txt.gz");
        write_coverage_file(
            &path,
            &[
                ("1", 100, 100, 50.0, 5, 5),
                ("1", 101, 101, 70.0, 7, 3),
                ("1", 500, 500, 10.0, 1, 9),
            ],
        );
        let driver = BatchDriver::new(BatchConfig::default(), catalog());
        let output = driver.process_sample(&path, 1).unwrap();
        assert_eq!(output.metadata.sample_id, "GSM001_M04");
        assert_eq!(output.filtered.len(), 2);
        assert_eq!(output.region_summaries.len(), 1);
        assert_eq!(output.region_summaries[0].average_methylation_rate, 60.0);
        assert_eq!(output.empty_regions, 1);
        assert_eq!(output.summary.num_sites, 3);
        assert_eq!(output.filtered_filename(), "GSM001_M04_1wk_Liver_1.csv");
        assert_eq!(
            output.region_summary_filename(),
            "GSM001_M04_1wk_Liver_summary_1.csv"
        );
    }

    #[test]
    fn test_process_sample_with_parsed_metadata() {
        let dir = tempfile::tempdir().unwrap();
        // the coverage file name itself is never parsed again
        let path = dir.path().join("renamed.cov.gz");
        write_coverage_file(&path, &[("1", 100, 100, 50.0, 5, 5)]);
        let metadata = SampleMetadata::from_filename("GSM009_M01_6mo_Kidney.cov.gz").unwrap();
        let driver = BatchDriver::new(BatchConfig::default(), catalog());
        let output = driver.process_sample_with(&path, 2, metadata).unwrap();
        assert_eq!(output.metadata.tissue, "Kidney");
        assert_eq!(output.summary_row().id, "GSM009_M01");
        assert_eq!(output.filtered.len(), 1);

        let err = driver.process_sample(&path, 2).unwrap_err();
        assert!(matches!(err, MethCovError::MalformedFilename(_)));
    }

    #[test]
    fn test_failure_display_names_file() {
        let failure = BatchFailure {
            file: PathBuf::from("data/badname.cov.gz"),
            error: MethCovError::MalformedFilename("badname.cov.gz".to_string()),
        };
        let message = failure.to_string();
        assert!(message.starts_with("data/badname.cov.gz: Malformed sample filename"));
    }

    #[test]
    fn test_failures_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        write_coverage_file(
            dir.path().join("GSM001_M04_1wk_Liver.cov.gz"),
            &[("1", 100, 100, 50.0, 5, 5)],
        );
        write_coverage_file(
            dir.path().join("badname.cov.gz"),
            &[("1", 100, 100, 50.0, 5, 5)],
        );
        std::fs::write(
            dir.path().join("GSM002_M05_4wk_Lung.cov"),
            "1\t100\t100\t50.0\t5\n",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let config = BatchConfig {
            threads: Some(2),
            ..Default::default()
        };
        let driver = BatchDriver::new(config, catalog());
        let seen = Mutex::new(Vec::new());
        let output = driver
            .run(dir.path(), |sample| {
                seen.lock().unwrap().push(sample.metadata.sample_id.clone());
                Ok(())
            })
            .unwrap();
        let (outcome, report) = output.into_parts();

        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(outcome.failed(), 2);
        assert_eq!(outcome.summaries[0].id, "GSM001_M04");
        assert_eq!(seen.into_inner().unwrap(), vec!["GSM001_M04".to_string()]);
        assert!(outcome
            .failures
            .iter()
            .any(|f| matches!(f.error, MethCovError::MalformedFilename(_))));
        assert!(outcome
            .failures
            .iter()
            .any(|f| matches!(f.error, MethCovError::CoverageColumnCount { .. })));
        assert!(!report.is_empty());
    }

    #[test]
    fn test_sink_error_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_coverage_file(
            dir.path().join("GSM001_M04_1wk_Liver.cov.gz"),
            &[("1", 100, 100, 50.0, 5, 5)],
        );
        let driver = BatchDriver::new(BatchConfig::default(), catalog());
        let output = driver
            .run(dir.path(), |_| {
                Err(MethCovError::IOError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )))
            })
            .unwrap();
        assert_eq!(output.value().succeeded(), 0);
        assert_eq!(output.value().failed(), 1);
    }

    #[test]
    fn test_tissue_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        write_coverage_file(
            dir.path().join("GSM001_M04_1wk_Liver.cov.gz"),
            &[("1", 100, 100, 50.0, 5, 5)],
        );
        write_coverage_file(
            dir.path().join("GSM002_M05_1wk_Heart.cov.gz"),
            &[("1", 100, 100, 50.0, 5, 5)],
        );
        let config = BatchConfig {
            tissues: vec!["Heart".to_string()],
            ..Default::default()
        };
        let driver = BatchDriver::new(config, catalog());
        let (outcome, _) = driver.run(dir.path(), |_| Ok(())).unwrap().into_parts();
        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(outcome.summaries[0].tissue, "Heart");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.failed(), 0);
    }

    #[test]
    fn test_missing_directory() {
        let driver = BatchDriver::new(BatchConfig::default(), catalog());
        let err = driver.run("no/such/dir", |_| Ok(())).unwrap_err();
        assert!(err.is_not_found());
    }
}
