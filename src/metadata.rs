//! Sample metadata encoded in coverage file names.
//!
//! Sample files are named `<source>_<subject>_<age>_<tissue>.<ext>`, e.g.
//! `GSM2465667_M04NB_1wk_Liver.cov.txt.gz`. This is the only place that knows
//! about that scheme.

use std::path::Path;

use crate::error::MethCovError;
use crate::io::parsers::utils::file_name_str;

/// Sample identifier, age and tissue of one coverage file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleMetadata {
    pub sample_id: String,
    pub age: String,
    pub tissue: String,
}

impl SampleMetadata {
    /// Parse metadata from a file name (not a path).
    ///
    /// The name is split on `'_'`: the first two tokens joined by `'_'` are
    /// the sample identifier, the third is the age, and the fourth, up to its
    /// first `'.'`, is the tissue. Further tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MethCovError::MalformedFilename`] if there are fewer than four
    /// tokens or any of the fields would be empty.
    pub fn from_filename(filename: &str) -> Result<Self, MethCovError> {
        let malformed = || MethCovError::MalformedFilename(filename.to_string());
        let tokens: Vec<&str> = filename.split('_').collect();
        if tokens.len() < 4 {
            return Err(malformed());
        }
        let tissue = tokens[3].split('.').next().unwrap_or("");
        if tokens[..3].iter().any(|t| t.is_empty()) || tissue.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            sample_id: format!("{}_{}", tokens[0], tokens[1]),
            age: tokens[2].to_string(),
            tissue: tissue.to_string(),
        })
    }

    /// Parse metadata from the file name of `filepath`.
    pub fn from_path(filepath: impl AsRef<Path>) -> Result<Self, MethCovError> {
        let filepath = filepath.as_ref();
        let filename = file_name_str(filepath)
            .ok_or_else(|| MethCovError::MalformedFilename(filepath.display().to_string()))?;
        Self::from_filename(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_filename() {
        let metadata = SampleMetadata::from_filename("GSM001_M04_1wk_Liver.cov.txt.gz").unwrap();
        assert_eq!(
            metadata,
            SampleMetadata {
                sample_id: "GSM001_M04".to_string(),
                age: "1wk".to_string(),
                tissue: "Liver".to_string(),
            }
        );
    }

    #[test]
    fn test_from_path_uses_file_name() {
        let metadata =
            SampleMetadata::from_path("/data/run_1/GSM2465667_M04NB_27wk_Cortex.cov.gz").unwrap();
        assert_eq!(metadata.sample_id, "GSM2465667_M04NB");
        assert_eq!(metadata.age, "27wk");
        assert_eq!(metadata.tissue, "Cortex");
    }

    #[test]
    fn test_extra_tokens_ignored() {
        let metadata = SampleMetadata::from_filename("a_b_c_Lung_rep2.cov.gz").unwrap();
        assert_eq!(metadata.tissue, "Lung");
    }

    #[test]
    fn test_too_few_tokens() {
        let err = SampleMetadata::from_filename("GSM001_M04_Liver.cov.gz").unwrap_err();
        assert!(matches!(err, MethCovError::MalformedFilename(_)));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_empty_tissue() {
        assert!(SampleMetadata::from_filename("a_b_c_.cov.gz").is_err());
        assert!(SampleMetadata::from_filename("a__c_Liver.gz").is_err());
    }
}
