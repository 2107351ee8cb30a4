use std::path::Path;

/// The file name of `filepath` as a string slice, if it has one.
pub fn file_name_str(filepath: &Path) -> Option<&str> {
    filepath.file_name().and_then(|name| name.to_str())
}

/// Get the *base* of a file name, i.e. everything before the first `'.'`,
/// which drops multi-part extensions like `.cov.txt.gz`.
///
/// Returns `None` if there is no file name or the base is empty.
pub fn file_stem_base<P: AsRef<Path>>(filepath: P) -> Option<String> {
    let name = file_name_str(filepath.as_ref())?;
    let base = name.split('.').next().unwrap_or("");
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_base() {
        assert_eq!(
            file_stem_base("dir/GSM001_M04_1wk_Liver.cov.txt.gz"),
            Some("GSM001_M04_1wk_Liver".to_string())
        );
        assert_eq!(file_stem_base("plain"), Some("plain".to_string()));
        assert_eq!(file_stem_base(".hidden"), None);
        assert_eq!(file_stem_base("/"), None);
    }
}
