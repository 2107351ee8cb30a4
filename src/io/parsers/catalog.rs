//! Region catalog parsing.
//!
//! A region catalog is a delimited table (comma or tab separated, with a
//! header row) of named genomic regions. Different catalog variants name
//! their columns differently, e.g. a curated settings file:
//!
//! ```text
//! name,chromosome,start_loc,end_loc
//! 3-constraint_element,1,3000,3400
//! ```
//!
//! or a UCSC CpG island table:
//!
//! ```text
//! #bin	chrom	chromStart	chromEnd	name	length	cpgNum
//! ```
//!
//! Header names are matched case-insensitively (after stripping a leading
//! `'#'`) against the aliases in [`COLUMN_ALIASES`]. The first column
//! matching each field wins; unrecognized columns are ignored.
//!
//! UCSC bin numbers repeat across islands, so when the name column is a
//! `bin` column each region is named `<row>-<bin>`, with `row` the 0-based
//! index of the data row (the first island above becomes `0-585`).

use csv::StringRecord;
use lazy_static::lazy_static;
use log::debug;
use std::collections::HashMap;
use std::path::Path;

use super::parse_column;
use super::tsv::build_delimited_reader;
use crate::config::CatalogOptions;
use crate::error::MethCovError;
use crate::io::file::InputFile;
use crate::regions::GenomicRegion;
use crate::Position;

/// The four mandatory fields of a region catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CatalogColumn {
    Name,
    Chromosome,
    Start,
    End,
}

impl CatalogColumn {
    pub fn label(&self) -> &'static str {
        match self {
            CatalogColumn::Name => "name",
            CatalogColumn::Chromosome => "chromosome",
            CatalogColumn::Start => "start_loc",
            CatalogColumn::End => "end_loc",
        }
    }
}

lazy_static! {
    /// Lowercased header names accepted for each catalog field.
    pub static ref COLUMN_ALIASES: HashMap<&'static str, CatalogColumn> = {
        let mut aliases = HashMap::new();
        for alias in ["name", "probe", "region", "region_name", "bin"] {
            aliases.insert(alias, CatalogColumn::Name);
        }
        for alias in ["chromosome", "chrom", "chr", "seqname"] {
            aliases.insert(alias, CatalogColumn::Chromosome);
        }
        for alias in ["start_loc", "start", "chromstart", "s_loc"] {
            aliases.insert(alias, CatalogColumn::Start);
        }
        for alias in ["end_loc", "end", "chromend", "e_loc"] {
            aliases.insert(alias, CatalogColumn::End);
        }
        aliases
    };
}

/// The header alias that makes names row-qualified.
const BIN_ALIAS: &str = "bin";

/// Column indices of the four catalog fields within a header row.
#[derive(Debug, PartialEq)]
struct ColumnLayout {
    name: usize,
    chromosome: usize,
    start: usize,
    end: usize,
    name_from_bin: bool,
}

impl ColumnLayout {
    fn from_header(header: &StringRecord) -> Result<Self, MethCovError> {
        let mut found: HashMap<CatalogColumn, (usize, String)> = HashMap::new();
        for (index, column) in header.iter().enumerate() {
            let normalized = column.trim().trim_start_matches('#').to_lowercase();
            if let Some(field) = COLUMN_ALIASES.get(normalized.as_str()) {
                found.entry(*field).or_insert((index, normalized));
            }
        }
        let lookup = |field: CatalogColumn| {
            found
                .get(&field)
                .map(|(index, _)| *index)
                .ok_or(MethCovError::MissingCatalogColumn(field.label()))
        };
        Ok(Self {
            name: lookup(CatalogColumn::Name)?,
            chromosome: lookup(CatalogColumn::Chromosome)?,
            start: lookup(CatalogColumn::Start)?,
            end: lookup(CatalogColumn::End)?,
            name_from_bin: found
                .get(&CatalogColumn::Name)
                .is_some_and(|(_, alias)| alias == BIN_ALIAS),
        })
    }
}

/// Pick the delimiter from the header line: tab if it has tabs and no
/// commas, otherwise comma.
fn detect_delimiter(header_line: &str) -> u8 {
    if header_line.contains('\t') && !header_line.contains(',') {
        b'\t'
    } else {
        b','
    }
}

fn catalog_field<'a>(
    record: &'a StringRecord,
    index: usize,
    column: CatalogColumn,
    line: u64,
) -> Result<&'a str, MethCovError> {
    match record.get(index).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        other => Err(MethCovError::InvalidCatalogField {
            line,
            column: column.label(),
            value: other.unwrap_or("").to_string(),
        }),
    }
}

fn catalog_position(
    record: &StringRecord,
    index: usize,
    column: CatalogColumn,
    line: u64,
) -> Result<Position, MethCovError> {
    let value = catalog_field(record, index, column, line)?;
    parse_column(value).ok_or_else(|| MethCovError::InvalidCatalogField {
        line,
        column: column.label(),
        value: value.to_string(),
    })
}

/// Read every region of a catalog file, in file order.
///
/// # Errors
///
/// Returns [`MethCovError::MissingCatalogColumn`] if a mandatory field has no
/// column, [`MethCovError::InvalidCatalogField`] if a row cannot be coerced,
/// [`MethCovError::InvalidRegion`] if a row's start is after its end, and
/// [`MethCovError::NotFound`] if the file does not exist.
pub fn read_catalog(
    filepath: impl AsRef<Path>,
    options: &CatalogOptions,
) -> Result<Vec<GenomicRegion>, MethCovError> {
    let filepath = filepath.as_ref();
    let header_line = InputFile::new(filepath)
        .first_line()?
        .ok_or(MethCovError::EmptyCatalog)?;
    let delimiter = detect_delimiter(&header_line);

    let mut reader = build_delimited_reader(filepath, delimiter, true)?;
    let layout = ColumnLayout::from_header(reader.headers()?)?;
    debug!(
        "catalog {}: delimiter {:?}, columns {:?}",
        filepath.display(),
        delimiter as char,
        layout
    );

    let mut regions = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let line = record.position().map_or(0, |pos| pos.line());

        let name = catalog_field(&record, layout.name, CatalogColumn::Name, line)?;
        let name = if layout.name_from_bin {
            format!("{}-{}", row, name)
        } else {
            name.to_string()
        };
        let mut chromosome =
            catalog_field(&record, layout.chromosome, CatalogColumn::Chromosome, line)?;
        if options.strip_chr_prefix {
            chromosome = chromosome.strip_prefix("chr").unwrap_or(chromosome);
        }
        let start = catalog_position(&record, layout.start, CatalogColumn::Start, line)?;
        let end = catalog_position(&record, layout.end, CatalogColumn::End, line)?;

        regions.push(GenomicRegion::try_new(name, chromosome, start, end)?);
    }
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::temp_text_file;

    #[test]
    fn test_settings_catalog() {
        let file = temp_text_file(
            "name,chromosome,start_loc,end_loc\n3-constraint_element,1,3000,3400\nb,X,10,10\n",
        );
        let regions = read_catalog(file.path(), &CatalogOptions::default()).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].name, "3-constraint_element");
        assert_eq!(regions[0].chromosome, "1");
        assert_eq!(regions[0].start_loc, 3000);
        assert_eq!(regions[0].end_loc, 3400);
        assert_eq!(regions[1].chromosome, "X");
    }

    #[test]
    fn test_ucsc_style_catalog() {
        let file = temp_text_file(
            "#bin\tchrom\tchromStart\tchromEnd\tname\tlength\n585\tchr1\t3531624\t3531843\tCpG: 27\t219\n",
        );
        let options = CatalogOptions {
            strip_chr_prefix: true,
        };
        let regions = read_catalog(file.path(), &options).unwrap();
        assert_eq!(regions.len(), 1);
        // the '#bin' column comes first, so it is the name
        assert_eq!(regions[0].name, "0-585");
        assert_eq!(regions[0].chromosome, "1");
        assert_eq!(regions[0].start_loc, 3531624);
        assert_eq!(regions[0].end_loc, 3531843);
    }

    #[test]
    fn test_repeated_bins_get_distinct_names() {
        let file = temp_text_file(
            "#bin\tchrom\tchromStart\tchromEnd\tname\n\
             585\tchr1\t100\t200\tCpG: 27\n\
             585\tchr1\t300\t400\tCpG: 12\n\
             586\tchr2\t10\t20\tCpG: 3\n",
        );
        let regions = read_catalog(file.path(), &CatalogOptions::default()).unwrap();
        let names: Vec<_> = regions.iter().map(|region| region.name.as_str()).collect();
        assert_eq!(names, vec!["0-585", "1-585", "2-586"]);
    }

    #[test]
    fn test_name_alias_keeps_value() {
        // only a 'bin' name column is row-qualified
        let file = temp_text_file("Region,Bin,Chromosome,Start,End
r1,585,1,5,9
");
        let regions = read_catalog(file.path(), &CatalogOptions::default()).unwrap();
        assert_eq!(regions[0].name, "r1");
    }

    #[test]
    fn test_alias_column_and_casing() {
        let file = temp_text_file("Probe,Chromosome,Start_Loc,End_Loc\np1,2,5,9\n");
        let regions = read_catalog(file.path(), &CatalogOptions::default()).unwrap();
        assert_eq!(regions[0].name, "p1");
        assert_eq!(regions[0].chromosome, "2");
    }

    #[test]
    fn test_chr_prefix_kept_by_default() {
        let file = temp_text_file("name,chrom,start,end\na,chr2,1,2\n");
        let regions = read_catalog(file.path(), &CatalogOptions::default()).unwrap();
        assert_eq!(regions[0].chromosome, "chr2");
    }

    #[test]
    fn test_missing_column() {
        let file = temp_text_file("name,chromosome,start_loc\na,1,5\n");
        let err = read_catalog(file.path(), &CatalogOptions::default()).unwrap_err();
        assert!(matches!(err, MethCovError::MissingCatalogColumn("end_loc")));
    }

    #[test]
    fn test_non_numeric_start() {
        let file = temp_text_file("name,chromosome,start_loc,end_loc\na,1,five,9\n");
        let err = read_catalog(file.path(), &CatalogOptions::default()).unwrap_err();
        match err {
            MethCovError::InvalidCatalogField { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, "start_loc");
                assert_eq!(value, "five");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_start_after_end() {
        let file = temp_text_file("name,chromosome,start_loc,end_loc\na,1,10,9\n");
        let err = read_catalog(file.path(), &CatalogOptions::default()).unwrap_err();
        assert!(matches!(err, MethCovError::InvalidRegion(_, 10, 9)));
    }

    #[test]
    fn test_empty_catalog_file() {
        let file = temp_text_file("");
        let err = read_catalog(file.path(), &CatalogOptions::default()).unwrap_err();
        assert!(matches!(err, MethCovError::EmptyCatalog));
    }
}
