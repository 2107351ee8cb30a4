//! Input/Output file handling with [`InputFile`] and [`OutputFile`].
//!
//! These types abstract over reading/writing both plaintext and gzip-compressed
//! input/output.

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::MethCovError;

/// Check if a file is a gzipped by looking for the magic numbers
pub fn is_gzipped_file(file_path: impl AsRef<Path>) -> io::Result<bool> {
    let mut file = File::open(file_path.as_ref())?;
    let mut buffer = [0; 2];
    match file.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer == [0x1f, 0x8b]),
        // too short to be gzip, e.g. an empty file
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Open a file, turning a missing path into [`MethCovError::NotFound`].
pub fn open_file(filepath: &Path) -> Result<File, MethCovError> {
    File::open(filepath).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MethCovError::NotFound(filepath.to_path_buf()),
        _ => MethCovError::IOError(e),
    })
}

/// Represents an input file.
///
/// This abstracts how data is read in, allowing for both plaintext and gzip-compressed
/// input to be read through a common interface.
#[derive(Clone, Debug)]
pub struct InputFile {
    pub filepath: PathBuf,
}

impl InputFile {
    /// Constructs a new `InputFile`.
    ///
    /// # Arguments
    ///
    /// * `filepath` - the path to the file. Gzip-compressed input is detected by
    /// its magic number (not its extension) and uncompressed automatically.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    /// Opens the file and returns a decompressing stream.
    ///
    /// # Returns
    ///
    /// A `Box<dyn Read>` on success, [`MethCovError::NotFound`] if the path does not
    /// exist, or [`MethCovError::IOError`] on other failures.
    pub fn stream(&self) -> Result<Box<dyn Read>, MethCovError> {
        let file = open_file(&self.filepath)?;
        let is_gzipped = is_gzipped_file(&self.filepath)?;
        let stream: Box<dyn Read> = if is_gzipped {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(stream)
    }

    /// Opens the file and returns a buffered reader.
    pub fn reader(&self) -> Result<BufReader<Box<dyn Read>>, MethCovError> {
        Ok(BufReader::new(self.stream()?))
    }

    /// Read the first line (without its line terminator), or `None` if the
    /// file is empty.
    pub fn first_line(&self) -> Result<Option<String>, MethCovError> {
        let mut reader = self.reader()?;
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

enum OutputDestination {
    File(PathBuf),
    Stdout,
}

/// Represents an output file.
///
/// This struct is used to handle operations on an output file, such as writing to the file.
/// This abstracts writing both plaintext and gzip-compressed files.
pub struct OutputFile {
    destination: OutputDestination,
}

impl OutputFile {
    /// Constructs a new `OutputFile`.
    ///
    /// # Arguments
    ///
    /// * `filepath` - the path to the file. If the file extension is
    /// `.gz`, `OutputFile` will automatically write gzip-compressed output.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            destination: OutputDestination::File(filepath.into()),
        }
    }

    /// Constructs a new [`OutputFile`] for standard output.
    pub fn new_stdout() -> Self {
        Self {
            destination: OutputDestination::Stdout,
        }
    }

    /// Opens the file and returns a writer.
    ///
    /// If the file path ends with ".gz", the file is treated as gzip-compressed, and the
    /// function will handle compression automatically.
    pub fn writer(&self) -> io::Result<Box<dyn Write>> {
        let writer: Box<dyn Write> = match &self.destination {
            OutputDestination::File(path) => {
                let is_gzip = path.extension().map_or(false, |ext| ext == "gz");
                if is_gzip {
                    Box::new(BufWriter::new(GzEncoder::new(
                        File::create(path)?,
                        Compression::default(),
                    )))
                } else {
                    Box::new(BufWriter::new(File::create(path)?))
                }
            }
            OutputDestination::Stdout => Box::new(BufWriter::new(io::stdout())),
        };
        Ok(writer)
    }
}

/// Serialize `rows` as a comma-separated table with a header row.
///
/// The header is taken from the field names of `S`; `None` values are written
/// as empty fields. A table with no rows is written as an empty file.
pub fn write_csv<'a, S, I>(rows: I, output: &OutputFile) -> Result<(), MethCovError>
where
    S: Serialize + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let mut writer = csv::Writer::from_writer(output.writer()?);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
