use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::config::MergeConfig;
use crate::error::Error;
use crate::image::ImageBuffer;
use crate::read::{read_hex, read_hex_file};
use crate::write::{write_hex, LineEnding};

/// A ROM image being assembled from several HEX inputs.
pub struct Merge {
    image: ImageBuffer,
    total: usize,
}

impl Merge {
    pub fn new(config: &MergeConfig) -> crate::error::Result<Self> {
        Ok(Merge {
            image: config.image()?,
            total: 0,
        })
    }

    /// Loads one HEX file. A file that fails leaves the image untouched.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> crate::error::Result<usize> {
        self.stage(|image| read_hex_file(path, image))
    }

    pub fn add_hex<R: BufRead>(&mut self, reader: R) -> crate::error::Result<usize> {
        self.stage(|image| read_hex(reader, image))
    }

    fn stage<F>(&mut self, load: F) -> crate::error::Result<usize>
    where
        F: FnOnce(&mut ImageBuffer) -> crate::error::Result<usize>,
    {
        let mut staged = self.image.clone();
        let count = load(&mut staged)?;
        self.image = staged;
        self.total += count;
        Ok(count)
    }

    /// Bytes decoded from every input so far.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn image(&self) -> &ImageBuffer {
        &self.image
    }

    /// Writes the whole image, fill bytes included.
    pub fn write_hex<W: Write>(&self, out: W, line_ending: LineEnding) -> io::Result<usize> {
        write_hex(out, self.image.bytes(), self.image.offset(), line_ending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    /// Data bytes decoded across all inputs.
    pub bytes_read: usize,
    /// Inputs skipped because they failed to decode.
    pub skipped: usize,
}

/// Merges `inputs` in order and writes the image to `output`.
///
/// The first input that fails to decode ends the run unless
/// `config.keep_going` is set. Nothing is written when no bytes were read.
pub fn merge_files<P, Q>(config: &MergeConfig, output: Q, inputs: &[P]) -> Result<MergeSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut merge = Merge::new(config).map_err(MergeError::Config)?;
    let mut skipped = 0;

    for input in inputs {
        let path = input.as_ref();
        match merge.add_file(path) {
            Ok(count) => info!("{}: {count} bytes read", path.display()),
            Err(e) if config.keep_going => {
                error!("{}: {e}", path.display());
                skipped += 1;
            }
            Err(e) => return Err(input_error(path, e)),
        }
    }

    if merge.total() == 0 {
        return Err(MergeError::NothingRead);
    }

    let output = output.as_ref();
    let output_error = |error: io::Error| MergeError::Output {
        path: output.to_path_buf(),
        error,
    };
    let file = File::create(output).map_err(output_error)?;
    merge
        .write_hex(BufWriter::new(file), config.line_ending)
        .map_err(output_error)?;
    info!("{}: {} bytes written", output.display(), merge.total());

    Ok(MergeSummary {
        bytes_read: merge.total(),
        skipped,
    })
}

fn input_error(path: &Path, error: Error) -> MergeError {
    MergeError::Input {
        path: path.to_path_buf(),
        error,
    }
}

#[derive(Debug)]
pub enum MergeError {
    Config(Error),
    Input { path: PathBuf, error: Error },
    NothingRead,
    Output { path: PathBuf, error: io::Error },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use MergeError::*;
        match self {
            Config(error) => write!(f, "{error}"),
            Input { path, error } => write!(f, "{}: {error}", path.display()),
            NothingRead => write!(f, "no bytes read from any input file"),
            Output { path, error } => write!(f, "{}: unable to write file: {error}", path.display()),
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MergeError::Config(error) | MergeError::Input { error, .. } => Some(error),
            MergeError::Output { error, .. } => Some(error),
            MergeError::NothingRead => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
