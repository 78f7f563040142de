//! MNIST dataset reader.
//!
//! # IDX files
//!
//! The dataset ships as four IDX files, all integers big-endian:
//!
//! ```text
//! images: magic 2051 | count u32 | rows u32 | cols u32 | pixels u8 ...
//! labels: magic 2049 | count u32 | labels u8 ...
//! ```
//!
//! named `{train,t10k}-{images-idx3,labels-idx1}-ubyte`. With the `gzip`
//! feature the same names with a `.gz` suffix are accepted too.
//!
//! Headers are checked through `briny`'s [`Validate`]/[`TrustedData`] gate
//! before any payload is sliced, so a truncated or mislabelled file fails at
//! [`MnistLoader::open`] instead of at some later example.
//!
//! # Examples
//!
//! [`MnistLoader::example`] returns the `i`-th pair as tensors ready for a
//! network: the image flattened to `[1, rows * cols]` with pixels rescaled
//! from `[0, 255]` to `[-1, 1]`, and the class as a float in a `[1, 1]`
//! tensor. An index past the end yields `None`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use briny::prelude::{TrustedData, Validate, ValidationError};

use crate::tensors::TensorBuf;

const IMAGE_MAGIC: u32 = 0x0000_0803;
const LABEL_MAGIC: u32 = 0x0000_0801;

/// Errors raised while opening a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Neither the plain nor the compressed file exists.
    #[error("file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    /// Reading a file failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// The header is malformed: wrong magic, wrong length, or sizes that do
    /// not match the payload.
    #[error("invalid IDX header in {}", .0.display())]
    InvalidHeader(PathBuf),

    /// Image and label files disagree on the number of examples.
    #[error("{images} images but {labels} labels")]
    CountMismatch {
        /// Images in the image file.
        images: usize,
        /// Labels in the label file.
        labels: usize,
    },

    /// A `.gz` file was found but the `gzip` feature is disabled.
    #[error("{} is compressed; enable the `gzip` feature or decompress it", .0.display())]
    GzipUnsupported(PathBuf),
}

/// Which half of the dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Split {
    /// The 60 000 training examples (`train-*`).
    #[default]
    Train,
    /// The 10 000 test examples (`t10k-*`).
    Test,
}

impl Split {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "t10k",
        }
    }
}

/// One input/label pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    /// Pixels as `[1, rows * cols]`, rescaled to `[-1, 1]`.
    pub input: TensorBuf,
    /// Class as `[1, 1]`.
    pub label: TensorBuf,
}

/// Parsed IDX header with the payload it claims to describe.
struct IdxFile {
    magic: u32,
    expected_magic: u32,
    dims: Vec<usize>,
    payload: Vec<u8>,
}

impl Validate for IdxFile {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.magic != self.expected_magic {
            return Err(ValidationError);
        }
        let needed = self
            .dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(ValidationError)?;
        if self.payload.len() < needed {
            return Err(ValidationError);
        }
        Ok(())
    }
}

/// Random access to MNIST examples held in memory.
#[derive(Debug, Clone)]
pub struct MnistLoader {
    images: Vec<u8>,
    labels: Vec<u8>,
    len: usize,
    rows: usize,
    cols: usize,
}

impl MnistLoader {
    /// Reads both files of `split` from `dir`.
    ///
    /// # Errors
    ///
    /// [`DataError`] if a file is missing, unreadable or malformed, or if
    /// the two files disagree on the example count.
    pub fn open(dir: impl AsRef<Path>, split: Split) -> Result<Self, DataError> {
        let dir = dir.as_ref();
        let prefix = split.prefix();

        let image_path = locate(&dir.join(format!("{prefix}-images-idx3-ubyte")))?;
        let label_path = locate(&dir.join(format!("{prefix}-labels-idx1-ubyte")))?;
        log::info!("image file: {}", image_path.display());
        log::info!("label file: {}", label_path.display());

        let images = parse_idx(&image_path, IMAGE_MAGIC, 3)?;
        let labels = parse_idx(&label_path, LABEL_MAGIC, 1)?;

        let (len, rows, cols) = (images.dims[0], images.dims[1], images.dims[2]);
        if len != labels.dims[0] {
            return Err(DataError::CountMismatch {
                images: len,
                labels: labels.dims[0],
            });
        }
        log::info!("{len} examples of {rows}x{cols}");

        Ok(Self {
            images: images.payload,
            labels: labels.payload,
            len,
            rows,
            cols,
        })
    }

    /// Number of examples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the split holds no examples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Image height in pixels.
    #[must_use]
    pub const fn image_height(&self) -> usize {
        self.rows
    }

    /// Image width in pixels.
    #[must_use]
    pub const fn image_width(&self) -> usize {
        self.cols
    }

    /// The `i`-th example, or `None` if `i >= len()`.
    #[must_use]
    pub fn example(&self, i: usize) -> Option<Example> {
        if i >= self.len {
            log::error!("cannot access example [{i}] >= {}", self.len);
            return None;
        }

        let pixels = self.rows * self.cols;
        let data = self.images[i * pixels..(i + 1) * pixels]
            .iter()
            .map(|&p| rescale(f32::from(p), 0.0, 255.0, -1.0, 1.0))
            .collect();

        let input = TensorBuf::with_data([1, pixels], data).ok()?;
        let label = TensorBuf::with_data([1, 1], vec![f32::from(self.labels[i])]).ok()?;
        Some(Example { input, label })
    }

    /// Every example, in file order.
    pub fn iter(&self) -> impl Iterator<Item = Example> + '_ {
        (0..self.len).filter_map(|i| self.example(i))
    }
}

/// Maps `x` linearly from `[old_min, old_max]` onto `[new_min, new_max]`.
fn rescale(x: f32, old_min: f32, old_max: f32, new_min: f32, new_max: f32) -> f32 {
    ((x - old_min) * (new_max - new_min)) / (old_max - old_min) + new_min
}

/// Finds `path` or its `.gz` sibling.
fn locate(path: &Path) -> Result<PathBuf, DataError> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    let mut gz = path.as_os_str().to_owned();
    gz.push(".gz");
    let gz = PathBuf::from(gz);
    if gz.is_file() {
        return Ok(gz);
    }
    log::error!("file does not exist: {}", path.display());
    Err(DataError::MissingFile(path.to_path_buf()))
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, DataError> {
    let io_err = |source| DataError::Io {
        path: path.to_path_buf(),
        source,
    };
    let raw = fs::read(path).map_err(io_err)?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        #[cfg(feature = "gzip")]
        {
            use std::io::Read;

            let mut out = Vec::new();
            flate2::read::GzDecoder::new(raw.as_slice())
                .read_to_end(&mut out)
                .map_err(io_err)?;
            return Ok(out);
        }
        #[cfg(not(feature = "gzip"))]
        return Err(DataError::GzipUnsupported(path.to_path_buf()));
    }
    Ok(raw)
}

fn parse_idx(path: &Path, expected_magic: u32, ndims: usize) -> Result<IdxFile, DataError> {
    let bytes = read_bytes(path)?;
    let invalid = || DataError::InvalidHeader(path.to_path_buf());

    let header_len = 4 * (1 + ndims);
    if bytes.len() < header_len {
        return Err(invalid());
    }
    let word = |i: usize| {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&bytes[4 * i..4 * i + 4]);
        u32::from_be_bytes(buf)
    };

    let raw = IdxFile {
        magic: word(0),
        expected_magic,
        dims: (1..=ndims).map(|i| word(i) as usize).collect(),
        payload: bytes[header_len..].to_vec(),
    };
    let mut idx = TrustedData::new(raw).map_err(|_| invalid())?.into_inner();

    let needed: usize = idx.dims.iter().product();
    idx.payload.truncate(needed);
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_maps_pixel_range_onto_unit_interval() {
        assert_eq!(rescale(0.0, 0.0, 255.0, -1.0, 1.0), -1.0);
        assert_eq!(rescale(255.0, 0.0, 255.0, -1.0, 1.0), 1.0);
        assert!(rescale(127.5, 0.0, 255.0, -1.0, 1.0).abs() < 1e-6);
    }
}
