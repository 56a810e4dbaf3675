use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while acquiring or decoding an image.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot open {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is empty", path.display())]
    EmptySource { path: PathBuf },

    /// A read of `width` bytes at `offset` falls outside an image of `len` bytes.
    #[error("read of {width} byte(s) at offset {offset} is outside the image ({len} bytes)")]
    BoundsViolation { offset: i64, width: usize, len: usize },

    /// `run` was called on an inspector whose earlier step failed.
    #[error("inspection already failed; no headers to report")]
    InspectionFailed,

    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

impl Error {
    pub(crate) fn out_of_bounds(offset: usize, width: usize, len: usize) -> Self {
        Error::BoundsViolation {
            offset: i64::try_from(offset).unwrap_or(i64::MAX),
            width,
            len,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
