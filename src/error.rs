//! Error kinds surfaced by band data loading, gap estimation and figure export.

use std::path::PathBuf;

use thiserror::Error;


/// Errors raised by the band-structure core.
#[derive(Error, Debug)]
pub enum BandError {
    /// The uploaded data is not a rectangular numeric matrix with at least two columns.
    #[error("invalid input data: {0}")]
    InvalidInputData(String),

    /// No energy lies strictly below or strictly above the reference level.
    #[error("no gap boundary found: {0}")]
    DegenerateGap(String),

    /// A bundled asset such as the sample band file is absent on disk.
    #[error("missing asset: {}", .0.display())]
    MissingAsset(PathBuf),

    /// The figure could not be serialized into the requested format.
    #[error("export failed: {0}")]
    ExportFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
