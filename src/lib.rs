pub mod types;
pub mod error;
pub mod bandfile;
pub mod bandgap;
pub mod kpath;
pub mod config;
pub mod render;
pub mod sample;
pub mod commands;
pub mod cli;

pub use types::Result;
pub use cli::OptProcess;
pub use error::BandError;

pub use bandfile::BandData;

pub use bandgap::{
    estimate_gap,
    GapEstimate,
    GapSummary,
};

pub use kpath::{
    HighSymmetryPoints,
    KPointLabel,
};

pub use config::{
    HexColor,
    RenderConfig,
    RenderOverrides,
};

pub use render::{
    render,
    BandFigure,
    ExportFormat,
    output_file_name,
};
