use std::path::PathBuf;

use clap::Args;
use colored::Colorize;

use crate::{
    types::Result,
    OptProcess,
    render::segment_ranges,
    commands::common::load_band_data,
};


#[derive(Debug, Args)]
/// Print the range of the raw energies, the bounds a useful reference energy lies in.
pub struct Range {
    #[arg(default_value = "./band.dat")]
    /// Band data file, k in the first column and the raw energy in the second.
    input: PathBuf,
}


impl OptProcess for Range {
    fn process(&self) -> Result<()> {
        let data = load_band_data(&self.input, None)?;
        let (emin, emax) = data.energy_range();
        let kpoints = data.kpoints.to_vec();
        let nsegments = segment_ranges(&kpoints).len();

        println!(" {} rows in {} segments, k up to {:.4}", data.nrows(), nsegments, data.kmax());
        println!(" Energy range: {} .. {} eV",
                 format!("{:.4}", emin).bright_blue(),
                 format!("{:.4}", emax).bright_blue());
        Ok(())
    }
}
