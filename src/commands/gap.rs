use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use log::warn;

use crate::{
    types::Result,
    OptProcess,
    bandgap::GapSummary,
    error::BandError,
    commands::common::load_band_data,
};


#[derive(Debug, Args)]
/// Find the band gap around the reference energy and print where the VBM and CBM sit.
///
/// The valence side is the highest energy strictly below the reference, the conduction
/// side the lowest energy strictly above it. The gap is direct if both occur at the same k.
pub struct Gap {
    #[arg(default_value = "./band.dat")]
    /// Band data file, k in the first column and the raw energy in the second.
    input: PathBuf,

    #[arg(short = 'e', long, default_value_t = 0.0, allow_negative_numbers = true)]
    /// Reference (Fermi) energy in eV, subtracted from every energy.
    efermi: f64,
}


const RULE: &str = "--------------------------------------------------------------------------------";


fn format_kpoints(ks: &[f64]) -> String {
    ks.iter()
        .map(|k| format!("{:.4}", k))
        .collect::<Vec<_>>()
        .join(", ")
}


/// The colored gap report, energies relative to the reference.
pub fn format_summary(summary: &GapSummary) -> String {
    let est = &summary.estimate;
    let is_direct = if summary.is_direct() { "Direct Gap" } else { "Indirect Gap" };

    let mut output = String::with_capacity(320);
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!(" Current system has {:^16} of {:^10} eV\n",
                             is_direct.bright_yellow(), format!("{:5.3}", est.gap).bright_cyan()));
    output.push_str(&format!("  CBM @ k = {:<30} of {:8} eV\n",
                             format_kpoints(&summary.cbm_kpoints),
                             format!("{:8.3}", est.lowest_positive).bright_blue()));
    output.push_str(&format!("  VBM @ k = {:<30} of {:8} eV\n",
                             format_kpoints(&summary.vbm_kpoints),
                             format!("{:8.3}", est.highest_negative).bright_blue()));
    output.push_str(RULE);
    output
}


impl OptProcess for Gap {
    fn process(&self) -> Result<()> {
        let data = load_band_data(&self.input, Some(self.efermi))?;
        let shifted = data.shifted_energies(self.efermi);

        match GapSummary::new(&data.kpoints, &shifted) {
            Ok(summary) => println!("{}", format_summary(&summary)),
            Err(BandError::DegenerateGap(reason)) => {
                warn!("No band gap around {} eV: {}", self.efermi, reason);
                println!("{}\n Current system has {:^20}\n{}", RULE, "No Gap".bright_yellow(), RULE);
            },
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_summary() {
        let kpoints  = [0.0, 0.5, 1.0, 0.0, 0.5, 1.0];
        let energies = [-3.0, -1.0, -2.0, 2.0, 1.5, 1.0];
        let summary = GapSummary::new(&kpoints, &energies).unwrap();

        let output = format_summary(&summary);
        assert!(output.contains("Indirect Gap"));
        assert!(output.contains("2.000"));
        assert!(output.contains("CBM @ k = 1.0000"));
        assert!(output.contains("VBM @ k = 0.5000"));
        assert_eq!(output.lines().count(), 5);
    }
}
