use std::path::PathBuf;

use bandplot::{
    Result,
    BandData,
    BandError,
    GapSummary,
    render::segment_ranges,
};


macro_rules! get_fpath_in_current_dir {
    ($fname:expr) => {{
        let mut path = PathBuf::from(file!());
        path.pop();
        path.push($fname);
        path
    }}
}


#[test]
fn test_read_gnu_bands() -> Result<()> {
    let data = BandData::from_file(&get_fpath_in_current_dir!("band_si.dat.gnu"))?;
    assert_eq!(data.nrows(), 27);
    assert_eq!(data.kmax(), 1.0);
    assert_eq!(data.energy_range(), (2.1, 7.55));

    let kpoints = data.kpoints.to_vec();
    let segments = segment_ranges(&kpoints);
    assert_eq!(segments, vec![0 .. 9, 9 .. 18, 18 .. 27]);

    Ok(())
}


#[test]
fn test_gap_of_gnu_bands() -> Result<()> {
    let data = BandData::from_file(&get_fpath_in_current_dir!("band_si.dat.gnu"))?;
    let shifted = data.shifted_energies(6.0);
    let summary = GapSummary::new(&data.kpoints, &shifted)?;

    approx::assert_abs_diff_eq!(summary.estimate.gap, 1.15, epsilon = 1E-9);
    approx::assert_abs_diff_eq!(summary.estimate.highest_negative, -0.4, epsilon = 1E-9);
    approx::assert_abs_diff_eq!(summary.estimate.lowest_positive, 0.75, epsilon = 1E-9);
    assert_eq!(summary.vbm_kpoints, vec![0.0, 1.0]);
    assert_eq!(summary.cbm_kpoints, vec![0.5]);
    assert!(!summary.is_direct());

    assert!(matches!(GapSummary::new(&data.kpoints, &data.shifted_energies(0.0)),
                     Err(BandError::DegenerateGap(_))));
    Ok(())
}


#[test]
fn test_read_invalid_files() {
    for f in ["band_ragged.dat", "band_text.dat"] {
        let ret = BandData::from_file(&get_fpath_in_current_dir!(f));
        assert!(matches!(ret, Err(BandError::InvalidInputData(_))), "{} should be rejected", f);
    }

    let ret = BandData::from_file(&get_fpath_in_current_dir!("no_such_file.dat"));
    assert!(matches!(ret, Err(BandError::Io(_))));
}
