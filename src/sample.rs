//! Bundled sample band file and its synthetic fallback.
use std::{
    f64::consts::PI,
    fs,
    path::Path,
};

use log::debug;

use crate::{
    bandfile::BandData,
    error::BandError,
};


/// Location of the bundled sample, relative to the working directory.
pub const DEFAULT_SAMPLE_ASSET: &str = "assets/sample/sample.dat";


/// Read a bundled asset, `MissingAsset` if it is not a regular file.
pub fn read_asset(path: &(impl AsRef<Path> + ?Sized)) -> Result<Vec<u8>, BandError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(BandError::MissingAsset(path.to_owned()));
    }
    let bytes = fs::read(path)?;
    debug!("Read {} bytes of asset {:?}", bytes.len(), path);
    Ok(bytes)
}


/// Two cosine bands on `k ∈ [0, 1]` with an indirect gap of 1.1 eV around zero.
///
/// The valence band peaks at -0.6 eV at `k = 0` and the conduction band bottoms out
/// at 0.5 eV at `k = 1`. Each band restarts at `k = 0`, as exported band files do.
pub fn synthetic_sample(npoints: usize) -> BandData {
    let npoints = npoints.max(2);
    let kpoints = (0 .. npoints)
        .map(|i| i as f64 / (npoints - 1) as f64)
        .collect::<Vec<f64>>();

    let valence    = kpoints.iter().map(|&k| (k, -0.6 - 2.0 * (PI * k / 2.0).sin().powi(2)));
    let conduction = kpoints.iter().map(|&k| (k,  0.5 + 2.0 * (PI * k / 2.0).cos().powi(2)));

    let rows = valence.chain(conduction).collect::<Vec<_>>();
    BandData {
        kpoints:  rows.iter().map(|r| r.0).collect(),
        energies: rows.iter().map(|r| r.1).collect(),
    }
}
