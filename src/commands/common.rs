use std::{
    io::Write,
    fs,
    path::Path,
};

use anyhow::Context;
use log::{
    info,
    warn,
};

use crate::{
    types::Result,
    bandfile::BandData,
};


/// Load a band file, warning if `reference` lies outside its energies.
pub fn load_band_data(path: &(impl AsRef<Path> + ?Sized), reference: Option<f64>) -> Result<BandData> {
    let path = path.as_ref();
    info!("Reading band data from {:?}", path);
    let data = BandData::from_file(path)
        .with_context(|| format!("Parse file {:?} failed.", path))?;

    if let Some(reference) = reference {
        let (emin, emax) = data.energy_range();
        if reference < emin || reference > emax {
            warn!("Reference energy {} eV lies outside the data range [{}, {}] eV, no gap can be found",
                  reference, emin, emax);
        }
    }

    Ok(data)
}


/// Create or truncate `file_name` and write `content` into it.
pub fn write_to_file(file_name: &(impl AsRef<Path> + ?Sized), content: &[u8]) -> Result<()> {
    let file_name = file_name.as_ref();
    info!("Writing to {:?}", file_name);

    let mut f = fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(file_name)
        .with_context(|| format!("Cannot open {:?} for writing.", file_name))?;

    f.write_all(content)?;
    Ok(())
}
