use std::path::PathBuf;

use clap::Args;
use log::{
    info,
    warn,
};

use crate::{
    types::Result,
    OptProcess,
    error::BandError,
    sample::{
        DEFAULT_SAMPLE_ASSET,
        read_asset,
        synthetic_sample,
    },
    commands::common::write_to_file,
};


#[derive(Debug, Args)]
/// Write a sample band file to start from.
///
/// The bundled sample is copied when it can be found, otherwise a synthetic two-band file
/// with an indirect gap around 0 eV is generated.
pub struct Sample {
    #[arg(long, default_value = DEFAULT_SAMPLE_ASSET)]
    /// Location of the bundled sample.
    asset: PathBuf,

    #[arg(short, long, default_value = "./sample.dat")]
    /// Where to write the sample.
    output: PathBuf,

    #[arg(long, default_value_t = 41)]
    /// Points per band of the synthetic sample.
    npoints: usize,
}


impl OptProcess for Sample {
    fn process(&self) -> Result<()> {
        let content = match read_asset(&self.asset) {
            Ok(bytes) => {
                info!("Copying sample band file {:?}", self.asset);
                bytes
            },
            Err(BandError::MissingAsset(path)) => {
                warn!("Sample asset {:?} not found, generating a synthetic two-band sample instead", path);
                synthetic_sample(self.npoints)
                    .to_text("Synthetic two-band sample: k  E(eV), reference energy 0")
                    .into_bytes()
            },
            Err(e) => return Err(e.into()),
        };

        write_to_file(&self.output, &content)
    }
}
