// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Print the contents of a SIMPUT catalog.

use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use crate::{
    simput::{SimputCatalog, SourcePayload},
    XmockError,
};

/// Print the sources of a SIMPUT catalog.
#[derive(Parser, Debug)]
pub struct SimputInfoArgs {
    /// The SIMPUT catalog file.
    #[clap(name = "CATALOG", parse(from_os_str))]
    catalog: PathBuf,

    /// Also read each source's spectrum or photon list, reporting any
    /// references that can't be resolved.
    #[clap(short, long)]
    resolve: bool,
}

impl SimputInfoArgs {
    pub fn run(self) -> Result<(), XmockError> {
        let catalog = SimputCatalog::load(&self.catalog)?;
        info!("{}: {} sources", self.catalog.display(), catalog.len());

        let mut num_unresolved = 0;
        for i in 0..catalog.len() {
            info!(
                "{i:>4} {}: RA {:.6}°, Dec {:.6}°, {}-{} keV, flux {:e} erg/s/cm²",
                catalog.src_names()[i],
                catalog.ra()[i],
                catalog.dec()[i],
                catalog.emin()[i],
                catalog.emax()[i],
                catalog.flux()[i],
            );
            info!("     spectrum: {}", catalog.spectra()[i]);
            info!("     image:    {}", catalog.images()[i]);
            if !self.resolve {
                continue;
            }
            match catalog.read_source(i) {
                Ok(source) => match &source.payload {
                    SourcePayload::Spectrum(s) => info!(
                        "     spectrum with {} bins{}",
                        s.num_bins(),
                        match &source.image {
                            Some(image) => {
                                let (nx, ny) = image.dims();
                                format!(", {nx}x{ny} image")
                            }
                            None => String::new(),
                        }
                    ),
                    SourcePayload::PhotonList(p) => info!("     {} photons", p.len()),
                },
                Err(e) => {
                    warn!("     couldn't resolve: {e}");
                    num_unresolved += 1;
                }
            }
        }

        if num_unresolved > 0 {
            return Err(XmockError::Simput(format!(
                "{num_unresolved} of {} sources couldn't be resolved",
                catalog.len()
            )));
        }
        Ok(())
    }
}
