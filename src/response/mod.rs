// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Instrument responses: effective areas (ARFs) and the mapping of photon
//! energies onto detector channels (RMFs).

mod error;

pub use error::ResponseError;

use std::path::Path;

use log::debug;
use rand::RngCore;

use crate::{
    io::fits::{fits_get_col, fits_open, fits_open_hdu_by_name},
    misc::interpolate_zero_outside,
};

/// A tabulated effective area curve.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveArea {
    elo: Vec<f64>,
    ehi: Vec<f64>,
    area: Vec<f64>,
}

impl EffectiveArea {
    /// Make an effective area from the lower and upper bin energies \[keV\] and
    /// the area of each bin \[cm²\].
    pub fn new(
        elo: Vec<f64>,
        ehi: Vec<f64>,
        area: Vec<f64>,
    ) -> Result<EffectiveArea, ResponseError> {
        if elo.len() != ehi.len() || elo.len() != area.len() {
            return Err(ResponseError::AreaLengthMismatch {
                num_elo: elo.len(),
                num_ehi: ehi.len(),
                num_area: area.len(),
            });
        }
        if elo.is_empty() {
            return Err(ResponseError::EmptyArea);
        }
        Ok(EffectiveArea { elo, ehi, area })
    }

    /// Read the `SPECRESP` extension of an ARF file.
    pub fn from_fits<P: AsRef<Path>>(file: P) -> Result<EffectiveArea, ResponseError> {
        let file = file.as_ref();
        let mut fptr = fits_open(file)?;
        let hdu = fits_open_hdu_by_name(&mut fptr, "SPECRESP", None)?.ok_or_else(|| {
            ResponseError::MissingExtension(file.display().to_string(), "SPECRESP")
        })?;
        let elo = fits_get_col(&mut fptr, &hdu, "ENERG_LO")?;
        let ehi = fits_get_col(&mut fptr, &hdu, "ENERG_HI")?;
        let area = fits_get_col(&mut fptr, &hdu, "SPECRESP")?;
        let arf = EffectiveArea::new(elo, ehi, area)?;
        debug!(
            "Read effective area from {} ({} bins, max {} cm²)",
            file.display(),
            arf.area.len(),
            arf.max_area()
        );
        Ok(arf)
    }

    /// The bin centres \[keV\].
    pub fn emid(&self) -> Vec<f64> {
        self.elo
            .iter()
            .zip(&self.ehi)
            .map(|(lo, hi)| 0.5 * (lo + hi))
            .collect()
    }

    /// The effective area of each bin \[cm²\].
    pub fn area(&self) -> &[f64] {
        &self.area
    }

    pub fn max_area(&self) -> f64 {
        self.area.iter().copied().fold(0.0, f64::max)
    }

    /// Interpolate the effective area at the supplied energies \[keV\]. Energies
    /// outside of the tabulated range have no area.
    pub fn interpolate(&self, energies: &[f64]) -> Vec<f64> {
        let emid = self.emid();
        energies
            .iter()
            .map(|&e| interpolate_zero_outside(&emid, &self.area, e))
            .collect()
    }
}

/// Something that assigns detector channels to photon energies.
pub trait ResponseMatrix {
    /// The number of detector channels.
    fn num_channels(&self) -> usize;

    /// The channel number of the first channel (usually 0 or 1).
    fn first_channel(&self) -> i32;

    /// Assign a channel to a photon of the given energy \[keV\]. A
    /// redistributing response may use the random number generator.
    fn channel(&self, energy: f64, rng: &mut dyn RngCore) -> i32;

    /// Assign channels to many photons.
    fn channels(&self, energies: &[f64], rng: &mut dyn RngCore) -> Vec<i32> {
        energies.iter().map(|&e| self.channel(e, rng)).collect()
    }
}

/// A perfect response: a photon always lands in the channel whose energy
/// bounds contain it. Energies beyond the bounds are put in the first or last
/// channel.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalResponse {
    /// Channel boundaries \[keV\]; one more than the number of channels.
    ebounds: Vec<f64>,
    first_channel: i32,
}

impl DiagonalResponse {
    pub fn new(ebounds: Vec<f64>, first_channel: i32) -> Result<DiagonalResponse, ResponseError> {
        if ebounds.len() < 2 || ebounds.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(ResponseError::BadEbounds);
        }
        Ok(DiagonalResponse {
            ebounds,
            first_channel,
        })
    }

    /// `num_channels` equal-width channels between `emin` and `emax`.
    pub fn linear(
        emin: f64,
        emax: f64,
        num_channels: usize,
        first_channel: i32,
    ) -> Result<DiagonalResponse, ResponseError> {
        let de = (emax - emin) / num_channels as f64;
        let ebounds = (0..=num_channels).map(|i| emin + i as f64 * de).collect();
        DiagonalResponse::new(ebounds, first_channel)
    }

    /// Use the channel bounds in the `EBOUNDS` extension of an RMF file.
    pub fn from_fits<P: AsRef<Path>>(file: P) -> Result<DiagonalResponse, ResponseError> {
        let file = file.as_ref();
        let mut fptr = fits_open(file)?;
        let hdu = fits_open_hdu_by_name(&mut fptr, "EBOUNDS", None)?.ok_or_else(|| {
            ResponseError::MissingExtension(file.display().to_string(), "EBOUNDS")
        })?;
        let channels: Vec<i32> = fits_get_col(&mut fptr, &hdu, "CHANNEL")?;
        let e_min: Vec<f64> = fits_get_col(&mut fptr, &hdu, "E_MIN")?;
        let mut ebounds: Vec<f64> = fits_get_col(&mut fptr, &hdu, "E_MAX")?;
        if e_min.is_empty() || ebounds.len() != e_min.len() {
            return Err(ResponseError::BadEbounds);
        }
        ebounds.insert(0, e_min[0]);
        let first_channel = channels.first().copied().unwrap_or(1);
        debug!(
            "Read {} channel bounds from {}",
            e_min.len(),
            file.display()
        );
        DiagonalResponse::new(ebounds, first_channel)
    }
}

impl ResponseMatrix for DiagonalResponse {
    fn num_channels(&self) -> usize {
        self.ebounds.len() - 1
    }

    fn first_channel(&self) -> i32 {
        self.first_channel
    }

    fn channel(&self, energy: f64, _rng: &mut dyn RngCore) -> i32 {
        let i = self
            .ebounds
            .partition_point(|&b| b <= energy)
            .saturating_sub(1)
            .min(self.num_channels() - 1);
        self.first_channel + i as i32
    }
}
