// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Background spectra, before and after folding through an effective area.

use std::path::Path;

use log::debug;
use rand::Rng;

use super::BackgroundError;
use crate::{
    response::EffectiveArea,
    spectra::{Energies, Spectrum},
};

/// The Hickox & Markevitch (2007) cosmic X-ray background template.
const HM_CXB_TABLE: &str = include_str!("../../data/hm_cxb_bkgnd.dat");

/// A background spectrum on the sky, in photon/(s cm² keV arcmin²).
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSpectrum {
    spectrum: Spectrum,
}

impl BackgroundSpectrum {
    pub fn new(spectrum: Spectrum) -> BackgroundSpectrum {
        BackgroundSpectrum { spectrum }
    }

    /// The cosmic X-ray background, as fit by Hickox & Markevitch (2007).
    pub fn hickox_markevitch() -> Result<BackgroundSpectrum, BackgroundError> {
        let spectrum = parse_table(HM_CXB_TABLE, "hm_cxb_bkgnd.dat", 1.0)?;
        Ok(BackgroundSpectrum { spectrum })
    }

    /// Read a two-column text table of bin-centre energies \[keV\] and flux
    /// densities \[photon/(s cm² keV arcmin²)\]. Lines starting with '#' are
    /// ignored.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<BackgroundSpectrum, BackgroundError> {
        let spectrum = read_table(file.as_ref(), 1.0)?;
        Ok(BackgroundSpectrum { spectrum })
    }

    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    /// Draw photon energies for an observation of `exposure_time` seconds with
    /// a collecting area of `area` cm² over a solid angle of `fov_area`
    /// arcmin².
    pub fn generate_energies<R: Rng + ?Sized>(
        &self,
        exposure_time: f64,
        area: f64,
        fov_area: f64,
        rng: &mut R,
    ) -> Energies {
        self.spectrum
            .generate_energies(exposure_time, area * fov_area, rng)
    }
}

/// A background spectrum as seen by the detector, in counts/(s keV arcmin²).
#[derive(Debug, Clone, PartialEq)]
pub struct ConvolvedBackgroundSpectrum {
    spectrum: Spectrum,
}

impl ConvolvedBackgroundSpectrum {
    /// Fold a sky background through an effective area, evaluated at the
    /// centre of each bin.
    pub fn new(bkgnd: &BackgroundSpectrum, arf: &EffectiveArea) -> ConvolvedBackgroundSpectrum {
        let spectrum = &bkgnd.spectrum;
        let area = arf.interpolate(&spectrum.emid());
        let flux = spectrum
            .flux()
            .iter()
            .zip(area)
            .map(|(f, a)| f * a)
            .collect();
        ConvolvedBackgroundSpectrum {
            spectrum: spectrum.with_flux(flux),
        }
    }

    /// Use a spectrum that is already in detector counts/(s keV arcmin²).
    pub fn from_spectrum(spectrum: Spectrum) -> ConvolvedBackgroundSpectrum {
        ConvolvedBackgroundSpectrum { spectrum }
    }

    /// Read a particle background: a two-column text table of bin-centre
    /// energies \[keV\] and count rates \[counts/(s keV)\] that were extracted
    /// from `area` arcmin² of the detector.
    pub fn from_file<P: AsRef<Path>>(
        file: P,
        area: f64,
    ) -> Result<ConvolvedBackgroundSpectrum, BackgroundError> {
        let spectrum = read_table(file.as_ref(), 1.0 / area)?;
        Ok(ConvolvedBackgroundSpectrum { spectrum })
    }

    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    /// Draw event energies for an observation of `exposure_time` seconds
    /// covering `fov_area` arcmin² of the detector. The returned flux is per
    /// arcmin² rather than per cm².
    pub fn generate_energies<R: Rng + ?Sized>(
        &self,
        exposure_time: f64,
        fov_area: f64,
        rng: &mut R,
    ) -> Energies {
        self.spectrum
            .generate_energies(exposure_time, fov_area, rng)
    }
}

fn read_table(file: &Path, scale: f64) -> Result<Spectrum, BackgroundError> {
    let contents = std::fs::read_to_string(file).map_err(|err| BackgroundError::Read {
        file: file.display().to_string(),
        err,
    })?;
    let spectrum = parse_table(&contents, &file.display().to_string(), scale)?;
    debug!(
        "Read {} background bins from {}",
        spectrum.num_bins(),
        file.display()
    );
    Ok(spectrum)
}

/// Parse a table of uniformly spaced bin centres and flux densities,
/// multiplying each flux by `scale`.
fn parse_table(contents: &str, file: &str, scale: f64) -> Result<Spectrum, BackgroundError> {
    let mut emid = vec![];
    let mut flux = vec![];
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let bad = || BackgroundError::BadTable {
            file: file.to_string(),
            line_num: i + 1,
            line: line.to_string(),
        };
        let mut values = line.split_whitespace().map(str::parse::<f64>);
        match (values.next(), values.next(), values.next()) {
            (Some(Ok(e)), Some(Ok(f)), None) => {
                emid.push(e);
                flux.push(f * scale);
            }
            _ => return Err(bad()),
        }
    }
    Ok(Spectrum::from_midpoints(&emid, flux)?)
}
