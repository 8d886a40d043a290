// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tabulated photon spectra and the sampling of photon energies from them.

mod error;
#[cfg(test)]
mod tests;

pub use error::SpectrumError;

use rand::Rng;

use crate::{constants::ERG_PER_KEV, misc::poisson_count};

/// A binned photon spectrum. `flux` is a flux density in photon/(cm² s keV),
/// one value per bin; `ebins` are the bin edges in keV.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    ebins: Vec<f64>,
    flux: Vec<f64>,
}

/// Photon energies drawn from a spectrum, along with the energy flux that they
/// represent.
#[derive(Debug, Clone, PartialEq)]
pub struct Energies {
    /// Photon energies \[keV\].
    pub energies: Vec<f64>,

    /// The energy flux of these photons \[erg/(s cm²)\].
    pub flux: f64,
}

impl Energies {
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }
}

impl Spectrum {
    /// Make a new [`Spectrum`] from bin edges and per-bin flux densities.
    pub fn new(ebins: Vec<f64>, flux: Vec<f64>) -> Result<Spectrum, SpectrumError> {
        check_bins(&ebins, flux.len())?;
        Ok(Spectrum { ebins, flux })
    }

    /// A spectrum with the same flux density in every bin.
    pub fn from_constant(
        flux_density: f64,
        emin: f64,
        emax: f64,
        num_bins: usize,
    ) -> Result<Spectrum, SpectrumError> {
        let ebins = linear_edges(emin, emax, num_bins)?;
        Spectrum::new(ebins, vec![flux_density; num_bins])
    }

    /// A power-law spectrum `norm * E^(-photon_index)`, with `norm` the flux
    /// density at 1 keV. The flux density of each bin is evaluated at the bin
    /// centre.
    pub fn from_power_law(
        photon_index: f64,
        norm: f64,
        emin: f64,
        emax: f64,
        num_bins: usize,
    ) -> Result<Spectrum, SpectrumError> {
        let ebins = linear_edges(emin, emax, num_bins)?;
        let flux = ebins
            .windows(2)
            .map(|w| norm * (0.5 * (w[0] + w[1])).powf(-photon_index))
            .collect();
        Spectrum::new(ebins, flux)
    }

    /// Rebuild a spectrum from bin-centre energies, assuming that the bins are
    /// uniformly spaced. The spacing of the first two centres is used for
    /// every bin, so non-uniform grids come back with incorrect edges.
    pub fn from_midpoints(emid: &[f64], flux: Vec<f64>) -> Result<Spectrum, SpectrumError> {
        if emid.len() < 2 {
            return Err(SpectrumError::TooFewBins(emid.len()));
        }
        let de = emid[1] - emid[0];
        let mut ebins: Vec<f64> = emid.iter().map(|e| e - 0.5 * de).collect();
        ebins.push(emid[emid.len() - 1] + 0.5 * de);
        Spectrum::new(ebins, flux)
    }

    /// The same bins with new flux densities.
    pub(crate) fn with_flux(&self, flux: Vec<f64>) -> Spectrum {
        debug_assert_eq!(flux.len(), self.flux.len());
        Spectrum {
            ebins: self.ebins.clone(),
            flux,
        }
    }

    /// The bin edges \[keV\].
    pub fn ebins(&self) -> &[f64] {
        &self.ebins
    }

    /// The flux density of each bin \[photon/(cm² s keV)\].
    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    pub fn num_bins(&self) -> usize {
        self.flux.len()
    }

    /// The bin centres \[keV\].
    pub fn emid(&self) -> Vec<f64> {
        self.ebins.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// The bin widths \[keV\].
    pub fn de(&self) -> Vec<f64> {
        self.ebins.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn emin(&self) -> f64 {
        self.ebins[0]
    }

    pub fn emax(&self) -> f64 {
        self.ebins[self.ebins.len() - 1]
    }

    /// The photon flux integrated over all bins \[photon/(cm² s)\].
    pub fn total_photon_flux(&self) -> f64 {
        self.flux.iter().zip(self.de()).map(|(f, de)| f * de).sum()
    }

    /// The energy flux integrated over all bins \[erg/(cm² s)\].
    pub fn total_flux(&self) -> f64 {
        self.flux
            .iter()
            .zip(self.de())
            .zip(self.emid())
            .map(|((f, de), e)| f * de * e)
            .sum::<f64>()
            * ERG_PER_KEV
    }

    /// Draw photon energies for an observation of `exposure_time` seconds with
    /// a collecting area of `area` cm². The number of photons is
    /// Poisson-distributed around the expected count.
    pub fn generate_energies<R: Rng + ?Sized>(
        &self,
        exposure_time: f64,
        area: f64,
        rng: &mut R,
    ) -> Energies {
        let counts_per_bin: Vec<f64> = self
            .flux
            .iter()
            .zip(self.de())
            .map(|(f, de)| f * de)
            .collect();
        let expected = counts_per_bin.iter().sum::<f64>() * exposure_time * area;
        let num_photons = poisson_count(expected, rng);
        let energies = draw_energies(&self.ebins, &counts_per_bin, num_photons, rng);
        let flux = if num_photons > 0 {
            energies.iter().sum::<f64>() * ERG_PER_KEV / (exposure_time * area)
        } else {
            0.0
        };
        Energies { energies, flux }
    }
}

/// Draw `num` energies from a binned distribution. `weights` has one
/// (non-negative) entry per bin; energies are uniformly distributed within
/// their bin.
pub(crate) fn draw_energies<R: Rng + ?Sized>(
    ebins: &[f64],
    weights: &[f64],
    num: usize,
    rng: &mut R,
) -> Vec<f64> {
    debug_assert_eq!(ebins.len(), weights.len() + 1);
    let mut cumulative = Vec::with_capacity(weights.len());
    let mut total = 0.0;
    for w in weights {
        total += w.max(0.0);
        cumulative.push(total);
    }
    if num == 0 || total <= 0.0 {
        return vec![];
    }

    (0..num)
        .map(|_| {
            let u: f64 = rng.random::<f64>() * total;
            let i_bin = cumulative
                .partition_point(|&c| c <= u)
                .min(weights.len() - 1);
            let (lo, hi) = (ebins[i_bin], ebins[i_bin + 1]);
            lo + rng.random::<f64>() * (hi - lo)
        })
        .collect()
}

fn check_bins(ebins: &[f64], num_fluxes: usize) -> Result<(), SpectrumError> {
    if ebins.len() < 2 {
        return Err(SpectrumError::TooFewBins(ebins.len()));
    }
    if ebins.len() != num_fluxes + 1 {
        return Err(SpectrumError::LengthMismatch {
            num_edges: ebins.len(),
            num_fluxes,
        });
    }
    for (i, w) in ebins.windows(2).enumerate() {
        if !(w[1] > w[0]) {
            return Err(SpectrumError::EdgesNotIncreasing {
                index: i + 1,
                value: w[1],
            });
        }
    }
    Ok(())
}

fn linear_edges(emin: f64, emax: f64, num_bins: usize) -> Result<Vec<f64>, SpectrumError> {
    if !(emin.is_finite() && emax.is_finite() && emax > emin) {
        return Err(SpectrumError::InvalidRange { emin, emax });
    }
    if num_bins == 0 {
        return Err(SpectrumError::TooFewBins(1));
    }
    let de = (emax - emin) / num_bins as f64;
    Ok((0..=num_bins).map(|i| emin + i as f64 * de).collect())
}
