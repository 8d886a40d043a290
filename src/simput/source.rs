// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! SIMPUT sources: tabulated spectra and photon lists.

use rand::RngCore;

use super::{ExtensionKind, SimputError};
use crate::{
    spatial::{SkyImage, SpatialModel},
    spectra::Spectrum,
};

/// The names of the fields of a [`PhotonList`].
const PHOTON_LIST_FIELDS: [&str; 3] = ["ra", "dec", "energy"];

/// Per-photon sky positions and energies.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotonList {
    ra: Vec<f64>,
    dec: Vec<f64>,
    energy: Vec<f64>,
}

impl PhotonList {
    /// Make a new photon list. RA and Dec are in degrees, energies in keV. All
    /// arrays must have the same length.
    pub fn new(ra: Vec<f64>, dec: Vec<f64>, energy: Vec<f64>) -> Result<PhotonList, SimputError> {
        if ra.len() != energy.len() || dec.len() != energy.len() {
            return Err(SimputError::PhotonListLengths {
                num_ra: ra.len(),
                num_dec: dec.len(),
                num_energy: energy.len(),
            });
        }
        Ok(PhotonList { ra, dec, energy })
    }

    /// Get one of the event arrays by name ("ra", "dec" or "energy").
    pub fn get(&self, key: &str) -> Result<&[f64], SimputError> {
        match key {
            "ra" => Ok(&self.ra),
            "dec" => Ok(&self.dec),
            "energy" => Ok(&self.energy),
            _ => Err(SimputError::NoSuchField(key.to_string())),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        PHOTON_LIST_FIELDS.into_iter()
    }

    pub fn contains(&self, key: &str) -> bool {
        PHOTON_LIST_FIELDS.contains(&key)
    }

    pub fn ra(&self) -> &[f64] {
        &self.ra
    }

    pub fn dec(&self) -> &[f64] {
        &self.dec
    }

    pub fn energy(&self) -> &[f64] {
        &self.energy
    }

    /// The number of photons.
    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }
}

/// What a SIMPUT source carries.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePayload {
    Spectrum(Spectrum),
    PhotonList(PhotonList),
}

/// A source that can be written to (and read from) a SIMPUT catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SimputSource {
    pub name: String,

    /// The minimum energy of the source \[keV\].
    pub emin: f64,

    /// The maximum energy of the source \[keV\].
    pub emax: f64,

    /// The energy flux between `emin` and `emax` \[erg/(s cm²)\].
    pub flux: f64,

    /// \[degrees\]. Always 0 for photon lists.
    pub ra: f64,

    /// \[degrees\]. Always 0 for photon lists.
    pub dec: f64,

    pub payload: SourcePayload,

    /// The spatial template of a spectrum source.
    pub image: Option<SkyImage>,
}

impl SimputSource {
    /// A point source with the given spectrum.
    pub fn from_spectrum(name: &str, spectrum: Spectrum, ra: f64, dec: f64) -> SimputSource {
        SimputSource {
            name: name.to_string(),
            emin: spectrum.emin(),
            emax: spectrum.emax(),
            flux: spectrum.total_flux(),
            ra,
            dec,
            payload: SourcePayload::Spectrum(spectrum),
            image: None,
        }
    }

    /// A spectrum source whose spatial distribution is an image of
    /// `spatial_model`, `width` arcminutes across with `nx` pixels on a side.
    pub fn from_spectral_and_spatial_model(
        name: &str,
        spectrum: Spectrum,
        spatial_model: &dyn SpatialModel,
        width: f64,
        nx: usize,
    ) -> SimputSource {
        let image = spatial_model.generate_image(width, nx);
        let (ra, dec) = spatial_model.ref_coord();
        SimputSource {
            image: Some(image),
            ..SimputSource::from_spectrum(name, spectrum, ra, dec)
        }
    }

    /// A photon list made from raw arrays. `flux` is in erg/(s cm²).
    pub fn photon_list(
        ra: Vec<f64>,
        dec: Vec<f64>,
        energy: Vec<f64>,
        flux: f64,
        name: &str,
    ) -> Result<SimputSource, SimputError> {
        SimputSource::from_photon_list(PhotonList::new(ra, dec, energy)?, flux, name)
    }

    /// A photon-list source holding `photons`. Energy bounds come from the
    /// photons themselves.
    pub fn from_photon_list(
        photons: PhotonList,
        flux: f64,
        name: &str,
    ) -> Result<SimputSource, SimputError> {
        if photons.is_empty() {
            return Err(SimputError::EmptyPhotonList(name.to_string()));
        }
        let emin = photons.energy.iter().copied().fold(f64::INFINITY, f64::min);
        let emax = photons
            .energy
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        Ok(SimputSource {
            name: name.to_string(),
            emin,
            emax,
            flux,
            ra: 0.0,
            dec: 0.0,
            payload: SourcePayload::PhotonList(photons),
            image: None,
        })
    }

    /// Draw a photon list from a spectrum and a spatial model, for an
    /// observation of `exposure_time` seconds with a collecting area of `area`
    /// cm². The area should be large enough that the photons sufficiently
    /// sample whatever effective area is applied later.
    pub fn photon_list_from_models<R: RngCore>(
        name: &str,
        spectrum: &Spectrum,
        spatial_model: &dyn SpatialModel,
        exposure_time: f64,
        area: f64,
        rng: &mut R,
    ) -> Result<SimputSource, SimputError> {
        let e = spectrum.generate_energies(exposure_time, area, rng);
        let (ra, dec) = spatial_model.generate_coords(e.len(), rng);
        SimputSource::photon_list(ra, dec, e.energies, e.flux, name)
    }

    /// The kind of extension this source is written as.
    pub fn kind(&self) -> ExtensionKind {
        match self.payload {
            SourcePayload::Spectrum(_) => ExtensionKind::Spectrum,
            SourcePayload::PhotonList(_) => ExtensionKind::PhotonList,
        }
    }

    pub fn spectrum(&self) -> Option<&Spectrum> {
        match &self.payload {
            SourcePayload::Spectrum(s) => Some(s),
            SourcePayload::PhotonList(_) => None,
        }
    }

    pub fn photons(&self) -> Option<&PhotonList> {
        match &self.payload {
            SourcePayload::PhotonList(p) => Some(p),
            SourcePayload::Spectrum(_) => None,
        }
    }
}
