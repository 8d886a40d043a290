// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with SIMPUT catalogs and sources.

use std::path::PathBuf;

use thiserror::Error;

use crate::{io::FitsError, spectra::SpectrumError};

#[derive(Error, Debug)]
pub enum SimputError {
    #[error("Malformed SIMPUT reference '{reference}': {reason}")]
    MalformedReference {
        reference: String,
        reason: &'static str,
    },

    #[error("Unrecognised SIMPUT extension type '{0}'; expected one of 'spectrum', 'phlist' or 'image'")]
    UnrecognisedExtension(String),

    #[error("SIMPUT reference '{0}' doesn't point to a source (only 'spectrum' and 'phlist' extensions can be read as sources)")]
    UnsupportedType(String),

    #[error("Couldn't find {what} in {}", .file.display())]
    NotFound { file: PathBuf, what: String },

    #[error("Photon lists only have 'ra', 'dec' and 'energy' fields; '{0}' isn't one of them")]
    NoSuchField(String),

    #[error("Photon list arrays have different lengths: {num_ra} RA, {num_dec} Dec, {num_energy} energies")]
    PhotonListLengths {
        num_ra: usize,
        num_dec: usize,
        num_energy: usize,
    },

    #[error("Photon list '{0}' has no photons")]
    EmptyPhotonList(String),

    #[error("Tried to get source {index} of a catalog with {len} sources")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("SIMPUT reference '{0}' is longer than the 80 characters that the catalog can hold")]
    ReferenceTooLong(String),

    #[error("Source name '{name}' can't be stored in a SIMPUT catalog: {reason}")]
    BadSourceName { name: String, reason: &'static str },

    #[error("Image in {} has an unexpected shape {shape:?}; expected two dimensions", .file.display())]
    BadImageShape { file: PathBuf, shape: Vec<usize> },

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),

    #[error(transparent)]
    Fits(#[from] FitsError),
}
