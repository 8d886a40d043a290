// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all xmock-related errors. This should be the *only* error
//! enum that is publicly visible from the command-line interface.

use thiserror::Error;

use crate::{
    background::BackgroundError, instrument::InstrumentError, io::FitsError,
    response::ResponseError, simput::SimputError, spectra::SpectrumError,
};

/// The *only* publicly visible error from the xmock binary. Each variant adds
/// a hint to the underlying message, unless it's "generic".
#[derive(Error, Debug)]
pub enum XmockError {
    /// An error related to instrument specifications or the registry.
    #[error("{0}\n\nThe available instruments can be listed with 'xmock instruments'.")]
    Instrument(String),

    /// An error related to SIMPUT catalogs.
    #[error("{0}\n\nSIMPUT references look like 'file.fits[SPECTRUM,1]' or '[PHLIST,2]'; an empty file part means the catalog file itself.")]
    Simput(String),

    /// An error related to background synthesis.
    #[error("{0}\n\nCheck the exposure time and the instrument's chips and field of view.")]
    Background(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv).")]
    Cfitsio(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<InstrumentError> for XmockError {
    fn from(e: InstrumentError) -> Self {
        let s = e.to_string();
        match e {
            InstrumentError::IO(e) => Self::from(e),
            _ => Self::Instrument(s),
        }
    }
}

impl From<SimputError> for XmockError {
    fn from(e: SimputError) -> Self {
        let s = e.to_string();
        match e {
            SimputError::Fits(e) => Self::from(e),
            SimputError::Spectrum(e) => Self::from(e),
            _ => Self::Simput(s),
        }
    }
}

impl From<BackgroundError> for XmockError {
    fn from(e: BackgroundError) -> Self {
        let s = e.to_string();
        match e {
            BackgroundError::Instrument(e) => Self::from(e),
            BackgroundError::Spectrum(e) => Self::from(e),
            BackgroundError::Read { .. } => Self::Generic(s),
            _ => Self::Background(s),
        }
    }
}

impl From<ResponseError> for XmockError {
    fn from(e: ResponseError) -> Self {
        let s = e.to_string();
        match e {
            ResponseError::Fits(e) => Self::from(e),
            _ => Self::Generic(s),
        }
    }
}

impl From<SpectrumError> for XmockError {
    fn from(e: SpectrumError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<FitsError> for XmockError {
    fn from(e: FitsError) -> Self {
        let s = e.to_string();
        match e {
            FitsError::Open { .. } | FitsError::Create { .. } => Self::Generic(s),
            _ => Self::Cfitsio(s),
        }
    }
}

impl From<std::io::Error> for XmockError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
