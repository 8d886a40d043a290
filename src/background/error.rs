// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with background event synthesis.

use thiserror::Error;

use crate::{instrument::InstrumentError, spectra::SpectrumError};

#[derive(Error, Debug)]
pub enum BackgroundError {
    #[error("No {label} events were detected!!!")]
    NoEvents { label: String },

    #[error("{file}, line {line_num}: expected two numbers (energy and flux), got '{line}'")]
    BadTable {
        file: String,
        line_num: usize,
        line: String,
    },

    #[error("Couldn't read background spectrum {file}: {err}")]
    Read { file: String, err: std::io::Error },

    #[error("Chip {chip_id} has no area; cannot place events on it")]
    DegenerateChip { chip_id: usize },

    #[error("Background alias '{0}' has no spectrum files; specify [file, area] pairs instead")]
    UnresolvedAlias(String),

    #[error("Got {num_spectra} background spectra for {num_regions} detector regions")]
    RegionCountMismatch {
        num_spectra: usize,
        num_regions: usize,
    },

    #[error("Exposure time must be non-negative and finite, got {0} s")]
    BadExposureTime(f64),

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}
