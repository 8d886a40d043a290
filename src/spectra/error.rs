// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Errors associated with building spectra.
#[derive(Error, Debug, PartialEq)]
pub enum SpectrumError {
    #[error("A spectrum needs at least 2 bin edges, but {0} were supplied")]
    TooFewBins(usize),

    #[error("Got {num_edges} bin edges and {num_fluxes} flux values; there must be exactly one more edge than flux values")]
    LengthMismatch { num_edges: usize, num_fluxes: usize },

    #[error("Spectrum bin edges must be strictly increasing, but edge {index} ({value} keV) is not")]
    EdgesNotIncreasing { index: usize, value: f64 },

    #[error("Spectrum energy range {emin}-{emax} keV is invalid")]
    InvalidRange { emin: f64, emax: f64 },
}
