// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with instrument responses.

use thiserror::Error;

use crate::io::FitsError;

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("Effective area arrays have mismatched lengths: {num_elo} ENERG_LO, {num_ehi} ENERG_HI, {num_area} SPECRESP")]
    AreaLengthMismatch {
        num_elo: usize,
        num_ehi: usize,
        num_area: usize,
    },

    #[error("Effective area has no energy bins")]
    EmptyArea,

    #[error("Channel energy bounds must be non-empty and increasing")]
    BadEbounds,

    #[error("{0} has no {1} extension")]
    MissingExtension(String, &'static str),

    #[error(transparent)]
    Fits(#[from] FitsError),
}
