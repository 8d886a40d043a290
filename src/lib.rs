// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Mock X-ray observations.

Sources on the sky are stored in SIMPUT catalogs ([`simput`]), instruments are
described by specifications held in a registry ([`instrument`]), and
background events are synthesised by folding background spectra through an
instrument's response ([`background`]).
 */

pub mod background;
mod cli;
pub mod constants;
pub mod instrument;
pub mod io;
pub mod misc;
pub mod response;
pub mod simput;
pub mod spatial;
pub mod spectra;

// Re-exports.
pub use cli::{Xmock, XmockError};
pub use io::FitsError;
pub use misc::make_rng;
