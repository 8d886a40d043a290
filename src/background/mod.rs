// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Background (and foreground) events that are spread uniformly over the
//! detector, rather than coming from a source on the sky.

mod error;
mod events;
mod foreground;
mod spectra;

pub use error::BackgroundError;
pub use events::{
    make_instrument_background, make_uniform_background, synthesize_background,
    BackgroundEvents, DetectorRegion, EventParams,
};
pub use foreground::make_foreground;
pub use spectra::{BackgroundSpectrum, ConvolvedBackgroundSpectrum};
