// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The astrophysical X-ray foreground.

use rand::RngCore;

use super::{
    synthesize_background, BackgroundError, BackgroundEvents, BackgroundSpectrum,
    ConvolvedBackgroundSpectrum, EventParams,
};
use crate::response::{EffectiveArea, ResponseMatrix};

/// Make events from the cosmic X-ray background (Hickox & Markevitch 2007) as
/// seen through `arf`, spread uniformly over the detector.
pub fn make_foreground<R: RngCore>(
    params: &EventParams,
    arf: &EffectiveArea,
    rmf: &dyn ResponseMatrix,
    rng: &mut R,
) -> Result<BackgroundEvents, BackgroundError> {
    let cxb = BackgroundSpectrum::hickox_markevitch()?;
    let convolved = ConvolvedBackgroundSpectrum::new(&cxb, arf);
    synthesize_background("astrophysical foreground", &convolved, params, rmf, rng)
}
