// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Energies are in keV, angles on the
sky in degrees (or arcminutes where stated), areas in cm² and times in
seconds.
 */

/// The number of ergs in one keV.
pub const ERG_PER_KEV: f64 = 1.602_176_634e-9;

/// The number of square arcminutes in one steradian.
pub const SQ_ARCMIN_PER_SR: f64 = (180.0 / std::f64::consts::PI * 60.0)
    * (180.0 / std::f64::consts::PI * 60.0);

/// The HDU version written into every SIMPUT extension.
pub const SIMPUT_HDUVERS: &str = "1.1.0";

/// The string used in the catalog index for "no image" and "no timing".
pub const SIMPUT_NULL: &str = "NULL";

/// The width of the fixed-width string columns of the catalog index.
pub const SIMPUT_STRING_WIDTH: usize = 80;
