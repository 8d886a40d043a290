// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A minimal gnomonic (`RA---TAN`/`DEC--TAN`) world coordinate system.

/// A tangent-plane projection. Pixel coordinates follow the FITS convention
/// (1-indexed, pixel centres on integers).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TanWcs {
    /// The reference sky coordinate (RA, Dec) \[degrees\].
    pub crval: (f64, f64),

    /// The reference pixel.
    pub crpix: (f64, f64),

    /// The pixel scale \[degrees per pixel\]. The first axis is negative so
    /// that RA increases to the left.
    pub cdelt: (f64, f64),
}

impl TanWcs {
    /// A square projection `width` arcminutes across with `nx` pixels on a
    /// side, centred on (`ra0`, `dec0`).
    pub fn new(ra0: f64, dec0: f64, width: f64, nx: usize) -> TanWcs {
        let scale = width / 60.0 / nx as f64;
        let crpix = 0.5 * (nx as f64 + 1.0);
        TanWcs {
            crval: (ra0, dec0),
            crpix: (crpix, crpix),
            cdelt: (-scale, scale),
        }
    }

    /// Convert tangent-plane offsets (east, north) \[arcminutes\] to (RA, Dec)
    /// \[degrees\].
    pub fn offset_to_world(&self, xi: f64, eta: f64) -> (f64, f64) {
        let xi = (xi / 60.0).to_radians();
        let eta = (eta / 60.0).to_radians();
        let ra0 = self.crval.0.to_radians();
        let (s_dec0, c_dec0) = self.crval.1.to_radians().sin_cos();

        let dec = ((s_dec0 + eta * c_dec0) / (1.0 + xi * xi + eta * eta).sqrt()).asin();
        let ra = ra0 + xi.atan2(c_dec0 - eta * s_dec0);
        (ra.to_degrees().rem_euclid(360.0), dec.to_degrees())
    }

    /// Convert (RA, Dec) \[degrees\] to tangent-plane offsets (east, north)
    /// \[arcminutes\]. `None` is returned for points on the far hemisphere.
    pub fn world_to_offset(&self, ra: f64, dec: f64) -> Option<(f64, f64)> {
        let d_ra = (ra - self.crval.0).to_radians();
        let (s_dec0, c_dec0) = self.crval.1.to_radians().sin_cos();
        let (s_dec, c_dec) = dec.to_radians().sin_cos();
        let cos_c = s_dec0 * s_dec + c_dec0 * c_dec * d_ra.cos();
        if cos_c <= 0.0 {
            return None;
        }
        let xi = c_dec * d_ra.sin() / cos_c;
        let eta = (c_dec0 * s_dec - s_dec0 * c_dec * d_ra.cos()) / cos_c;
        Some((xi.to_degrees() * 60.0, eta.to_degrees() * 60.0))
    }

    /// Convert FITS pixel coordinates to (RA, Dec) \[degrees\].
    pub fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let xi = self.cdelt.0 * (x - self.crpix.0) * 60.0;
        let eta = self.cdelt.1 * (y - self.crpix.1) * 60.0;
        self.offset_to_world(xi, eta)
    }

    /// Convert (RA, Dec) \[degrees\] to FITS pixel coordinates.
    pub fn world_to_pixel(&self, ra: f64, dec: f64) -> Option<(f64, f64)> {
        self.world_to_offset(ra, dec).map(|(xi, eta)| {
            (
                xi / 60.0 / self.cdelt.0 + self.crpix.0,
                eta / 60.0 / self.cdelt.1 + self.crpix.1,
            )
        })
    }
}
