// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spatial models of sky emission.
//!
//! A spatial model can either draw sky positions for photons or render itself
//! into a [`SkyImage`] that a SIMPUT source can carry.

#[cfg(test)]
mod tests;
mod wcs;

pub use wcs::TanWcs;

use ndarray::Array2;
use rand::{Rng, RngCore};

/// A rendered, unit-normalised image of a spatial model on a tangent plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyImage {
    /// The pixel values. The first axis is y (rows), the second x (columns),
    /// as in a FITS image.
    pub data: Array2<f64>,

    pub wcs: TanWcs,
}

impl SkyImage {
    /// The (RA, Dec) of the reference pixel \[degrees\].
    pub fn ref_coord(&self) -> (f64, f64) {
        self.wcs.crval
    }

    /// Image dimensions as (nx, ny).
    pub fn dims(&self) -> (usize, usize) {
        let (ny, nx) = self.data.dim();
        (nx, ny)
    }
}

/// Something that describes how emission is distributed on the sky.
pub trait SpatialModel {
    /// The reference (RA, Dec) of the model \[degrees\].
    fn ref_coord(&self) -> (f64, f64);

    /// Draw `num` sky positions. Returns (RA, Dec) vectors \[degrees\].
    fn generate_coords(&self, num: usize, rng: &mut dyn RngCore) -> (Vec<f64>, Vec<f64>);

    /// The relative surface brightness at a tangent-plane offset (east, north)
    /// from the reference coordinate \[arcminutes\].
    fn brightness(&self, xi: f64, eta: f64) -> f64;

    /// Render the model into a square image `width` arcminutes across with
    /// `nx` pixels on a side, centred on the reference coordinate. The image
    /// is normalised to sum to 1 (unless it's completely empty).
    fn generate_image(&self, width: f64, nx: usize) -> SkyImage {
        let (ra0, dec0) = self.ref_coord();
        let wcs = TanWcs::new(ra0, dec0, width, nx);
        let mut data = Array2::from_shape_fn((nx, nx), |(j, i)| {
            let xi = wcs.cdelt.0 * (i as f64 + 1.0 - wcs.crpix.0) * 60.0;
            let eta = wcs.cdelt.1 * (j as f64 + 1.0 - wcs.crpix.1) * 60.0;
            self.brightness(xi, eta)
        });
        let total = data.sum();
        if total > 0.0 {
            data /= total;
        } else if nx > 0 {
            // Unresolved emission (e.g. a point source) lands in the pixel
            // containing the reference coordinate.
            data[(nx / 2, nx / 2)] = 1.0;
        }
        SkyImage { data, wcs }
    }
}

/// All emission from a single position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSourceModel {
    pub ra: f64,
    pub dec: f64,
}

impl SpatialModel for PointSourceModel {
    fn ref_coord(&self) -> (f64, f64) {
        (self.ra, self.dec)
    }

    fn generate_coords(&self, num: usize, _rng: &mut dyn RngCore) -> (Vec<f64>, Vec<f64>) {
        (vec![self.ra; num], vec![self.dec; num])
    }

    fn brightness(&self, _xi: f64, _eta: f64) -> f64 {
        0.0
    }
}

/// Uniform emission over a square field `width` arcminutes across.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillFieldModel {
    pub ra0: f64,
    pub dec0: f64,

    /// \[arcminutes\]
    pub width: f64,
}

impl SpatialModel for FillFieldModel {
    fn ref_coord(&self) -> (f64, f64) {
        (self.ra0, self.dec0)
    }

    fn generate_coords(&self, num: usize, rng: &mut dyn RngCore) -> (Vec<f64>, Vec<f64>) {
        let wcs = TanWcs::new(self.ra0, self.dec0, self.width, 1);
        (0..num)
            .map(|_| {
                let xi = (rng.random::<f64>() - 0.5) * self.width;
                let eta = (rng.random::<f64>() - 0.5) * self.width;
                wcs.offset_to_world(xi, eta)
            })
            .unzip()
    }

    fn brightness(&self, xi: f64, eta: f64) -> f64 {
        let half = 0.5 * self.width;
        if xi.abs() <= half && eta.abs() <= half {
            1.0
        } else {
            0.0
        }
    }
}

/// An isothermal beta-model surface brightness profile,
/// `S(r) ∝ (1 + (r/r_c)²)^(-3β + 1/2)`. β must exceed 0.5 for the profile to
/// be normalisable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaModel {
    pub ra0: f64,
    pub dec0: f64,

    /// The core radius \[arcseconds\].
    pub r_c: f64,

    pub beta: f64,
}

impl SpatialModel for BetaModel {
    fn ref_coord(&self) -> (f64, f64) {
        (self.ra0, self.dec0)
    }

    fn generate_coords(&self, num: usize, rng: &mut dyn RngCore) -> (Vec<f64>, Vec<f64>) {
        let wcs = TanWcs::new(self.ra0, self.dec0, 1.0, 1);
        let r_c = self.r_c / 60.0;
        // Inverse of the enclosed-flux fraction 1 - (1 + x²)^(3/2 - 3β).
        let exponent = 1.0 / (1.5 - 3.0 * self.beta);
        (0..num)
            .map(|_| {
                let u: f64 = rng.random();
                let r = r_c * ((1.0 - u).powf(exponent) - 1.0).max(0.0).sqrt();
                let theta = rng.random::<f64>() * std::f64::consts::TAU;
                wcs.offset_to_world(r * theta.cos(), r * theta.sin())
            })
            .unzip()
    }

    fn brightness(&self, xi: f64, eta: f64) -> f64 {
        let x2 = (xi * xi + eta * eta) / (self.r_c / 60.0).powi(2);
        (1.0 + x2).powf(0.5 - 3.0 * self.beta)
    }
}
