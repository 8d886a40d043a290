// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;
use crate::misc::make_rng;

#[test]
fn test_wcs_round_trip() {
    let wcs = TanWcs::new(30.0, 45.0, 20.0, 100);
    let (ra, dec) = wcs.pixel_to_world(wcs.crpix.0, wcs.crpix.1);
    assert_abs_diff_eq!(ra, 30.0, epsilon = 1e-10);
    assert_abs_diff_eq!(dec, 45.0, epsilon = 1e-10);

    let (ra, dec) = wcs.pixel_to_world(10.0, 80.0);
    let (x, y) = wcs.world_to_pixel(ra, dec).unwrap();
    assert_abs_diff_eq!(x, 10.0, epsilon = 1e-8);
    assert_abs_diff_eq!(y, 80.0, epsilon = 1e-8);

    // RA increases to the left.
    let (ra_left, _) = wcs.pixel_to_world(1.0, wcs.crpix.1);
    assert!(ra_left > 30.0);
}

#[test]
fn test_wcs_wraps_ra() {
    let wcs = TanWcs::new(0.0, 0.0, 60.0, 10);
    let (ra, _) = wcs.offset_to_world(-10.0, 0.0);
    assert!(ra > 359.0 && ra < 360.0);
    assert!(wcs.world_to_offset(180.0, 0.0).is_none());
}

#[test]
fn test_point_source() {
    let model = PointSourceModel {
        ra: 30.0,
        dec: 45.0,
    };
    let mut rng = make_rng(Some(1));
    let (ra, dec) = model.generate_coords(5, &mut rng);
    assert_eq!(ra, vec![30.0; 5]);
    assert_eq!(dec, vec![45.0; 5]);

    let image = model.generate_image(1.0, 11);
    assert_eq!(image.dims(), (11, 11));
    assert_abs_diff_eq!(image.data[(5, 5)], 1.0);
    assert_abs_diff_eq!(image.data.sum(), 1.0);
    assert_eq!(image.ref_coord(), (30.0, 45.0));
}

#[test]
fn test_fill_field() {
    let model = FillFieldModel {
        ra0: 30.0,
        dec0: 45.0,
        width: 10.0,
    };
    let mut rng = make_rng(Some(2));
    let (ra, dec) = model.generate_coords(1000, &mut rng);
    let wcs = TanWcs::new(30.0, 45.0, 10.0, 1);
    for (ra, dec) in ra.into_iter().zip(dec) {
        let (xi, eta) = wcs.world_to_offset(ra, dec).unwrap();
        assert!(xi.abs() <= 5.0 + 1e-9);
        assert!(eta.abs() <= 5.0 + 1e-9);
    }

    // The field is twice the width of the image, so every pixel is lit.
    let image = model.generate_image(5.0, 10);
    assert_abs_diff_eq!(image.data[(0, 0)], 0.01, epsilon = 1e-12);
    assert_abs_diff_eq!(image.data.sum(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_beta_model() {
    let model = BetaModel {
        ra0: 30.0,
        dec0: 45.0,
        r_c: 20.0,
        beta: 2.0 / 3.0,
    };
    let mut rng = make_rng(Some(3));
    let (ra, dec) = model.generate_coords(4000, &mut rng);
    let wcs = TanWcs::new(30.0, 45.0, 1.0, 1);
    let radii: Vec<f64> = ra
        .into_iter()
        .zip(dec)
        .map(|(ra, dec)| {
            let (xi, eta) = wcs.world_to_offset(ra, dec).unwrap();
            (xi * xi + eta * eta).sqrt()
        })
        .collect();
    // For β = 2/3, half of the flux is within √3 core radii.
    let r_half = 3.0_f64.sqrt() * 20.0 / 60.0;
    let frac = radii.iter().filter(|&&r| r < r_half).count() as f64 / radii.len() as f64;
    assert_abs_diff_eq!(frac, 0.5, epsilon = 0.04);

    let image = model.generate_image(4.0, 21);
    assert_abs_diff_eq!(image.data.sum(), 1.0, epsilon = 1e-12);
    let peak = image.data[(10, 10)];
    assert!(image.data.iter().all(|&v| v <= peak));
}
