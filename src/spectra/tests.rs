// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::*;
use crate::misc::make_rng;

#[test]
fn test_new_rejects_bad_bins() {
    assert_eq!(
        Spectrum::new(vec![1.0], vec![]),
        Err(SpectrumError::TooFewBins(1))
    );
    assert_eq!(
        Spectrum::new(vec![1.0, 2.0, 3.0], vec![1.0]),
        Err(SpectrumError::LengthMismatch {
            num_edges: 3,
            num_fluxes: 1
        })
    );
    assert_eq!(
        Spectrum::new(vec![1.0, 2.0, 2.0], vec![1.0, 1.0]),
        Err(SpectrumError::EdgesNotIncreasing {
            index: 2,
            value: 2.0
        })
    );
}

#[test]
fn test_constant_spectrum_totals() {
    let spec = Spectrum::from_constant(2.0, 1.0, 3.0, 4).unwrap();
    assert_eq!(spec.num_bins(), 4);
    assert_abs_diff_eq!(spec.emin(), 1.0);
    assert_abs_diff_eq!(spec.emax(), 3.0);
    assert_abs_diff_eq!(spec.total_photon_flux(), 4.0, epsilon = 1e-12);
    // Integral of 2*E from 1 to 3 is 8 keV/(cm² s).
    assert_relative_eq!(spec.total_flux(), 8.0 * ERG_PER_KEV, max_relative = 1e-12);
}

#[test]
fn test_power_law_is_evaluated_at_bin_centres() {
    let spec = Spectrum::from_power_law(2.0, 1.0, 1.0, 3.0, 2).unwrap();
    assert_abs_diff_eq!(spec.flux()[0], 1.0 / 1.5_f64.powi(2), epsilon = 1e-12);
    assert_abs_diff_eq!(spec.flux()[1], 1.0 / 2.5_f64.powi(2), epsilon = 1e-12);
}

#[test]
fn test_from_midpoints_uniform() {
    let spec = Spectrum::from_constant(1.0, 0.5, 10.5, 20).unwrap();
    let rebuilt = Spectrum::from_midpoints(&spec.emid(), spec.flux().to_vec()).unwrap();
    for (a, b) in spec.ebins().iter().zip(rebuilt.ebins()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }
}

#[test]
fn test_from_midpoints_uses_first_spacing() {
    // Non-uniform centres come back with the spacing of the first two.
    let rebuilt = Spectrum::from_midpoints(&[1.0, 2.0, 4.0], vec![1.0; 3]).unwrap();
    assert_eq!(rebuilt.ebins(), &[0.5, 1.5, 3.5, 4.5]);

    assert_eq!(
        Spectrum::from_midpoints(&[1.0], vec![1.0]),
        Err(SpectrumError::TooFewBins(1))
    );
}

#[test]
fn test_generate_energies_counts_and_range() {
    let spec = Spectrum::from_constant(1.0, 2.0, 4.0, 10).unwrap();
    let mut rng = make_rng(Some(1234));
    // Expected number of photons: 1.0 * 2 keV * 100 s * 10 cm² = 2000.
    let e = spec.generate_energies(100.0, 10.0, &mut rng);
    assert!((e.len() as f64 - 2000.0).abs() < 5.0 * 2000.0_f64.sqrt());
    assert!(e.energies.iter().all(|&x| (2.0..=4.0).contains(&x)));
    let mean_energy = e.energies.iter().sum::<f64>() / e.len() as f64;
    assert_abs_diff_eq!(mean_energy, 3.0, epsilon = 0.05);
    assert_relative_eq!(
        e.flux,
        e.energies.iter().sum::<f64>() * ERG_PER_KEV / 1000.0,
        max_relative = 1e-12
    );
}

#[test]
fn test_generate_energies_zero_exposure() {
    let spec = Spectrum::from_constant(1.0, 2.0, 4.0, 10).unwrap();
    let mut rng = make_rng(Some(1));
    let e = spec.generate_energies(0.0, 10.0, &mut rng);
    assert!(e.is_empty());
    assert_abs_diff_eq!(e.flux, 0.0);
}

#[test]
fn test_draw_energies_respects_weights() {
    let mut rng = make_rng(Some(99));
    let energies = draw_energies(&[0.0, 1.0, 2.0], &[0.0, 1.0], 500, &mut rng);
    assert_eq!(energies.len(), 500);
    assert!(energies.iter().all(|&e| (1.0..=2.0).contains(&e)));
}
