// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning background spectra into detector events.

use std::path::Path;

use log::{debug, info};
use rand::{Rng, RngCore};

use super::{BackgroundError, ConvolvedBackgroundSpectrum};
use crate::{
    instrument::{BkgndSpec, ChipSpec, InstrumentSpec},
    response::ResponseMatrix,
};

/// The number of positions to try inside a chip's bounding box before giving
/// up on a chip.
const MAX_PLACEMENT_ATTEMPTS: usize = 100_000;

/// A part of the detector that events can land on.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorRegion {
    /// The shape of the region in detector pixel coordinates, relative to the
    /// aimpoint.
    pub chip: ChipSpec,

    /// The solid angle covered by the region \[arcmin²\].
    pub fov_area: f64,
}

/// The observation that background events are made for.
#[derive(Debug, Clone, PartialEq)]
pub struct EventParams {
    /// \[seconds\]
    pub exposure_time: f64,

    /// The detector regions (chips); events are drawn separately for each.
    pub regions: Vec<DetectorRegion>,

    /// The detector coordinates of the aimpoint; added to every event
    /// position.
    pub aimpt_coords: [f64; 2],
}

impl EventParams {
    /// Derive the event parameters of an imaging instrument. Each chip becomes
    /// a region whose solid angle is its pixel area times the square of the
    /// pixel scale.
    pub fn from_instrument(
        spec: &InstrumentSpec,
        exposure_time: f64,
    ) -> Result<EventParams, BackgroundError> {
        if !(exposure_time.is_finite() && exposure_time >= 0.0) {
            return Err(BackgroundError::BadExposureTime(exposure_time));
        }
        let imaging = spec.imaging_spec()?;
        let pixel_scale = imaging.pixel_scale();
        let regions = imaging
            .chip_regions()
            .into_iter()
            .map(|chip| DetectorRegion {
                fov_area: chip.pixel_area() * pixel_scale * pixel_scale,
                chip,
            })
            .collect();
        Ok(EventParams {
            exposure_time,
            regions,
            aimpt_coords: imaging.aimpt_coords,
        })
    }
}

/// Detector events. Events are ordered by the region they fell on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundEvents {
    /// \[keV\]
    pub energy: Vec<f64>,

    /// Detector x coordinates \[pixels\].
    pub detx: Vec<f64>,

    /// Detector y coordinates \[pixels\].
    pub dety: Vec<f64>,

    /// The index of the region (chip) of each event.
    pub chip_id: Vec<usize>,

    pub channel: Vec<i32>,
}

impl BackgroundEvents {
    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }
}

/// Draw background events from `bkgnd` on every region of the detector. The
/// `label` names the background in messages. It is an error for no events to
/// be drawn at all.
pub fn synthesize_background<R: RngCore>(
    label: &str,
    bkgnd: &ConvolvedBackgroundSpectrum,
    params: &EventParams,
    rmf: &dyn ResponseMatrix,
    rng: &mut R,
) -> Result<BackgroundEvents, BackgroundError> {
    let spectra = vec![bkgnd; params.regions.len()];
    synthesize_regions(label, &spectra, params, rmf, rng)
}

/// Draw the particle background of an instrument. Background files are
/// looked up relative to `data_dir`. A single `[file, area]` pair is used for
/// every chip; otherwise there must be one pair per chip.
pub fn make_instrument_background<R: RngCore>(
    bkgnd: &BkgndSpec,
    data_dir: &Path,
    params: &EventParams,
    rmf: &dyn ResponseMatrix,
    rng: &mut R,
) -> Result<BackgroundEvents, BackgroundError> {
    let spectra = match bkgnd {
        BkgndSpec::Alias(alias) => return Err(BackgroundError::UnresolvedAlias(alias.clone())),
        BkgndSpec::Single(file, area) => {
            let spectrum = ConvolvedBackgroundSpectrum::from_file(data_dir.join(file), *area)?;
            vec![spectrum; params.regions.len()]
        }
        BkgndSpec::PerChip(pairs) => pairs
            .iter()
            .map(|(file, area)| ConvolvedBackgroundSpectrum::from_file(data_dir.join(file), *area))
            .collect::<Result<Vec<_>, _>>()?,
    };
    let spectra: Vec<&ConvolvedBackgroundSpectrum> = spectra.iter().collect();
    synthesize_regions("instrumental background", &spectra, params, rmf, rng)
}

fn synthesize_regions<R: RngCore>(
    label: &str,
    spectra: &[&ConvolvedBackgroundSpectrum],
    params: &EventParams,
    rmf: &dyn ResponseMatrix,
    rng: &mut R,
) -> Result<BackgroundEvents, BackgroundError> {
    if spectra.len() != params.regions.len() {
        return Err(BackgroundError::RegionCountMismatch {
            num_spectra: spectra.len(),
            num_regions: params.regions.len(),
        });
    }

    // Regions are drawn in order so that a seeded generator gives the same
    // events every time.
    let energies: Vec<Vec<f64>> = spectra
        .iter()
        .zip(&params.regions)
        .map(|(spectrum, region)| {
            spectrum
                .generate_energies(params.exposure_time, region.fov_area, rng)
                .energies
        })
        .collect();
    let num_events: usize = energies.iter().map(Vec::len).sum();
    if num_events == 0 {
        return Err(BackgroundError::NoEvents {
            label: label.to_string(),
        });
    }
    info!("Making {num_events} events from the {label}.");

    make_uniform_background(energies, params, rmf, rng)
}

/// Scatter events uniformly over the detector regions. `energies` holds the
/// event energies of each region, in the same order as `params.regions`.
pub fn make_uniform_background<R: RngCore>(
    energies: Vec<Vec<f64>>,
    params: &EventParams,
    rmf: &dyn ResponseMatrix,
    rng: &mut R,
) -> Result<BackgroundEvents, BackgroundError> {
    if energies.len() != params.regions.len() {
        return Err(BackgroundError::RegionCountMismatch {
            num_spectra: energies.len(),
            num_regions: params.regions.len(),
        });
    }

    let mut events = BackgroundEvents::default();
    let regions = energies.into_iter().zip(&params.regions);
    for (chip_id, (region_energies, region)) in regions.enumerate() {
        if region_energies.is_empty() {
            continue;
        }
        debug!("Placing {} events on chip {chip_id}", region_energies.len());
        for _ in 0..region_energies.len() {
            let (x, y) = place_in_chip(&region.chip, rng)
                .ok_or(BackgroundError::DegenerateChip { chip_id })?;
            events.detx.push(x + params.aimpt_coords[0]);
            events.dety.push(y + params.aimpt_coords[1]);
        }
        events.chip_id.extend(std::iter::repeat(chip_id).take(region_energies.len()));
        events.channel.extend(rmf.channels(&region_energies, rng));
        events.energy.extend(region_energies);
    }
    Ok(events)
}

/// A uniformly random position inside a chip. Boxes are sampled directly;
/// other shapes use rejection sampling within their bounding box.
fn place_in_chip<R: Rng + ?Sized>(chip: &ChipSpec, rng: &mut R) -> Option<(f64, f64)> {
    let (x_min, x_max, y_min, y_max) = chip.bounding_box();
    let mut draw = || {
        (
            x_min + rng.random::<f64>() * (x_max - x_min),
            y_min + rng.random::<f64>() * (y_max - y_min),
        )
    };
    if !(chip.pixel_area() > 0.0) {
        return None;
    }
    if let ChipSpec::Box { .. } = chip {
        return Some(draw());
    }
    (0..MAX_PLACEMENT_ATTEMPTS)
        .map(|_| draw())
        .find(|&(x, y)| chip.contains(x, y))
}
