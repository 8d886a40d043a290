// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The instrument specifications that every registry starts with.

use super::{BkgndSpec, ChipSpec, ImagingSpec, InstrumentSpec, PsfSpec};

const CYCLES: [u32; 2] = [0, 22];

fn boxes(chips: &[(f64, f64, f64, f64)]) -> Option<Vec<ChipSpec>> {
    Some(
        chips
            .iter()
            .map(|&(x0, y0, width, height)| ChipSpec::Box {
                x0,
                y0,
                width,
                height,
            })
            .collect(),
    )
}

fn single(file: &str, area: f64) -> Option<BkgndSpec> {
    Some(BkgndSpec::Single(file.to_string(), area))
}

fn image_psf(file: &str, extension: i64) -> Option<PsfSpec> {
    Some(PsfSpec::Image {
        file: file.to_string(),
        extension,
    })
}

fn multi_image_psf(file: &str) -> Option<PsfSpec> {
    Some(PsfSpec::MultiImage(file.to_string()))
}

fn imager(
    name: &str,
    arf: &str,
    rmf: &str,
    bkgnd: Option<BkgndSpec>,
    focal_length: f64,
    imaging: ImagingSpec,
) -> InstrumentSpec {
    InstrumentSpec {
        name: name.to_string(),
        arf: arf.to_string(),
        rmf: rmf.to_string(),
        bkgnd,
        focal_length,
        grating: false,
        imaging: Some(imaging),
    }
}

fn grating(name: &str, arf: &str, rmf: &str) -> InstrumentSpec {
    InstrumentSpec {
        name: name.to_string(),
        arf: arf.to_string(),
        rmf: rmf.to_string(),
        bkgnd: None,
        focal_length: 10.0,
        grating: true,
        imaging: None,
    }
}

/// A single square chip covering `num_pixels` on a side.
fn square(fov: f64, num_pixels: u32, dither: bool, psf: Option<PsfSpec>) -> ImagingSpec {
    let n = num_pixels as f64;
    ImagingSpec {
        fov,
        num_pixels,
        aimpt_coords: [0.0, 0.0],
        chips: boxes(&[(0.0, 0.0, n, n)]),
        dither,
        psf,
    }
}

pub(super) fn builtin_instruments() -> Vec<InstrumentSpec> {
    let mut specs = vec![];

    // Lynx
    let lynx_psf = || image_psf("chandra_psf.fits", 6);
    specs.push(imager(
        "lynx_hdxi",
        "xrs_hdxi_3x10.arf",
        "xrs_hdxi.rmf",
        single("lynx_hdxi_particle_bkgnd.pha", 1.0),
        10.0,
        square(22.0, 4096, true, lynx_psf()),
    ));
    for (name, arf, rmf, fov, num_pixels) in [
        (
            "lynx_lxm",
            "xrs_mucal_3x10_3.0eV.arf",
            "xrs_mucal_3.0eV.rmf",
            5.0,
            300,
        ),
        (
            "lynx_lxm_enh",
            "xrs_mucal_3x10_1.5eV.arf",
            "xrs_mucal_1.5eV.rmf",
            1.0,
            120,
        ),
        (
            "lynx_lxm_ultra",
            "xrs_mucal_3x10_0.3eV.arf",
            "xrs_mucal_0.3eV.rmf",
            1.0,
            60,
        ),
    ] {
        specs.push(imager(
            name,
            arf,
            rmf,
            single(&format!("{name}_particle_bkgnd.pha"), 1.0),
            10.0,
            square(fov, num_pixels, true, lynx_psf()),
        ));
    }
    specs.push(grating("lynx_xgs", "xrs_cat.arf", "xrs_cat.rmf"));

    // Athena
    let athena_psf = || multi_image_psf("athena_psf_15row.fits");
    specs.push(imager(
        "athena_wfi",
        "athena_sixte_wfi_wo_filter_v20190122.arf",
        "athena_wfi_sixte_v20150504.rmf",
        single("sixte_wfi_particle_bkg_20190829.pha", 79552.92570677),
        12.0,
        ImagingSpec {
            fov: 40.147153,
            num_pixels: 1078,
            aimpt_coords: [53.69, -53.69],
            chips: boxes(&[
                (-283.0, -283.0, 512.0, 512.0),
                (283.0, -283.0, 512.0, 512.0),
                (-283.0, 283.0, 512.0, 512.0),
                (283.0, 283.0, 512.0, 512.0),
            ]),
            dither: true,
            psf: athena_psf(),
        },
    ));
    specs.push(imager(
        "athena_xifu",
        "sixte_xifu_cc_baselineconf_20180821.arf",
        "XIFU_CC_BASELINECONF_2018_10_10.rmf",
        single("xifu_nxb_20181209.pha", 79552.92570677),
        12.0,
        ImagingSpec {
            fov: 5.991992621478149,
            num_pixels: 84,
            aimpt_coords: [0.0, 0.0],
            chips: Some(vec![ChipSpec::Polygon {
                x: vec![-33.0, 0.0, 33.0, 33.0, 0.0, -33.0],
                y: vec![20.0, 38.0, 20.0, -20.0, -38.0, -20.0],
            }]),
            dither: true,
            psf: athena_psf(),
        },
    ));

    // Chandra
    for cycle in CYCLES {
        let name = format!("chandra_acisi_cy{cycle}");
        specs.push(imager(
            &name,
            &format!("acisi_aimpt_cy{cycle}.arf"),
            &format!("acisi_aimpt_cy{cycle}.rmf"),
            single(&format!("{name}_particle_bkgnd.pha"), 1.0),
            10.0,
            ImagingSpec {
                fov: 20.008,
                num_pixels: 2440,
                aimpt_coords: [86.0, 57.0],
                chips: boxes(&[
                    (-523.0, -523.0, 1024.0, 1024.0),
                    (523.0, -523.0, 1024.0, 1024.0),
                    (-523.0, 523.0, 1024.0, 1024.0),
                    (523.0, 523.0, 1024.0, 1024.0),
                ]),
                dither: true,
                psf: multi_image_psf("chandra_psf.fits"),
            },
        ));
    }
    for cycle in CYCLES {
        let fi = format!("chandra_acisi_cy{cycle}_particle_bkgnd.pha");
        let bi = format!("chandra_aciss_cy{cycle}_particle_bkgnd.pha");
        // S1 and S3 are back-illuminated.
        let bkgnd = [&fi, &bi, &fi, &bi, &fi, &fi]
            .into_iter()
            .map(|file| (file.clone(), 1.0))
            .collect();
        specs.push(imager(
            &format!("chandra_aciss_cy{cycle}"),
            &format!("aciss_aimpt_cy{cycle}.arf"),
            &format!("aciss_aimpt_cy{cycle}.rmf"),
            Some(BkgndSpec::PerChip(bkgnd)),
            10.0,
            ImagingSpec {
                fov: 50.02,
                num_pixels: 6100,
                aimpt_coords: [206.0, 0.0],
                chips: boxes(&[
                    (-2605.0, 0.0, 1024.0, 1024.0),
                    (-1563.0, 0.0, 1024.0, 1024.0),
                    (-521.0, 0.0, 1024.0, 1024.0),
                    (521.0, 0.0, 1024.0, 1024.0),
                    (1563.0, 0.0, 1024.0, 1024.0),
                    (2605.0, 0.0, 1024.0, 1024.0),
                ]),
                dither: true,
                psf: multi_image_psf("chandra_psf.fits"),
            },
        ));
    }
    for energy in ["meg", "heg"] {
        for (order, order_num) in [("p1", 1), ("m1", -1)] {
            for cycle in CYCLES {
                let resp_name = format!("chandra_aciss_{energy}{order_num}_cy{cycle}");
                specs.push(grating(
                    &format!("chandra_aciss_{energy}_{order}_cy{cycle}"),
                    &format!("{resp_name}.garf"),
                    &format!("{resp_name}.grmf"),
                ));
            }
        }
    }

    // XRISM
    specs.push(imager(
        "xrism_resolve",
        "xarm_res_flt_pa_20170818.arf",
        "xarm_res_h5ev_20170818.rmf",
        single("sxs_nxb_4ev_20110211_1Gs.pha", 9.130329009932256),
        5.6,
        square(
            3.06450576,
            6,
            false,
            multi_image_psf("sxs_psfimage_20140618.fits"),
        ),
    ));

    // AXIS
    specs.push(imager(
        "axis",
        "axis-31jan18.arf",
        "axis-31jan18.rmf",
        single("axis_nxb_leo_fov_10Msec_20180205.pha", 225.0),
        9.5,
        square(24.0, 4000, true, multi_image_psf("axis_psf_gauss_v1.fits")),
    ));

    // STAR-X
    specs.push(imager(
        "star-x",
        "starx_2020-11-26_fov_avg.arf",
        "starx.rmf",
        None,
        4.5,
        square(60.0, 3600, true, Some(PsfSpec::Gaussian(3.0))),
    ));

    specs
}
