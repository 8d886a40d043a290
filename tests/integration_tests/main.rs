// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod instruments;
mod no_stderr;
mod simput_info;

use std::{path::Path, process::Output, str::from_utf8};

use assert_cmd::{output::OutputError, Command};

use xmock::{
    simput::{SimputCatalog, SimputSource},
    spectra::Spectrum,
};

fn xmock() -> Command {
    Command::cargo_bin("xmock").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Write a catalog with a spectrum source and a photon list, the latter in a
/// separate file.
fn make_catalog(dir: &Path) -> SimputCatalog {
    let spectrum = Spectrum::from_power_law(2.0, 1e-2, 0.5, 10.0, 50).unwrap();
    let source = SimputSource::from_spectrum("power law", spectrum, 150.0, -20.0);
    let mut catalog =
        SimputCatalog::from_source(dir.join("cat.fits"), &source, None, false).unwrap();

    let photons = SimputSource::photon_list(
        vec![150.0, 150.1],
        vec![-20.0, -20.1],
        vec![1.0, 2.0],
        1e-13,
        "photons",
    )
    .unwrap();
    catalog
        .append(&photons, Some(&dir.join("photons.fits")), false)
        .unwrap();
    catalog
}
