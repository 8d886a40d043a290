// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;

use indoc::indoc;
use serde_json::Value;
use tempfile::TempDir;

use crate::{get_cmd_output, xmock};

#[test]
fn test_list_instruments() {
    let cmd = xmock().args(["instruments", "--names-only"]).ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("lynx_hdxi"));
    assert!(stdout.contains("chandra_aciss_cy22"));
    assert!(stdout.contains("22 instruments"));
}

#[test]
fn test_list_instruments_with_extra_spec() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spec = tmp_dir.path().join("mine.yaml");
    fs::write(
        &spec,
        indoc! {r#"
            name: my_spectrometer
            arf: my.arf
            rmf: my.rmf
            bkgnd: null
            focal_length: 2.0
            imaging: false
            grating: false
        "#},
    )
    .unwrap();

    let cmd = xmock()
        .args(["instruments", &format!("{}", spec.display())])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Instrument: my_spectrometer"));
    assert!(stdout.contains("23 instruments"));
}

#[test]
fn test_bad_spec_file_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spec = tmp_dir.path().join("bad.json");
    // Gratings instruments can't be imaging instruments.
    fs::write(
        &spec,
        r#"{"name": "bad", "arf": "a", "rmf": "r", "bkgnd": null, "focal_length": 1.0, "imaging": true, "grating": true,
            "fov": 1.0, "num_pixels": 10, "aimpt_coords": [0.0, 0.0], "chips": null, "dither": false, "psf": null}"#,
    )
    .unwrap();
    let cmd = xmock()
        .args(["instruments", &format!("{}", spec.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("gratings"), "{stderr}");
    assert!(stderr.contains("xmock instruments"), "{stderr}");
}

#[test]
fn test_instrument_json() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("hdxi.json");
    let cmd = xmock()
        .args([
            "instrument-json",
            "lynx_hdxi",
            &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["name"], "lynx_hdxi");
    assert_eq!(json["imaging"], true);
    assert_eq!(json["grating"], false);
}

#[test]
fn test_instrument_json_unknown_instrument() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("nothing.json");
    let cmd = xmock()
        .args([
            "instrument-json",
            "not_an_instrument",
            &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("not in registry"), "{stderr}");
    assert!(!output.exists());
}
