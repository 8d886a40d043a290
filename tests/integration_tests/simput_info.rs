// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{get_cmd_output, make_catalog, xmock};

#[test]
fn test_simput_info() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = make_catalog(tmp_dir.path());

    let cmd = xmock()
        .args([
            "simput-info",
            &format!("{}", catalog.path().display()),
            "--resolve",
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("2 sources"), "{stdout}");
    assert!(stdout.contains("power law"), "{stdout}");
    assert!(stdout.contains("[SPECTRUM,1]"), "{stdout}");
    assert!(stdout.contains("spectrum with 50 bins"), "{stdout}");
    assert!(stdout.contains("photons.fits[PHLIST,1]"), "{stdout}");
    assert!(stdout.contains("2 photons"), "{stdout}");
}

#[test]
fn test_simput_info_unresolvable_source() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = make_catalog(tmp_dir.path());
    std::fs::remove_file(tmp_dir.path().join("photons.fits")).unwrap();

    // Without resolving, only the index is read.
    let cmd = xmock()
        .args(["simput-info", &format!("{}", catalog.path().display())])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));

    let cmd = xmock()
        .args([
            "simput-info",
            &format!("{}", catalog.path().display()),
            "--resolve",
        ])
        .ok();
    assert!(cmd.is_err());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.contains("couldn't resolve"), "{stdout}");
    assert!(stderr.contains("1 of 2 sources"), "{stderr}");
}

#[test]
fn test_simput_info_missing_catalog() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let cmd = xmock()
        .args([
            "simput-info",
            &format!("{}", tmp_dir.path().join("nothing.fits").display()),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Couldn't find"), "{stderr}");
}
