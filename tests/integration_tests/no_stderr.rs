// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, make_catalog, xmock};

#[test]
fn test_instruments_no_stderr() {
    let cmd = xmock().args(["instruments"]).ok();
    assert!(cmd.is_ok(), "instruments failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_simput_info_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let catalog = make_catalog(tmp_dir.path());
    let cmd = xmock()
        .args([
            "simput-info",
            &format!("{}", catalog.path().display()),
            "--resolve",
        ])
        .ok();
    assert!(cmd.is_ok(), "simput-info failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
