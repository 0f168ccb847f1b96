// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod calibrate;
mod spec_index;
mod stack;

use std::{
    fs::write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

fn fluxcal() -> Command {
    Command::cargo_bin("fluxcal").unwrap()
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

/// An 8-bin profile with a two-bin pulse of the given height sitting on a
/// baseline alternating between 1 and 3.
fn pulse(height: f64) -> Vec<f64> {
    vec![1.0, 3.0, height, height, 1.0, 3.0, 1.0, 3.0]
}

/// Write a profile file with the given header lines (without their leading
/// `#`).
fn write_profile<P: AsRef<Path>>(path: P, header: &[&str], samples: &[f64]) -> PathBuf {
    let mut contents = String::new();
    for line in header {
        contents.push_str(&format!("# {line}\n"));
    }
    for s in samples {
        contents.push_str(&format!("{s}\n"));
    }
    write(path.as_ref(), contents).unwrap();
    path.as_ref().to_path_buf()
}

/// The calibration arguments shared by every test: Tsys 2 K, gain 1 K/Jy, 2
/// polarisations and an on-pulse window of [0.25, 0.5).
const CAL_ARGS: [&str; 10] = [
    "-T", "2", "-G", "1", "-p", "2", "--on-phase", "0.25", "--off-phase", "0.5",
];
