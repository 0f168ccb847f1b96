// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::read_to_string;

use tempfile::tempdir;

use crate::*;

#[test]
fn calibrate_a_profile() {
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path().join("raw.txt"), &[], &pulse(10.0));
    let output = dir.path().join("cal.txt");

    let cmd = fluxcal()
        .args(["calibrate", "--no-progress-bars", "-d"])
        .arg(&profile)
        .args(CAL_ARGS)
        .args(["--tobs", "4", "--bw", "1", "-o"])
        .arg(&output)
        .ok();
    assert!(cmd.is_ok(), "calibrate failed on a simple profile");
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Calibration factor"), "{stdout}");

    let written = read_to_string(&output).unwrap();
    let samples: Vec<f64> = written
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(|l| l.trim().parse().unwrap())
        .collect();
    assert_eq!(samples.len(), 8);
    // The pulse is the largest sample; the median baseline is gone.
    assert!(samples[2] > 0.0);
    assert!(samples.iter().all(|&s| s <= samples[2]));
}

#[test]
fn missing_calibration_args_are_reported() {
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path().join("raw.txt"), &[], &pulse(10.0));

    let cmd = fluxcal()
        .args(["calibrate", "--no-progress-bars", "-d"])
        .arg(&profile)
        .args(["--tobs", "4", "--bw", "1"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("--tsys"), "{stderr}");
}

#[test]
fn flat_profiles_fail_to_calibrate() {
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path().join("flat.txt"), &[], &[2.0; 8]);

    let cmd = fluxcal()
        .args(["calibrate", "--no-progress-bars", "-d"])
        .arg(&profile)
        .args(CAL_ARGS)
        .args(["--tobs", "4", "--bw", "1"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("flat.txt"), "{stderr}");
}

#[test]
fn saved_toml_reproduces_a_run() {
    let dir = tempdir().unwrap();
    let profile = write_profile(dir.path().join("raw.txt"), &[], &pulse(10.0));
    let toml = dir.path().join("args.toml");

    let cmd = fluxcal()
        .args(["calibrate", "--no-progress-bars", "--dry-run", "--save-toml"])
        .arg(&toml)
        .arg("-d")
        .arg(&profile)
        .args(CAL_ARGS)
        .args(["--tobs", "4", "--bw", "1"])
        .ok();
    assert!(cmd.is_ok());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "{stdout}");

    let contents = read_to_string(&toml).unwrap();
    assert!(contents.contains("[calibration]"), "{contents}");

    let cmd = fluxcal()
        .args(["calibrate", "--no-progress-bars"])
        .arg(&toml)
        .ok();
    assert!(cmd.is_ok(), "the saved arguments should be enough to calibrate");
}
