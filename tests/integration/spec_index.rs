// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::read_to_string;

use approx::assert_abs_diff_eq;
use tempfile::tempdir;

use crate::*;

#[test]
fn spectral_index_of_two_bands() {
    let dir = tempdir().unwrap();
    let low = write_profile(dir.path().join("low.txt"), &[], &pulse(10.0));
    let high = write_profile(dir.path().join("high.txt"), &[], &pulse(5.5));
    let table = dir.path().join("spec.txt");

    let cmd = fluxcal()
        .args(["spec-index", "--no-progress-bars"])
        .args(CAL_ARGS)
        .args(["--tobs", "4", "--bw", "1", "--freqs", "1", "2", "-o"])
        .arg(&table)
        .arg("-d")
        .arg(&low)
        .arg(&high)
        .ok();
    assert!(cmd.is_ok(), "spec-index failed on two simple bands");
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Spectral index = "), "{stdout}");

    let contents = read_to_string(&table).unwrap();
    let index: f64 = contents
        .lines()
        .next()
        .and_then(|l| l.split(':').nth(1))
        .map(|v| v.trim().parse().unwrap())
        .unwrap();
    // The on-pulse means differ by a factor of 2.8 over one octave.
    assert_abs_diff_eq!(index, -(2.8_f64.log2()), epsilon = 1e-9);
}

#[test]
fn frequency_count_must_match_profiles() {
    let dir = tempdir().unwrap();
    let low = write_profile(dir.path().join("low.txt"), &[], &pulse(10.0));
    let high = write_profile(dir.path().join("high.txt"), &[], &pulse(5.5));

    // Without --freqs, the six-band default table is used.
    let cmd = fluxcal()
        .args(["spec-index", "--no-progress-bars"])
        .args(CAL_ARGS)
        .args(["--tobs", "4", "--bw", "1", "-d"])
        .arg(&low)
        .arg(&high)
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("6 frequencies were given for 2 profiles"), "{stderr}");
}
