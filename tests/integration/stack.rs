// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::read_to_string;

use tempfile::tempdir;

use crate::*;

fn header(freq: &str, duration: &str) -> Vec<String> {
    vec![
        format!("Centre frequency : {freq}"),
        "Channel bandwidth : 0.5 MHz".to_string(),
        "Bandwidth : 16 MHz".to_string(),
        format!("Duration : {duration}"),
    ]
}

#[test]
fn stack_bands_in_frequency_order() {
    let dir = tempdir().unwrap();
    let h = header("166 MHz", "600 s");
    let high = write_profile(
        dir.path().join("a.txt"),
        &h.iter().map(String::as_str).collect::<Vec<_>>(),
        &pulse(10.0),
    );
    let h = header("150 MHz", "10 min");
    let low = write_profile(
        dir.path().join("b.txt"),
        &h.iter().map(String::as_str).collect::<Vec<_>>(),
        &pulse(8.0),
    );
    let output = dir.path().join("stack.txt");

    let cmd = fluxcal()
        .args(["stack", "--no-progress-bars", "--line", "--validate-headers"])
        .args(CAL_ARGS)
        .arg("-o")
        .arg(&output)
        .arg("-d")
        .arg(&high)
        .arg(&low)
        .ok();
    assert!(cmd.is_ok(), "stack failed on two simple bands");

    let contents = read_to_string(&output).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("# Frequencies (MHz): 150 166"));
    assert_eq!(lines.count(), 2);
}

#[test]
fn mismatched_headers_fail_when_validated() {
    let dir = tempdir().unwrap();
    let h = header("166 MHz", "600 s");
    let high = write_profile(
        dir.path().join("a.txt"),
        &h.iter().map(String::as_str).collect::<Vec<_>>(),
        &pulse(10.0),
    );
    let h = header("150 MHz", "300 s");
    let low = write_profile(
        dir.path().join("b.txt"),
        &h.iter().map(String::as_str).collect::<Vec<_>>(),
        &pulse(8.0),
    );

    let cmd = fluxcal()
        .args(["stack", "--no-progress-bars"])
        .args(CAL_ARGS)
        .arg("-d")
        .arg(&high)
        .arg(&low)
        .ok();
    assert!(cmd.is_ok(), "mismatches are only warnings by default");

    let cmd = fluxcal()
        .args(["stack", "--no-progress-bars", "--validate-headers"])
        .args(CAL_ARGS)
        .arg("-d")
        .arg(&high)
        .arg(&low)
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("a.txt"), "{stderr}");
}

#[test]
fn profiles_without_headers_cannot_be_stacked() {
    let dir = tempdir().unwrap();
    let bare = write_profile(dir.path().join("bare.txt"), &[], &pulse(10.0));

    let cmd = fluxcal()
        .args(["stack", "--no-progress-bars"])
        .args(CAL_ARGS)
        .arg("-d")
        .arg(&bare)
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("bare.txt"), "{stderr}");
}

#[test]
fn only_the_lowest_band_needs_a_full_header() {
    let dir = tempdir().unwrap();
    let high = write_profile(
        dir.path().join("high.txt"),
        &["Centre frequency : 166 MHz"],
        &pulse(10.0),
    );
    let h = header("150 MHz", "600 s");
    let low = write_profile(
        dir.path().join("low.txt"),
        &h.iter().map(String::as_str).collect::<Vec<_>>(),
        &pulse(8.0),
    );

    let cmd = fluxcal()
        .args(["stack", "--no-progress-bars"])
        .args(CAL_ARGS)
        .arg("-d")
        .arg(&high)
        .arg(&low)
        .ok();
    assert!(cmd.is_ok(), "a centre frequency is enough above the lowest band");

    // Validation needs every band's metadata.
    let cmd = fluxcal()
        .args(["stack", "--no-progress-bars", "--validate-headers"])
        .args(CAL_ARGS)
        .arg("-d")
        .arg(&high)
        .arg(&low)
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("high.txt"), "{stderr}");

    // The lowest band's header must be complete.
    let bare_low = write_profile(
        dir.path().join("bare_low.txt"),
        &["Centre frequency : 140 MHz"],
        &pulse(8.0),
    );
    let cmd = fluxcal()
        .args(["stack", "--no-progress-bars"])
        .args(CAL_ARGS)
        .arg("-d")
        .arg(&low)
        .arg(&bare_low)
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("bare_low.txt"), "{stderr}");
}
