// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against command-line interfaces that aren't big enough to go in their
//! own modules.

use std::fs::write;

use tempfile::tempdir;

use super::*;

fn full_args() -> CalibrationArgs {
    CalibrationArgs {
        tsys: Some(100.0),
        gain: Some(2.0),
        npol: Some(2),
        on_phase: Some(0.25),
        off_phase: Some(0.5),
        basefit: false,
    }
}

#[test]
fn cli_calibration_args_take_precedence() {
    let cli = CalibrationArgs {
        tsys: Some(50.0),
        npol: None,
        basefit: false,
        ..full_args()
    };
    let file = CalibrationArgs {
        tsys: Some(100.0),
        gain: Some(3.0),
        npol: Some(1),
        on_phase: None,
        off_phase: None,
        basefit: true,
    };
    let merged = cli.merge(file);
    assert_eq!(merged.tsys, Some(50.0));
    assert_eq!(merged.gain, Some(2.0));
    assert_eq!(merged.npol, Some(1));
    assert_eq!(merged.on_phase, Some(0.25));
    assert!(merged.basefit);
}

#[test]
fn parse_calibration_args() {
    let params = full_args().parse().unwrap();
    assert_eq!(params.method, BaselineMethod::Median);
    assert_eq!(params.npol, 2);

    let params = CalibrationArgs {
        basefit: true,
        ..full_args()
    }
    .parse()
    .unwrap();
    assert_eq!(params.method, BaselineMethod::Polyfit);
}

#[test]
fn missing_calibration_args_are_named() {
    let result = CalibrationArgs {
        gain: None,
        ..full_args()
    }
    .parse();
    assert!(matches!(
        result,
        Err(CalibrationArgsError::MissingArgument { arg: "--gain" })
    ));
}

#[test]
fn bad_calibration_args_fail_before_calibrating() {
    let result = CalibrationArgs {
        tsys: Some(-1.0),
        ..full_args()
    }
    .parse();
    assert!(matches!(
        result,
        Err(CalibrationArgsError::Calibration(
            CalibrationError::InvalidParameter { .. }
        ))
    ));

    let result = CalibrationArgs {
        npol: Some(0),
        ..full_args()
    }
    .parse();
    assert!(result.is_err());

    let result = CalibrationArgs {
        on_phase: Some(0.6),
        ..full_args()
    }
    .parse();
    assert!(matches!(
        result,
        Err(CalibrationArgsError::Calibration(
            CalibrationError::PhasesOutOfOrder { .. }
        ))
    ));

    let result = CalibrationArgs {
        off_phase: Some(1.5),
        ..full_args()
    }
    .parse();
    assert!(matches!(
        result,
        Err(CalibrationArgsError::Calibration(
            CalibrationError::InvalidPhase { .. }
        ))
    ));
}

#[test]
fn profiles_are_read_in_input_order() {
    let dir = tempdir().unwrap();
    for (name, contents) in [("b.txt", "1\n2\n"), ("a.txt", "3\n4\n"), ("c.txt", "5\n")] {
        write(dir.path().join(name), contents).unwrap();
    }
    let c = dir.path().join("c.txt").display().to_string();
    let glob = dir.path().join("[ab].txt").display().to_string();

    let profiles = read_profiles(&[c, glob], "Reading").unwrap();
    let names: Vec<String> = profiles.iter().map(|p| p.name()).collect();
    assert_eq!(names, ["c.txt", "a.txt", "b.txt"]);
    assert_eq!(profiles[1].samples, [3.0, 4.0]);
}

#[test]
fn unmatched_profile_globs_are_errors() {
    let dir = tempdir().unwrap();
    let glob = dir.path().join("*.txt").display().to_string();
    assert!(matches!(
        read_profiles(&[glob], "Reading"),
        Err(ProfileInputError::Glob(GlobError::NoMatches { .. }))
    ));
    assert!(matches!(
        read_profiles(&[], "Reading"),
        Err(ProfileInputError::NoInputs)
    ));
}
