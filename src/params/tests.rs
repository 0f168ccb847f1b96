// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use tempfile::tempdir;
use vec1::vec1;

use super::*;
use crate::{
    io::read::{read_profile_file, ProfileFile},
    spec_index::Band,
    stack::{BandMetadata, StackBand, StackLayout, StackMode, StackParams},
};

fn pulse(height: f64) -> Vec<f64> {
    vec![1.0, 3.0, height, height, 1.0, 3.0, 1.0, 3.0]
}

fn cal_params() -> ProfileCalParams {
    ProfileCalParams {
        tsys: 2.0,
        gain: 1.0,
        npol: 2,
        on_phase: 0.25,
        off_phase: 0.5,
        method: BaselineMethod::Median,
    }
}

#[test]
fn shared_calibration_settings() {
    let params = cal_params();
    assert_eq!(
        params.window(8).unwrap(),
        PhaseWindow {
            on_bin: 2,
            off_bin: 4
        }
    );
    let obs = params.obs_params(0.5, 1.0);
    assert_abs_diff_eq!(obs.tsys, 2.0);
    assert_eq!(obs.npol, 2);
    assert_abs_diff_eq!(obs.tbin, 0.5);

    let params = ProfileCalParams {
        on_phase: 0.75,
        ..cal_params()
    };
    assert!(params.window(8).is_err());
}

#[test]
fn calibrate_writes_the_calibrated_profile() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("cal.txt");
    let params = CalibrateParams {
        profile: ProfileFile {
            path: PathBuf::from("raw.txt"),
            samples: pulse(10.0),
            header_lines: vec![],
        },
        window: cal_params().window(8).unwrap(),
        obs_params: cal_params().obs_params(0.5, 1.0),
        method: BaselineMethod::Median,
        output: Some(output.clone()),
    };
    let cal = params.run().unwrap();
    let written = read_profile_file(&output).unwrap();
    assert_eq!(written.samples, cal.profile.to_vec());
}

#[test]
fn calibrate_failure_names_the_file() {
    let params = CalibrateParams {
        profile: ProfileFile {
            path: PathBuf::from("/data/flat.txt"),
            samples: vec![2.0; 8],
            header_lines: vec![],
        },
        window: cal_params().window(8).unwrap(),
        obs_params: cal_params().obs_params(0.5, 1.0),
        method: BaselineMethod::Median,
        output: None,
    };
    let err = params.run().unwrap_err();
    assert!(err.to_string().contains("flat.txt"), "{err}");
}

#[test]
fn spec_index_writes_a_table() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("spec.txt");
    let params = SpecIndexParams {
        bands: vec1![Band::new(1.0, pulse(10.0)), Band::new(2.0, pulse(5.5))],
        window: cal_params().window(8).unwrap(),
        obs_params: cal_params().obs_params(0.5, 1.0),
        method: BaselineMethod::Median,
        output: Some(output.clone()),
        plot: None,
    };
    let result = params.run().unwrap();
    assert_abs_diff_eq!(result.spectral_index, -(2.8_f64.log2()), epsilon = 1e-12);

    let table = std::fs::read_to_string(&output).unwrap();
    assert!(table.starts_with("# Spectral index : "));
    assert_eq!(table.lines().filter(|l| !l.starts_with('#')).count(), 2);
}

#[test]
fn stack_writes_a_matrix() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("stack.txt");
    let metadata = Some(BandMetadata {
        chan_bw_mhz: 0.5,
        bw_mhz: 16.0,
        duration_s: 600.0,
    });
    let params = BandStackParams {
        bands: vec1![
            StackBand {
                freq_mhz: 166.0,
                profile: pulse(10.0),
                metadata,
                name: None,
            },
            StackBand {
                freq_mhz: 150.0,
                profile: pulse(8.0),
                metadata,
                name: None,
            }
        ],
        window: cal_params().window(8).unwrap(),
        stack_params: StackParams {
            tsys: 2.0,
            gain: 1.0,
            npol: 2,
            validate_metadata: true,
        },
        method: BaselineMethod::Median,
        mode: StackMode::Line,
        output: Some(output.clone()),
        plot: None,
    };
    let stack = params.run().unwrap();
    assert_eq!(stack.freqs_mhz, vec![150.0, 166.0]);

    let text = std::fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("# Frequencies (MHz): 150 166"));
    let rows: Vec<Vec<f64>> = lines
        .map(|l| l.split_whitespace().map(|v| v.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows.len(), 2);

    // The plain calibrated matrix is written, not the offset traces.
    let traces = match &stack.layout {
        StackLayout::Line { traces, .. } => traces,
        StackLayout::Image { .. } => panic!("expected a line layout"),
    };
    for ((row, written), trace) in stack
        .matrix
        .outer_iter()
        .zip(rows.iter())
        .zip(traces.outer_iter())
        .skip(1)
    {
        for ((&expected, &got), &offset_value) in row.iter().zip(written).zip(trace.iter()) {
            assert_abs_diff_eq!(got, expected, epsilon = 1e-9);
            assert!((got - offset_value).abs() > 1e-9);
        }
    }
}
