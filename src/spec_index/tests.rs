// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;
use crate::calibrate::CalibrationError;

const WINDOW: PhaseWindow = PhaseWindow {
    on_bin: 2,
    off_bin: 4,
};

const PARAMS: ObsParams = ObsParams {
    tsys: 2.0,
    gain: 1.0,
    npol: 2,
    tbin: 0.5,
    bw: 1.0,
};

/// Profiles that share their off-pulse region (and so their calibration
/// factor) but have different pulse heights.
fn pulse(height: f64) -> Vec<f64> {
    vec![1.0, 3.0, height, height, 1.0, 3.0, 1.0, 3.0]
}

#[test]
fn halving_flux_per_doubling_frequency_is_index_minus_one() {
    let fit = spectral_index_from_fluxes(&[1.0, 2.0], &[10.0, 5.0]).unwrap();
    assert_abs_diff_eq!(fit.spectral_index, -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(fit.slope, -5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(fit.intercept, 15.0, epsilon = 1e-12);
    assert_abs_diff_eq!(fit.fitted_fluxes[0], 10.0, epsilon = 1e-12);
    assert_abs_diff_eq!(fit.fitted_fluxes[1], 5.0, epsilon = 1e-12);
}

#[test]
fn frequency_units_cancel() {
    let ghz = spectral_index_from_fluxes(&[1.0, 1.5, 2.0], &[10.0, 7.0, 5.0]).unwrap();
    let mhz = spectral_index_from_fluxes(&[1000.0, 1500.0, 2000.0], &[10.0, 7.0, 5.0]).unwrap();
    assert_abs_diff_eq!(ghz.spectral_index, mhz.spectral_index, epsilon = 1e-10);
}

#[test]
fn only_the_extreme_fitted_points_matter() {
    // The middle point pulls the fit, but the index is always taken between
    // the first and last points of the fitted line.
    let fit = spectral_index_from_fluxes(&[1.0, 2.0, 3.0], &[6.0, 5.0, 2.0]).unwrap();
    // Least squares: slope -2, intercept 25/3.
    assert_abs_diff_eq!(fit.slope, -2.0, epsilon = 1e-12);
    let s1 = fit.fitted_fluxes[0];
    let s3 = fit.fitted_fluxes[2];
    assert_abs_diff_eq!(s1, 25.0 / 3.0 - 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(
        fit.spectral_index,
        (s1.log10() - s3.log10()) / (1.0f64.log10() - 3.0f64.log10()),
        epsilon = 1e-12
    );
}

#[test]
fn fit_errors() {
    assert_eq!(
        spectral_index_from_fluxes(&[1.0], &[1.0]),
        Err(SpecIndexError::TooFewBands { num_bands: 1 })
    );
    assert_eq!(
        spectral_index_from_fluxes(&[1.0, 0.0], &[1.0, 1.0]),
        Err(SpecIndexError::NonPositiveFrequency {
            index: 1,
            freq: 0.0
        })
    );
    assert_eq!(
        spectral_index_from_fluxes(&[2.0, 1.0, 2.0], &[1.0, 2.0, 3.0]),
        Err(SpecIndexError::IdenticalExtremeFrequencies { freq: 2.0 })
    );
    // The fitted line crosses zero before the last band.
    assert!(matches!(
        spectral_index_from_fluxes(&[1.0, 2.0], &[1.0, -1.0]),
        Err(SpecIndexError::NonPositiveFittedFlux { freq, .. }) if freq == 2.0
    ));
}

#[test]
fn any_non_positive_fitted_flux_is_an_error() {
    // With unsorted frequencies the middle band is an extreme of the line;
    // the first and last fitted fluxes are positive but the middle one isn't.
    let result = spectral_index_from_fluxes(&[1.0, 3.0, 2.0], &[10.0, -8.0, 1.0]);
    match result {
        Err(SpecIndexError::NonPositiveFittedFlux { freq, flux }) => {
            assert_abs_diff_eq!(freq, 3.0);
            assert_abs_diff_eq!(flux, -8.0, epsilon = 1e-9);
        }
        other => panic!("expected a non-positive fitted flux error, got {other:?}"),
    }
}

#[test]
fn estimate_from_profiles() {
    let bands = vec![Band::new(1.0, pulse(10.0)), Band::new(2.0, pulse(5.5))];
    let result = estimate_spectral_index(&bands, WINDOW, &PARAMS, BaselineMethod::Median).unwrap();

    // Both profiles have the same baseline (3) and the same off-pulse RMS, so
    // the mean fluxes are in the ratio of the pulse heights above baseline.
    let c = 2.0 / 0.9375_f64.sqrt();
    assert_abs_diff_eq!(result.mean_fluxes[0], 14.0 * c / 8.0, epsilon = 1e-12);
    assert_abs_diff_eq!(result.mean_fluxes[1], 5.0 * c / 8.0, epsilon = 1e-12);
    assert_abs_diff_eq!(result.spectral_index, -(2.8_f64.log2()), epsilon = 1e-12);
    assert_eq!(result.freqs, vec![1.0, 2.0]);
    assert_eq!(result.calibrated.len(), 2);
}

#[test]
fn band_order_is_kept() {
    let heights = [10.0, 9.0, 8.0, 7.0, 6.0, 5.0];
    let bands: Vec<Band> = heights
        .iter()
        .zip(crate::constants::DEFAULT_SPEC_INDEX_FREQS)
        .map(|(&h, f)| Band::new(f, pulse(h)))
        .collect();
    let result = estimate_spectral_index(&bands, WINDOW, &PARAMS, BaselineMethod::Median).unwrap();

    for (band, (mean, cal)) in bands
        .iter()
        .zip(result.mean_fluxes.iter().zip(result.calibrated.iter()))
    {
        let expected = calibrate_profile(&band.profile, WINDOW, &PARAMS, BaselineMethod::Median)
            .unwrap()
            .on_pulse_mean;
        assert_abs_diff_eq!(*mean, expected);
        assert_abs_diff_eq!(cal.on_pulse_mean, expected);
    }
    // Flux falls with frequency.
    assert!(result.spectral_index < 0.0);
}

#[test]
fn bad_band_is_named() {
    let mut flat = Band::new(2.0, vec![5.0; 8]);
    flat.name = Some("flat.txt".to_string());
    let bands = vec![Band::new(1.0, pulse(10.0)), flat];

    match estimate_spectral_index(&bands, WINDOW, &PARAMS, BaselineMethod::Median) {
        Err(SpecIndexError::Calibration {
            index,
            name,
            source,
        }) => {
            assert_eq!(index, 1);
            assert_eq!(name, "flat.txt");
            assert!(matches!(
                source,
                CalibrationError::DegenerateOffPulseRms { .. }
            ));
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn bin_counts_must_match() {
    let bands = vec![Band::new(1.0, pulse(10.0)), Band::new(2.0, vec![1.0, 2.0])];
    assert_eq!(
        estimate_spectral_index(&bands, WINDOW, &PARAMS, BaselineMethod::Median).unwrap_err(),
        SpecIndexError::BinCountMismatch {
            index: 1,
            name: "band 1".to_string(),
            num_bins: 2,
            expected: 8
        }
    );
}

#[test]
fn too_few_bands() {
    let bands = vec![Band::new(1.0, pulse(10.0))];
    assert_eq!(
        estimate_spectral_index(&bands, WINDOW, &PARAMS, BaselineMethod::Median).unwrap_err(),
        SpecIndexError::TooFewBands { num_bands: 1 }
    );
}
