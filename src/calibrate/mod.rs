// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flux calibration of a single folded profile.
//!
//! A raw profile is flattened by subtracting a baseline and the result is
//! scaled into flux density with the radiometer equation (Lorimer & Kramer,
//! eq. 7.12), inverted so that the off-pulse RMS maps onto the expected noise
//! level:
//!
//! C = T_sys / (σ_off G sqrt(n_pol t_bin Δν))
//!
//! The baseline is fitted to a masked copy of the whole profile, in which the
//! on-pulse bins are replaced by the whole profile's median. It is either the
//! median of that copy or a low-order polynomial fitted to it.

mod error;

pub use error::CalibrationError;

use log::trace;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    constants::BASELINE_POLY_DEGREE,
    math::{median, polyfit, polyval, std_dev},
};

/// How the baseline of a profile is estimated.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMethod {
    /// A single value, the median of the masked profile.
    #[default]
    #[strum(serialize = "median")]
    Median,

    /// A 4th-degree polynomial fitted over phase to the masked profile.
    #[strum(serialize = "polyfit")]
    Polyfit,
}

/// The on-pulse region of a profile, `[on_bin, off_bin)`. Everything else is
/// treated as off-pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWindow {
    pub on_bin: usize,
    pub off_bin: usize,
}

impl PhaseWindow {
    /// Convert start and end phases of the pulse into bins. Phases must be
    /// within \[0, 1\] and must not be out of order. Bins are truncated, i.e.
    /// `on_bin = floor(on_phase * num_bins)`.
    pub fn from_phases(
        on_phase: f64,
        off_phase: f64,
        num_bins: usize,
    ) -> Result<PhaseWindow, CalibrationError> {
        Self::check_phases(on_phase, off_phase)?;
        let on_bin = (on_phase * num_bins as f64).floor() as usize;
        let off_bin = (off_phase * num_bins as f64).floor() as usize;
        let window = PhaseWindow { on_bin, off_bin };
        window.check(num_bins)?;
        Ok(window)
    }

    /// Phases must be within \[0, 1\], with the start no later than the end.
    pub fn check_phases(on_phase: f64, off_phase: f64) -> Result<(), CalibrationError> {
        for (name, phase) in [("on-pulse start", on_phase), ("on-pulse end", off_phase)] {
            if !phase.is_finite() || !(0.0..=1.0).contains(&phase) {
                return Err(CalibrationError::InvalidPhase { name, phase });
            }
        }
        if on_phase > off_phase {
            return Err(CalibrationError::PhasesOutOfOrder {
                on_phase,
                off_phase,
            });
        }
        Ok(())
    }

    /// The number of on-pulse bins.
    pub fn width(&self) -> usize {
        self.off_bin.saturating_sub(self.on_bin)
    }

    /// Ensure this window fits in a profile with `num_bins` bins.
    pub fn check(&self, num_bins: usize) -> Result<(), CalibrationError> {
        if self.on_bin > self.off_bin || self.off_bin > num_bins {
            return Err(CalibrationError::WindowOutOfRange {
                on_bin: self.on_bin,
                off_bin: self.off_bin,
                num_bins,
            });
        }
        Ok(())
    }
}

/// The observation parameters that enter the radiometer equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObsParams {
    /// System temperature \[K\]
    pub tsys: f64,

    /// Gain \[K/Jy\]
    pub gain: f64,

    /// The number of polarisations summed in the profile.
    pub npol: u32,

    /// The integration time per phase bin \[s\]
    pub tbin: f64,

    /// The bandwidth \[Hz\]
    pub bw: f64,
}

impl ObsParams {
    /// Every parameter must be positive and finite.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        for (name, value) in [
            ("system temperature", self.tsys),
            ("gain", self.gain),
            ("integration time per bin", self.tbin),
            ("bandwidth", self.bw),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CalibrationError::InvalidParameter { name, value });
            }
        }
        if self.npol == 0 {
            return Err(CalibrationError::InvalidParameter {
                name: "number of polarisations",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// The integration time per bin of a profile folded from an observation of
/// length `tobs` seconds.
pub fn tbin_from_tobs(tobs: f64, num_bins: usize) -> f64 {
    tobs / num_bins as f64
}

/// A profile in flux-density units and the statistics gathered while
/// calibrating it.
#[derive(Debug, Clone)]
pub struct CalibratedProfile {
    /// The calibrated profile \[Jy\]
    pub profile: Array1<f64>,

    /// The baseline that was subtracted from the raw profile, per bin, in raw
    /// units.
    pub baseline: Array1<f64>,

    /// The largest calibrated sample \[Jy\]
    pub peak: f64,

    /// The sum of the on-pulse calibrated samples divided by the *total*
    /// number of bins \[Jy\]
    pub on_pulse_mean: f64,

    /// The mean of the baseline-subtracted, masked profile in raw units. This
    /// is only a diagnostic; it should be close to 0.
    pub off_mean: f64,

    /// The RMS of the baseline-subtracted, masked profile in raw units.
    pub off_rms: f64,

    /// The calibration factor \[Jy per raw unit\]
    pub factor: f64,
}

impl CalibratedProfile {
    pub fn num_bins(&self) -> usize {
        self.profile.len()
    }
}

/// Copy the profile and overwrite the on-pulse region with the median of the
/// *entire* profile. This masks the pulse while keeping the array length, so
/// that the baseline can be fitted over all phases.
pub fn baseline_candidate(profile: &[f64], window: PhaseWindow) -> Vec<f64> {
    let mut candidate = profile.to_vec();
    if window.width() > 0 {
        let fill = median(profile);
        candidate[window.on_bin..window.off_bin].fill(fill);
    }
    candidate
}

/// Estimate the baseline of a masked profile at every bin.
pub fn fit_baseline(
    candidate: &[f64],
    method: BaselineMethod,
) -> Result<Vec<f64>, CalibrationError> {
    let num_bins = candidate.len();
    match method {
        BaselineMethod::Median => Ok(vec![median(candidate); num_bins]),

        BaselineMethod::Polyfit => {
            let x: Vec<f64> = (0..num_bins).map(|i| i as f64 / num_bins as f64).collect();
            let coeffs = polyfit(&x, candidate, BASELINE_POLY_DEGREE)?;
            trace!("Baseline polynomial coefficients (ascending order): {coeffs:?}");
            Ok(x.into_iter().map(|x| polyval(&coeffs, x)).collect())
        }
    }
}

/// Invert the radiometer equation to get the factor that converts raw units
/// into Jy.
pub fn calibration_factor(off_rms: f64, params: &ObsParams) -> Result<f64, CalibrationError> {
    if off_rms <= 0.0 || !off_rms.is_finite() {
        return Err(CalibrationError::DegenerateOffPulseRms { off_rms });
    }
    let ObsParams {
        tsys,
        gain,
        npol,
        tbin,
        bw,
    } = *params;
    let factor = tsys / (off_rms * gain * (f64::from(npol) * tbin * bw).sqrt());
    if !factor.is_finite() || factor <= 0.0 {
        return Err(CalibrationError::NonFiniteFactor { factor });
    }
    Ok(factor)
}

/// Calibrate a raw profile.
pub fn calibrate_profile(
    profile: &[f64],
    window: PhaseWindow,
    params: &ObsParams,
    method: BaselineMethod,
) -> Result<CalibratedProfile, CalibrationError> {
    let num_bins = profile.len();
    if num_bins == 0 {
        return Err(CalibrationError::EmptyProfile);
    }
    window.check(num_bins)?;
    params.validate()?;
    if let Some((index, &value)) = profile.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(CalibrationError::NonFiniteSample { index, value });
    }

    let candidate = baseline_candidate(profile, window);
    let baseline = fit_baseline(&candidate, method)?;

    let residual: Vec<f64> = candidate
        .iter()
        .zip(baseline.iter())
        .map(|(c, y)| c - y)
        .collect();
    let off_mean = crate::math::mean(&residual);
    let mut off_rms = std_dev(&residual);
    // A polynomial fitted to a constant leaves rounding noise behind; that is
    // still a constant profile.
    let scale = candidate.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if off_rms <= scale * f64::EPSILON * num_bins as f64 {
        off_rms = 0.0;
    }
    trace!("Off-pulse mean {off_mean}, RMS {off_rms}");

    let factor = calibration_factor(off_rms, params)?;
    trace!("Calibration factor {factor}");

    let calibrated: Array1<f64> = profile
        .iter()
        .zip(baseline.iter())
        .map(|(p, y)| (p - y) * factor)
        .collect();
    let peak = calibrated.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    let on_pulse_mean =
        calibrated.slice(s![window.on_bin..window.off_bin]).sum() / num_bins as f64;

    Ok(CalibratedProfile {
        profile: calibrated,
        baseline: Array1::from(baseline),
        peak,
        on_pulse_mean,
        off_mean,
        off_rms,
        factor,
    })
}

/// Undo a calibration, i.e. `raw = calibrated / factor + baseline`.
pub fn uncalibrate(
    calibrated: ArrayView1<f64>,
    baseline: ArrayView1<f64>,
    factor: f64,
) -> Array1<f64> {
    &calibrated / factor + &baseline
}
