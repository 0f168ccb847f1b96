// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::math::FitError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("The profile has no samples")]
    EmptyProfile,

    #[error("The {name} phase ({phase}) must be between 0 and 1")]
    InvalidPhase { name: &'static str, phase: f64 },

    #[error("The on-pulse start phase ({on_phase}) is after the on-pulse end phase ({off_phase})")]
    PhasesOutOfOrder { on_phase: f64, off_phase: f64 },

    #[error("The on-pulse window [{on_bin}, {off_bin}) doesn't fit in a profile with {num_bins} bins")]
    WindowOutOfRange {
        on_bin: usize,
        off_bin: usize,
        num_bins: usize,
    },

    #[error("The {name} must be positive and finite, but got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Profile sample {index} is not finite ({value})")]
    NonFiniteSample { index: usize, value: f64 },

    #[error("The off-pulse RMS is {off_rms}; the off-pulse region is constant (or empty), so the calibration factor is undefined")]
    DegenerateOffPulseRms { off_rms: f64 },

    #[error("The calibration factor came out as {factor}")]
    NonFiniteFactor { factor: f64 },

    #[error("Couldn't fit the profile baseline: {0}")]
    BaselineFit(#[from] FitError),
}
