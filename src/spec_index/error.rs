// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{calibrate::CalibrationError, math::FitError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecIndexError {
    #[error("At least 2 bands are needed to estimate a spectral index, but {num_bands} were given")]
    TooFewBands { num_bands: usize },

    #[error("Band {index} has a non-positive frequency ({freq})")]
    NonPositiveFrequency { index: usize, freq: f64 },

    #[error("The first and last bands have the same frequency ({freq}); the spectral index is undefined")]
    IdenticalExtremeFrequencies { freq: f64 },

    #[error("Band {index} ({name}) has {num_bins} bins, but the first band has {expected}")]
    BinCountMismatch {
        index: usize,
        name: String,
        num_bins: usize,
        expected: usize,
    },

    #[error("Couldn't calibrate band {index} ({name}): {source}")]
    Calibration {
        index: usize,
        name: String,
        source: CalibrationError,
    },

    #[error("The fitted flux density at {freq} is {flux}; its logarithm is undefined")]
    NonPositiveFittedFlux { freq: f64, flux: f64 },

    #[error("Couldn't fit the flux densities against frequency: {0}")]
    Fit(#[from] FitError),
}
