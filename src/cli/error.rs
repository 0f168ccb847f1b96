// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all fluxcal-related errors. This should be the *only* error
//! enum that is publicly visible.

use thiserror::Error;

use super::{
    calibrate::CalibrateArgsError,
    common::{CalibrationArgsError, ProfileInputError},
    spec_index::SpecIndexArgsError,
    stack::StackArgsError,
};
use crate::{
    io::{read::ProfileReadError, write::FileWriteError, GlobError},
    params::{CalibrateRunError, SpecIndexRunError, StackRunError},
};

/// The *only* publicly visible error from fluxcal.
#[derive(Error, Debug)]
pub enum FluxcalError {
    /// An error related to calibrating profiles, including bad calibration
    /// arguments.
    #[error("{0}")]
    Calibrate(String),

    /// An error related to spec-index.
    #[error("While estimating the spectral index: {0}")]
    SpecIndex(String),

    /// An error related to stack.
    #[error("While stacking bands: {0}")]
    Stack(String),

    /// An error related to reading profiles or their headers.
    #[error("{0}\n\nProfiles are plain text with one sample per line; header lines start with '#'")]
    Profile(String),

    /// An error related to plotting.
    #[error("{0}")]
    Plot(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

// Binary sub-command errors.

impl From<CalibrationArgsError> for FluxcalError {
    fn from(e: CalibrationArgsError) -> Self {
        Self::Calibrate(e.to_string())
    }
}

impl From<CalibrateArgsError> for FluxcalError {
    fn from(e: CalibrateArgsError) -> Self {
        Self::Calibrate(e.to_string())
    }
}

impl From<SpecIndexArgsError> for FluxcalError {
    fn from(e: SpecIndexArgsError) -> Self {
        match e {
            #[cfg(not(feature = "plotting"))]
            SpecIndexArgsError::NoPlottingFeature => Self::Plot(e.to_string()),
            SpecIndexArgsError::Calibration(_) => Self::Calibrate(e.to_string()),
            SpecIndexArgsError::NoProfiles
            | SpecIndexArgsError::FreqCountMismatch { .. }
            | SpecIndexArgsError::MissingArgument { .. } => Self::SpecIndex(e.to_string()),
        }
    }
}

impl From<StackArgsError> for FluxcalError {
    fn from(e: StackArgsError) -> Self {
        match e {
            #[cfg(not(feature = "plotting"))]
            StackArgsError::NoPlottingFeature => Self::Plot(e.to_string()),
            StackArgsError::Calibration(_) => Self::Calibrate(e.to_string()),
            StackArgsError::NoProfiles => Self::Stack(e.to_string()),
        }
    }
}

impl From<ProfileInputError> for FluxcalError {
    fn from(e: ProfileInputError) -> Self {
        match e {
            ProfileInputError::Read(e) => Self::from(e),
            ProfileInputError::Glob(e) => Self::from(e),
            ProfileInputError::NoInputs => Self::Generic(e.to_string()),
        }
    }
}

// Parameter errors.

impl From<CalibrateRunError> for FluxcalError {
    fn from(e: CalibrateRunError) -> Self {
        match e {
            CalibrateRunError::Calibration { .. } => Self::Calibrate(e.to_string()),
            CalibrateRunError::FileWrite(e) => Self::from(e),
        }
    }
}

impl From<SpecIndexRunError> for FluxcalError {
    fn from(e: SpecIndexRunError) -> Self {
        match e {
            #[cfg(not(feature = "plotting"))]
            SpecIndexRunError::NoPlottingFeature => Self::Plot(e.to_string()),
            #[cfg(feature = "plotting")]
            SpecIndexRunError::Draw(_) => Self::Plot(e.to_string()),
            SpecIndexRunError::SpecIndex(_) => Self::SpecIndex(e.to_string()),
            SpecIndexRunError::FileWrite(e) => Self::from(e),
        }
    }
}

impl From<StackRunError> for FluxcalError {
    fn from(e: StackRunError) -> Self {
        match e {
            #[cfg(not(feature = "plotting"))]
            StackRunError::NoPlottingFeature => Self::Plot(e.to_string()),
            #[cfg(feature = "plotting")]
            StackRunError::Draw(_) => Self::Plot(e.to_string()),
            StackRunError::Stack(_) => Self::Stack(e.to_string()),
            StackRunError::FileWrite(e) => Self::from(e),
        }
    }
}

// Library code errors.

impl From<ProfileReadError> for FluxcalError {
    fn from(e: ProfileReadError) -> Self {
        Self::Profile(e.to_string())
    }
}

impl From<FileWriteError> for FluxcalError {
    fn from(e: FileWriteError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<GlobError> for FluxcalError {
    fn from(e: GlobError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<std::io::Error> for FluxcalError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
