// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::calibrate::CalibrationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StackError {
    #[error("No bands were given to stack")]
    NoBands,

    #[error("Band {index} ({name}) has an invalid centre frequency ({freq} MHz)")]
    InvalidFrequency { index: usize, name: String, freq: f64 },

    #[error("Band {index} ({name}) has no channel bandwidth, bandwidth or duration; these are needed from the lowest-frequency band")]
    MissingMetadata { index: usize, name: String },

    #[error("Band {index} ({name}) has no channel bandwidth, bandwidth or duration, so its metadata can't be validated")]
    UnvalidatedMetadata { index: usize, name: String },

    #[error("Band {index} ({name}) has a {field} of {found}, but the lowest-frequency band has {expected}")]
    MetadataMismatch {
        index: usize,
        name: String,
        field: &'static str,
        found: f64,
        expected: f64,
    },

    #[error("Band {index} ({name}) has {num_bins} bins, but the lowest-frequency band has {expected}")]
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
}
