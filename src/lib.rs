// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flux calibration and spectral analysis of folded pulsar profiles recorded
//! across multiple observing frequency bands.
//!
//! Raw profiles are baseline-subtracted and scaled to flux density \[Jy\] with
//! the radiometer equation ([`calibrate`]). Calibrated bands are then either
//! reduced to a spectral index ([`spec_index`]) or stacked into a
//! frequency-phase matrix ([`stack`]).

pub mod calibrate;
mod cli;
pub mod constants;
pub(crate) mod io;
pub mod math;
pub(crate) mod params;
#[cfg(feature = "plotting")]
pub(crate) mod plotting;
pub mod spec_index;
pub mod stack;

use crossbeam_utils::atomic::AtomicCell;

/// Should we draw progress bars? Progress bars are only drawn when the user
/// didn't ask for them to be disabled.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);

// Re-exports.
pub use calibrate::{
    calibrate_profile, BaselineMethod, CalibratedProfile, CalibrationError, ObsParams,
    PhaseWindow,
};
pub use cli::{Fluxcal, FluxcalError};
pub use spec_index::{estimate_spectral_index, Band, SpecIndexError, SpectralIndexResult};
pub use stack::{assemble_stack, BandStack, StackBand, StackError, StackMode, StackParams};
