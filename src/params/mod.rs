// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters for each `fluxcal` workflow.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters have
//! been parsed and are ready to be used directly. Profiles have already been
//! read by the time parameters exist.

mod calibrate;
mod spec_index;
mod stack;
#[cfg(test)]
mod tests;

pub(crate) use calibrate::{CalibrateParams, CalibrateRunError};
pub(crate) use spec_index::{SpecIndexParams, SpecIndexRunError};
pub(crate) use stack::{BandStackParams, StackRunError};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::{
    calibrate::{BaselineMethod, CalibrationError, ObsParams, PhaseWindow},
    PROGRESS_BARS,
};

/// The calibration settings that are shared by every workflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ProfileCalParams {
    /// System temperature \[K\]
    pub(crate) tsys: f64,

    /// Gain \[K/Jy\]
    pub(crate) gain: f64,

    pub(crate) npol: u32,

    pub(crate) on_phase: f64,
    pub(crate) off_phase: f64,
    pub(crate) method: BaselineMethod,
}

impl ProfileCalParams {
    pub(crate) fn window(&self, num_bins: usize) -> Result<PhaseWindow, CalibrationError> {
        PhaseWindow::from_phases(self.on_phase, self.off_phase, num_bins)
    }

    /// Combine these settings with the per-bin integration time \[s\] and the
    /// bandwidth \[Hz\].
    pub(crate) fn obs_params(&self, tbin: f64, bw: f64) -> ObsParams {
        ObsParams {
            tsys: self.tsys,
            gain: self.gain,
            npol: self.npol,
            tbin,
            bw,
        }
    }
}

/// A progress bar over bands, hidden unless progress bars are enabled.
pub(crate) fn band_progress_bar(num_bands: usize, message: &'static str) -> ProgressBar {
    let draw_target = if PROGRESS_BARS.load() {
        ProgressDrawTarget::stdout()
    } else {
        ProgressDrawTarget::hidden()
    };
    ProgressBar::with_draw_target(Some(num_bands as _), draw_target)
        .with_style(
            ProgressStyle::default_bar()
                .template(
                    "{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} bands ({elapsed_precise}<{eta_precise})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message(message)
}
