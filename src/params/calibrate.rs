// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use log::info;
use thiserror::Error;

use crate::{
    calibrate::{
        calibrate_profile, BaselineMethod, CalibratedProfile, CalibrationError, ObsParams,
        PhaseWindow,
    },
    constants::JY_TO_MJY,
    io::{
        read::ProfileFile,
        write::{write_calibrated_profile, FileWriteError},
    },
};

pub(crate) struct CalibrateParams {
    pub(crate) profile: ProfileFile,
    pub(crate) window: PhaseWindow,
    pub(crate) obs_params: ObsParams,
    pub(crate) method: BaselineMethod,
    pub(crate) output: Option<PathBuf>,
}

impl CalibrateParams {
    pub(crate) fn run(&self) -> Result<CalibratedProfile, CalibrateRunError> {
        let Self {
            profile,
            window,
            obs_params,
            method,
            output,
        } = self;

        let cal = calibrate_profile(&profile.samples, *window, obs_params, *method).map_err(
            |source| CalibrateRunError::Calibration {
                name: profile.name(),
                source,
            },
        )?;

        info!("{}", profile.name());
        info!("  Peak flux density:          {:.3} mJy", cal.peak * JY_TO_MJY);
        info!(
            "  On-pulse mean flux density: {:.3} mJy",
            cal.on_pulse_mean * JY_TO_MJY
        );
        info!("  Off-pulse RMS:              {:e}", cal.off_rms);
        info!("  Calibration factor:         {:e} Jy per unit", cal.factor);

        if let Some(output) = output {
            write_calibrated_profile(output, &cal)?;
            info!("Calibrated profile written to {}", output.display());
        }

        Ok(cal)
    }
}

#[derive(Error, Debug)]
pub(crate) enum CalibrateRunError {
    #[error("Couldn't calibrate {name}: {source}")]
    Calibration {
        name: String,
        source: CalibrationError,
    },

    #[error(transparent)]
    FileWrite(#[from] FileWriteError),
}
