// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibrate a single profile.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{
    check_positive, display_warnings, read_profiles, CalibrationArgs, InfoPrinter, ARG_FILE_HELP,
};
use crate::{
    calibrate::tbin_from_tobs, io::write::can_write_to_file, params::CalibrateParams,
    FluxcalError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct CalibrateArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The profile to calibrate.
    #[clap(short, long, help_heading = "INPUT FILES")]
    pub(super) data: Option<String>,

    #[clap(flatten)]
    #[serde(rename = "calibration")]
    #[serde(default)]
    pub(super) calibration_args: CalibrationArgs,

    /// The length of the observation folded into the profile [s].
    #[clap(short, long, help_heading = "CALIBRATION")]
    pub(super) tobs: Option<f64>,

    /// The bandwidth of the observation [Hz].
    #[clap(short = 'B', long, help_heading = "CALIBRATION")]
    pub(super) bw: Option<f64>,

    /// Write the calibrated profile here, one sample [Jy] per line.
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

impl CalibrateArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified
    /// into a single struct. Where applicable, it will prefer CLI parameters
    /// over those in the file.
    pub(super) fn merge(self) -> Result<CalibrateArgs, FluxcalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let CalibrateArgs {
                args_file: _,
                data,
                calibration_args,
                tobs,
                bw,
                output,
            } = unpack_arg_file!(arg_file);

            Ok(CalibrateArgs {
                args_file: None,
                data: cli_args.data.or(data),
                calibration_args: cli_args.calibration_args.merge(calibration_args),
                tobs: cli_args.tobs.or(tobs),
                bw: cli_args.bw.or(bw),
                output: cli_args.output.or(output),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<CalibrateParams, FluxcalError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            data,
            calibration_args,
            tobs,
            bw,
            output,
        } = self;

        let cal_params = calibration_args.parse()?;
        let tobs = tobs.ok_or(CalibrateArgsError::MissingArgument { arg: "--tobs" })?;
        let bw = bw.ok_or(CalibrateArgsError::MissingArgument { arg: "--bw" })?;
        check_positive("observation length", tobs).map_err(CalibrateArgsError::from)?;
        check_positive("bandwidth", bw).map_err(CalibrateArgsError::from)?;
        if let Some(output) = output.as_ref() {
            can_write_to_file(output)?;
        }

        let data = data.ok_or(CalibrateArgsError::NoProfile)?;
        let profiles = read_profiles(&[data], "Reading profile")?;
        if profiles.len() > 1 {
            return Err(CalibrateArgsError::TooManyProfiles {
                num: profiles.len(),
            }
            .into());
        }
        let profile = profiles.into_vec().remove(0);
        let num_bins = profile.num_bins();
        let window = cal_params.window(num_bins).map_err(CalibrateArgsError::from)?;
        let obs_params = cal_params.obs_params(tbin_from_tobs(tobs, num_bins), bw);

        let mut printer = InfoPrinter::new("Calibrating".into());
        printer.push_block(vec![
            format!("Profile: {}", profile.path.display()).into(),
            format!("{num_bins} bins, {tobs} s, {bw} Hz").into(),
        ]);
        printer.push_block(vec![
            format!(
                "Tsys {} K, gain {} K/Jy, {} pol",
                cal_params.tsys, cal_params.gain, cal_params.npol
            )
            .into(),
            format!(
                "On-pulse bins [{}, {}), baseline: {}",
                window.on_bin, window.off_bin, cal_params.method
            )
            .into(),
        ]);
        if let Some(output) = output.as_ref() {
            printer.push_line(format!("Output: {}", output.display()).into());
        }
        printer.display();
        display_warnings();

        Ok(CalibrateParams {
            profile,
            window,
            obs_params,
            method: cal_params.method,
            output,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), FluxcalError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub(super) enum CalibrateArgsError {
    #[error("No profile was supplied")]
    NoProfile,

    #[error("Only one profile can be calibrated at a time, but {num} were supplied")]
    TooManyProfiles { num: usize },

    #[error("The argument {arg} is required")]
    MissingArgument { arg: &'static str },

    #[error(transparent)]
    Calibration(#[from] crate::calibrate::CalibrationError),
}
