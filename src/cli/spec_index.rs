// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Estimate the spectral index of a pulsar from profiles in several bands.

use std::{borrow::Cow, path::PathBuf};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vec1::Vec1;

use super::common::{
    check_positive, display_warnings, read_profiles, CalibrationArgs, InfoPrinter, Warn,
    ARG_FILE_HELP,
};
use crate::{
    calibrate::{tbin_from_tobs, CalibrationError},
    constants::DEFAULT_SPEC_INDEX_FREQS,
    io::write::can_write_to_file,
    params::SpecIndexParams,
    spec_index::Band,
    FluxcalError,
};

lazy_static::lazy_static! {
    static ref FREQS_HELP: String =
        format!("The centre frequency of each band [GHz], in the same order as the profiles. Default: {}",
                DEFAULT_SPEC_INDEX_FREQS.iter().join(" "));
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SpecIndexArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The profiles of each band. Globs are expanded; the order of the
    /// profiles must match the order of the frequencies.
    #[clap(short, long, multiple_values(true), help_heading = "INPUT FILES")]
    pub(super) data: Option<Vec<String>>,

    #[clap(long, multiple_values(true), help = FREQS_HELP.as_str(), help_heading = "INPUT FILES")]
    pub(super) freqs: Option<Vec<f64>>,

    #[clap(flatten)]
    #[serde(rename = "calibration")]
    #[serde(default)]
    pub(super) calibration_args: CalibrationArgs,

    /// The length of the observation folded into each profile [s].
    #[clap(short, long, help_heading = "CALIBRATION")]
    pub(super) tobs: Option<f64>,

    /// The bandwidth of each band [Hz].
    #[clap(short = 'B', long, help_heading = "CALIBRATION")]
    pub(super) bw: Option<f64>,

    /// Write a table of each band's frequency, mean flux density and fitted
    /// flux density here.
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,

    /// Plot the calibrated profiles and the fitted spectrum to this PNG. Only
    /// available if compiled with the "plotting" feature.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) plot: Option<PathBuf>,
}

impl SpecIndexArgs {
    pub(super) fn merge(self) -> Result<SpecIndexArgs, FluxcalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let SpecIndexArgs {
                args_file: _,
                data,
                freqs,
                calibration_args,
                tobs,
                bw,
                output,
                plot,
            } = unpack_arg_file!(arg_file);

            Ok(SpecIndexArgs {
                args_file: None,
                data: cli_args.data.or(data),
                freqs: cli_args.freqs.or(freqs),
                calibration_args: cli_args.calibration_args.merge(calibration_args),
                tobs: cli_args.tobs.or(tobs),
                bw: cli_args.bw.or(bw),
                output: cli_args.output.or(output),
                plot: cli_args.plot.or(plot),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<SpecIndexParams, FluxcalError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            data,
            freqs,
            calibration_args,
            tobs,
            bw,
            output,
            plot,
        } = self;

        #[cfg(not(feature = "plotting"))]
        if plot.is_some() {
            return Err(SpecIndexArgsError::NoPlottingFeature.into());
        }

        let cal_params = calibration_args.parse()?;
        let tobs = tobs.ok_or(SpecIndexArgsError::MissingArgument { arg: "--tobs" })?;
        let bw = bw.ok_or(SpecIndexArgsError::MissingArgument { arg: "--bw" })?;
        check_positive("observation length", tobs).map_err(SpecIndexArgsError::from)?;
        check_positive("bandwidth", bw).map_err(SpecIndexArgsError::from)?;
        for path in output.iter().chain(plot.iter()) {
            can_write_to_file(path)?;
        }

        let data = data.ok_or(SpecIndexArgsError::NoProfiles)?;
        let profiles = read_profiles(&data, "Reading profiles")?;

        let freqs = match freqs {
            Some(f) => f,
            None => {
                format!(
                    "No band frequencies were given; using the defaults: {} GHz",
                    DEFAULT_SPEC_INDEX_FREQS.iter().join(", ")
                )
                .warn();
                DEFAULT_SPEC_INDEX_FREQS.to_vec()
            }
        };
        if freqs.len() != profiles.len() {
            return Err(SpecIndexArgsError::FreqCountMismatch {
                num_freqs: freqs.len(),
                num_profiles: profiles.len(),
            }
            .into());
        }

        // All bands share the first profile's bin count; estimation will
        // reject any other.
        let num_bins = profiles.first().num_bins();
        let window = cal_params.window(num_bins).map_err(SpecIndexArgsError::from)?;
        let obs_params = cal_params.obs_params(tbin_from_tobs(tobs, num_bins), bw);

        let mut printer = InfoPrinter::new("Spectral index estimation".into());
        let mut block: Vec<Cow<'static, str>> =
            vec![format!("{} bands of {num_bins} bins", profiles.len()).into()];
        for (profile, freq) in profiles.iter().zip(freqs.iter()) {
            block.push(format!("{freq:>6} GHz: {}", profile.path.display()).into());
        }
        printer.push_block(block);
        printer.push_block(vec![
            format!(
                "Tsys {} K, gain {} K/Jy, {} pol, {tobs} s, {bw} Hz",
                cal_params.tsys, cal_params.gain, cal_params.npol
            )
            .into(),
            format!(
                "On-pulse bins [{}, {}), baseline: {}",
                window.on_bin, window.off_bin, cal_params.method
            )
            .into(),
        ]);
        let outputs = output
            .iter()
            .chain(plot.iter())
            .map(|p| format!("Output: {}", p.display()).into())
            .collect::<Vec<Cow<'static, str>>>();
        if !outputs.is_empty() {
            printer.push_block(outputs);
        }
        printer.display();
        display_warnings();

        let bands = Vec1::try_from_vec(
            profiles
                .into_iter()
                .zip(freqs)
                .map(|(p, freq)| Band {
                    freq,
                    name: Some(p.name()),
                    profile: p.samples,
                })
                .collect(),
        )
        .map_err(|_| SpecIndexArgsError::NoProfiles)?;

        Ok(SpecIndexParams {
            bands,
            window,
            obs_params,
            method: cal_params.method,
            output,
            plot,
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
pub(super) enum SpecIndexArgsError {
    #[error("No profiles were supplied")]
    NoProfiles,

    #[error("{num_freqs} frequencies were given for {num_profiles} profiles; there must be one frequency per profile")]
    FreqCountMismatch {
        num_freqs: usize,
        num_profiles: usize,
    },

    #[error("The argument {arg} is required")]
    MissingArgument { arg: &'static str },

    #[cfg(not(feature = "plotting"))]
    #[error("fluxcal was not compiled with the \"plotting\" feature, so --plot can't be used")]
    NoPlottingFeature,

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}
