// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stack calibrated profiles from many bands into a frequency-phase matrix.

use std::{borrow::Cow, path::PathBuf};

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vec1::Vec1;

use super::common::{display_warnings, read_profiles, CalibrationArgs, InfoPrinter, ARG_FILE_HELP};
use crate::{
    calibrate::CalibrationError,
    io::write::can_write_to_file,
    params::BandStackParams,
    stack::{BandMetadata, StackBand, StackMode, StackParams},
    FluxcalError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct StackArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The profiles to stack. Globs are expanded. Each profile's header must
    /// contain its centre frequency; the channel bandwidth, bandwidth and
    /// duration are only needed in the lowest-frequency profile's header.
    #[clap(short, long, multiple_values(true), help_heading = "INPUT FILES")]
    pub(super) data: Option<Vec<String>>,

    #[clap(flatten)]
    #[serde(rename = "calibration")]
    #[serde(default)]
    pub(super) calibration_args: CalibrationArgs,

    /// Lay the stack out as one offset trace per band, rather than as a
    /// frequency-phase image.
    #[clap(short, long, help_heading = "STACKING")]
    #[serde(default)]
    pub(super) line: bool,

    /// Fail if any profile's channel bandwidth, bandwidth or duration is
    /// missing or differs from the lowest-frequency profile's. Without this,
    /// differences are only reported.
    #[clap(long, help_heading = "STACKING")]
    #[serde(default)]
    pub(super) validate_headers: bool,

    /// Write the calibrated matrix here, one band per line in ascending
    /// frequency order, preceded by the centre frequencies. This is the same
    /// in both layouts; line-mode offsets and display frequencies aren't
    /// written.
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,

    /// Plot the stack to this PNG. Only available if compiled with the
    /// "plotting" feature.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) plot: Option<PathBuf>,
}

impl StackArgs {
    pub(super) fn merge(self) -> Result<StackArgs, FluxcalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let StackArgs {
                args_file: _,
                data,
                calibration_args,
                line,
                validate_headers,
                output,
                plot,
            } = unpack_arg_file!(arg_file);

            Ok(StackArgs {
                args_file: None,
                data: cli_args.data.or(data),
                calibration_args: cli_args.calibration_args.merge(calibration_args),
                line: cli_args.line || line,
                validate_headers: cli_args.validate_headers || validate_headers,
                output: cli_args.output.or(output),
                plot: cli_args.plot.or(plot),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<BandStackParams, FluxcalError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            data,
            calibration_args,
            line,
            validate_headers,
            output,
            plot,
        } = self;

        #[cfg(not(feature = "plotting"))]
        if plot.is_some() {
            return Err(StackArgsError::NoPlottingFeature.into());
        }

        let cal_params = calibration_args.parse()?;
        for path in output.iter().chain(plot.iter()) {
            can_write_to_file(path)?;
        }

        let data = data.ok_or(StackArgsError::NoProfiles)?;
        let profiles = read_profiles(&data, "Reading profiles")?;
        // Every band needs a centre frequency, but the rest of the header is
        // only needed from the lowest-frequency band (and from every band when
        // validating).
        let mut bands = Vec::with_capacity(profiles.len());
        let mut header_errors = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let freq_mhz = profile.centre_freq_mhz()?;
            let metadata = match profile.header() {
                Ok(header) => {
                    trace!("{}: {header:?}", profile.name());
                    header_errors.push(None);
                    Some(BandMetadata {
                        chan_bw_mhz: header.chan_bw_mhz,
                        bw_mhz: header.bw_mhz,
                        duration_s: header.duration_s,
                    })
                }
                Err(e) if validate_headers => return Err(e.into()),
                Err(e) => {
                    debug!("{e}");
                    header_errors.push(Some(e));
                    None
                }
            };
            bands.push(StackBand {
                freq_mhz,
                metadata,
                name: Some(profile.name()),
                profile: profile.samples,
            });
        }
        // The first of equal lowest frequencies is the one stacking uses.
        let lowest = bands
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.freq_mhz.total_cmp(&b.freq_mhz))
            .map(|(i, _)| i);
        if let Some(e) = lowest.and_then(|i| header_errors[i].take()) {
            return Err(e.into());
        }
        let bands = Vec1::try_from_vec(bands).map_err(|_| StackArgsError::NoProfiles)?;

        let num_bins = bands.first().profile.len();
        let window = cal_params.window(num_bins).map_err(StackArgsError::from)?;
        let mode = if line {
            StackMode::Line
        } else {
            StackMode::Image
        };

        let mut printer = InfoPrinter::new("Band stacking".into());
        let mut block: Vec<Cow<'static, str>> =
            vec![format!("{} bands of {num_bins} bins", bands.len()).into()];
        for band in bands.iter() {
            block.push(
                format!(
                    "{:>9.3} MHz: {}",
                    band.freq_mhz,
                    band.name.as_deref().unwrap_or_default()
                )
                .into(),
            );
        }
        printer.push_block(block);
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
            format!("Layout: {mode}").into(),
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

        Ok(BandStackParams {
            bands,
            window,
            stack_params: StackParams {
                tsys: cal_params.tsys,
                gain: cal_params.gain,
                npol: cal_params.npol,
                validate_metadata: validate_headers,
            },
            method: cal_params.method,
            mode,
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
pub(super) enum StackArgsError {
    #[error("No profiles were supplied")]
    NoProfiles,

    #[cfg(not(feature = "plotting"))]
    #[error("fluxcal was not compiled with the \"plotting\" feature, so --plot can't be used")]
    NoPlottingFeature,

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}
