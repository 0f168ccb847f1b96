// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Every `fluxcal` subcommand
//! calibrates profiles, so the calibration arguments are shared between them.

mod printers;
#[cfg(test)]
mod tests;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use vec1::Vec1;

use crate::{
    calibrate::{BaselineMethod, CalibrationError, PhaseWindow},
    io::{
        get_all_matches_from_globs,
        read::{read_profile_file, ProfileFile, ProfileReadError},
        GlobError,
    },
    params::{band_progress_bar, ProfileCalParams},
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(FluxcalError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(FluxcalError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(FluxcalError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Arguments describing how raw profiles are turned into flux densities.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct CalibrationArgs {
    /// The system temperature [K].
    #[clap(short = 'T', long, help_heading = "CALIBRATION")]
    pub(super) tsys: Option<f64>,

    /// The telescope gain [K/Jy].
    #[clap(short = 'G', long, help_heading = "CALIBRATION")]
    pub(super) gain: Option<f64>,

    /// The number of polarisations summed in the profiles.
    #[clap(short = 'p', long, help_heading = "CALIBRATION")]
    pub(super) npol: Option<u32>,

    /// The phase at which the pulse starts, between 0 and 1.
    #[clap(short = 'n', long, alias = "onstart", help_heading = "CALIBRATION")]
    pub(super) on_phase: Option<f64>,

    /// The phase at which the pulse ends, between 0 and 1. Everything outside
    /// the on-pulse region is used to estimate the baseline and noise.
    #[clap(short = 'f', long, alias = "onstop", help_heading = "CALIBRATION")]
    pub(super) off_phase: Option<f64>,

    /// Fit a 4th-degree polynomial to the off-pulse region to remove the
    /// baseline, rather than subtracting its median.
    #[clap(short = 'b', long, help_heading = "CALIBRATION")]
    #[serde(default)]
    pub(super) basefit: bool,
}

impl CalibrationArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            tsys: self.tsys.or(other.tsys),
            gain: self.gain.or(other.gain),
            npol: self.npol.or(other.npol),
            on_phase: self.on_phase.or(other.on_phase),
            off_phase: self.off_phase.or(other.off_phase),
            basefit: self.basefit || other.basefit,
        }
    }

    /// Check that all calibration arguments are present and sensible. The
    /// phases can only be turned into bins once the profiles are read.
    pub(super) fn parse(self) -> Result<ProfileCalParams, CalibrationArgsError> {
        let CalibrationArgs {
            tsys,
            gain,
            npol,
            on_phase,
            off_phase,
            basefit,
        } = self;

        let tsys = tsys.ok_or(CalibrationArgsError::MissingArgument { arg: "--tsys" })?;
        let gain = gain.ok_or(CalibrationArgsError::MissingArgument { arg: "--gain" })?;
        let npol = npol.ok_or(CalibrationArgsError::MissingArgument { arg: "--npol" })?;
        let on_phase =
            on_phase.ok_or(CalibrationArgsError::MissingArgument { arg: "--on-phase" })?;
        let off_phase =
            off_phase.ok_or(CalibrationArgsError::MissingArgument { arg: "--off-phase" })?;

        check_positive("system temperature", tsys)?;
        check_positive("gain", gain)?;
        if npol == 0 {
            return Err(CalibrationError::InvalidParameter {
                name: "number of polarisations",
                value: 0.0,
            }
            .into());
        }
        PhaseWindow::check_phases(on_phase, off_phase)?;

        Ok(ProfileCalParams {
            tsys,
            gain,
            npol,
            on_phase,
            off_phase,
            method: if basefit {
                BaselineMethod::Polyfit
            } else {
                BaselineMethod::Median
            },
        })
    }
}

/// Values entering the radiometer equation must be positive and finite.
pub(super) fn check_positive(name: &'static str, value: f64) -> Result<(), CalibrationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CalibrationError::InvalidParameter { name, value })
    }
}

/// Expand the supplied globs and read every profile they name, preserving the
/// order of the inputs.
pub(super) fn read_profiles(
    globs: &[String],
    message: &'static str,
) -> Result<Vec1<ProfileFile>, ProfileInputError> {
    let paths = get_all_matches_from_globs(globs)?;
    if paths.is_empty() {
        return Err(ProfileInputError::NoInputs);
    }
    trace!("Profile files: {paths:?}");

    let pb = band_progress_bar(paths.len(), message);
    let mut profiles = Vec::with_capacity(paths.len());
    for path in paths {
        profiles.push(read_profile_file(&path)?);
        pb.inc(1);
    }
    pb.finish_and_clear();
    debug!("Read {} profiles", profiles.len());

    Vec1::try_from_vec(profiles).map_err(|_| ProfileInputError::NoInputs)
}

#[derive(Error, Debug)]
pub(super) enum CalibrationArgsError {
    #[error("The argument {arg} is required")]
    MissingArgument { arg: &'static str },

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}

#[derive(Error, Debug)]
pub(super) enum ProfileInputError {
    #[error("No profile files were supplied")]
    NoInputs,

    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error(transparent)]
    Read(#[from] ProfileReadError),
}
