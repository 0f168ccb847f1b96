// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to write out calibrated profiles and the products made from them. All
//! outputs are plain text so that they can be read back in as profiles, or by
//! any plotting tool.


use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use itertools::Itertools;
use ndarray::prelude::*;
use thiserror::Error;

use crate::{calibrate::CalibratedProfile, spec_index::SpectralIndexResult};

/// Create `path` and hand a buffered writer for it to `write`.
fn write_file<F>(path: &Path, write: F) -> Result<(), FileWriteError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let to_error = |source| FileWriteError::IO {
        path: path.to_path_buf(),
        source,
    };
    let mut f = BufWriter::new(File::create(path).map_err(to_error)?);
    write(&mut f).map_err(to_error)?;
    f.flush().map_err(to_error)
}

/// Write a calibrated profile, one sample per line \[Jy\]. The calibration
/// statistics are written as header lines.
pub(crate) fn write_calibrated_profile(
    path: &Path,
    cal: &CalibratedProfile,
) -> Result<(), FileWriteError> {
    write_file(path, |f| write_calibrated_profile_to(f, cal))
}

pub(crate) fn write_calibrated_profile_to<W: Write>(
    w: &mut W,
    cal: &CalibratedProfile,
) -> std::io::Result<()> {
    writeln!(w, "# Peak flux density                : {} Jy", cal.peak)?;
    writeln!(w, "# On-pulse mean flux density       : {} Jy", cal.on_pulse_mean)?;
    writeln!(w, "# Off-pulse RMS                    : {}", cal.off_rms)?;
    writeln!(w, "# Calibration factor               : {}", cal.factor)?;
    for s in cal.profile.iter() {
        writeln!(w, "{s}")?;
    }
    Ok(())
}

/// Write a (band, phase) matrix, one band per line. The first line lists the
/// frequency of each row.
pub(crate) fn write_matrix(
    path: &Path,
    matrix: ArrayView2<f64>,
    freqs_mhz: &[f64],
) -> Result<(), FileWriteError> {
    write_file(path, |f| write_matrix_to(f, matrix, freqs_mhz))
}

pub(crate) fn write_matrix_to<W: Write>(
    w: &mut W,
    matrix: ArrayView2<f64>,
    freqs_mhz: &[f64],
) -> std::io::Result<()> {
    writeln!(w, "# Frequencies (MHz): {}", freqs_mhz.iter().join(" "))?;
    for row in matrix.outer_iter() {
        writeln!(w, "{}", row.iter().join(" "))?;
    }
    Ok(())
}

/// Write a table of the per-band mean flux densities, the fitted line and the
/// spectral index.
pub(crate) fn write_spec_index_table(
    path: &Path,
    result: &SpectralIndexResult,
) -> Result<(), FileWriteError> {
    write_file(path, |f| write_spec_index_table_to(f, result))
}

pub(crate) fn write_spec_index_table_to<W: Write>(
    w: &mut W,
    result: &SpectralIndexResult,
) -> std::io::Result<()> {
    writeln!(w, "# Spectral index : {}", result.spectral_index)?;
    writeln!(w, "# Fit slope      : {}", result.slope)?;
    writeln!(w, "# Fit intercept  : {}", result.intercept)?;
    writeln!(w, "# freq mean_flux_jy fitted_flux_jy")?;
    for ((freq, mean), fitted) in result
        .freqs
        .iter()
        .zip(result.mean_fluxes.iter())
        .zip(result.fitted_fluxes.iter())
    {
        writeln!(w, "{freq} {mean} {fitted}")?;
    }
    Ok(())
}

/// Can we write to this file? The file is created (and removed again) to find
/// out, so that problems are found before any work is done.
pub(crate) fn can_write_to_file(path: &Path) -> Result<(), FileWriteError> {
    let to_error = |source| FileWriteError::IO {
        path: path.to_path_buf(),
        source,
    };
    let existed = path.exists();
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(to_error)?;
    if !existed {
        std::fs::remove_file(path).map_err(to_error)?;
    }
    Ok(())
}

#[derive(Error, Debug)]
pub(crate) enum FileWriteError {
    #[error("Couldn't write to '{}': {source}", path.display())]
    IO {
        path: PathBuf,
        source: std::io::Error,
    },
}
