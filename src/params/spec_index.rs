// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;
use vec1::Vec1;

use crate::{
    calibrate::{BaselineMethod, ObsParams, PhaseWindow},
    constants::JY_TO_MJY,
    io::write::{write_spec_index_table, FileWriteError},
    spec_index::{estimate_spectral_index, Band, SpecIndexError, SpectralIndexResult},
};

pub(crate) struct SpecIndexParams {
    /// The bands in the order given, each with its frequency \[GHz\].
    pub(crate) bands: Vec1<Band>,
    pub(crate) window: PhaseWindow,
    pub(crate) obs_params: ObsParams,
    pub(crate) method: BaselineMethod,
    pub(crate) output: Option<PathBuf>,
    pub(crate) plot: Option<PathBuf>,
}

impl SpecIndexParams {
    pub(crate) fn run(&self) -> Result<SpectralIndexResult, SpecIndexRunError> {
        let Self {
            bands,
            window,
            obs_params,
            method,
            output,
            plot,
        } = self;

        debug!("Calibrating {} bands", bands.len());
        let result = estimate_spectral_index(bands, *window, obs_params, *method)?;

        for (band, (mean, cal)) in bands
            .iter()
            .zip(result.mean_fluxes.iter().zip(result.calibrated.iter()))
        {
            info!(
                "{:>6} GHz: peak {:9.3} mJy, mean {:9.3} mJy",
                band.freq,
                cal.peak * JY_TO_MJY,
                mean * JY_TO_MJY
            );
        }
        info!("Spectral index = {}", result.spectral_index);

        if let Some(output) = output {
            write_spec_index_table(output, &result)?;
            info!("Spectral index table written to {}", output.display());
        }
        if let Some(plot) = plot {
            draw(plot, &result)?;
            info!("Wrote {}", plot.display());
        }

        Ok(result)
    }
}

#[cfg(feature = "plotting")]
fn draw(plot: &Path, result: &SpectralIndexResult) -> Result<(), SpecIndexRunError> {
    crate::plotting::plot_spec_index(plot, result)?;
    Ok(())
}

#[cfg(not(feature = "plotting"))]
fn draw(_plot: &Path, _result: &SpectralIndexResult) -> Result<(), SpecIndexRunError> {
    Err(SpecIndexRunError::NoPlottingFeature)
}

#[derive(Error, Debug)]
pub(crate) enum SpecIndexRunError {
    #[cfg(not(feature = "plotting"))]
    #[error("fluxcal was not compiled with the \"plotting\" feature, so the plot can't be made")]
    NoPlottingFeature,

    #[cfg(feature = "plotting")]
    #[error(transparent)]
    Draw(#[from] crate::plotting::DrawError),

    #[error(transparent)]
    SpecIndex(#[from] SpecIndexError),

    #[error(transparent)]
    FileWrite(#[from] FileWriteError),
}
