// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info};
use thiserror::Error;
use vec1::Vec1;

use crate::{
    calibrate::{BaselineMethod, PhaseWindow},
    io::write::{write_matrix, FileWriteError},
    stack::{assemble_stack, BandStack, StackBand, StackError, StackLayout, StackMode, StackParams},
};

pub(crate) struct BandStackParams {
    pub(crate) bands: Vec1<StackBand>,
    pub(crate) window: PhaseWindow,
    pub(crate) stack_params: StackParams,
    pub(crate) method: BaselineMethod,
    pub(crate) mode: StackMode,
    pub(crate) output: Option<PathBuf>,
    pub(crate) plot: Option<PathBuf>,
}

impl BandStackParams {
    pub(crate) fn run(&self) -> Result<BandStack, StackRunError> {
        let Self {
            bands,
            window,
            stack_params,
            method,
            mode,
            output,
            plot,
        } = self;

        debug!("Stacking {} bands in {mode} mode", bands.len());
        let stack = assemble_stack(bands, *window, stack_params, *method, *mode)?;
        info!(
            "Stacked {} bands of {} bins, {:.3} to {:.3} MHz",
            stack.num_bands(),
            stack.num_bins(),
            stack.freqs_mhz.first().copied().unwrap_or_default(),
            stack.freqs_mhz.last().copied().unwrap_or_default(),
        );
        debug!("Band order: {}", stack.names.iter().join(", "));
        match &stack.layout {
            StackLayout::Image { extent } => debug!("Image extent: {extent:?}"),
            StackLayout::Line { offset, .. } => debug!("Trace offset: {offset} Jy"),
        }

        // Line-mode offsets and display frequencies are only used for plots.
        if let Some(output) = output {
            write_matrix(output, stack.matrix.view(), &stack.freqs_mhz)?;
            info!("Stacked profiles written to {}", output.display());
        }
        if let Some(plot) = plot {
            draw(plot, &stack)?;
            info!("Wrote {}", plot.display());
        }

        Ok(stack)
    }
}

#[cfg(feature = "plotting")]
fn draw(plot: &Path, stack: &BandStack) -> Result<(), StackRunError> {
    crate::plotting::plot_stack(plot, stack)?;
    Ok(())
}

#[cfg(not(feature = "plotting"))]
fn draw(_plot: &Path, _stack: &BandStack) -> Result<(), StackRunError> {
    Err(StackRunError::NoPlottingFeature)
}

#[derive(Error, Debug)]
pub(crate) enum StackRunError {
    #[cfg(not(feature = "plotting"))]
    #[error("fluxcal was not compiled with the \"plotting\" feature, so the plot can't be made")]
    NoPlottingFeature,

    #[cfg(feature = "plotting")]
    #[error(transparent)]
    Draw(#[from] crate::plotting::DrawError),

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error(transparent)]
    FileWrite(#[from] FileWriteError),
}
