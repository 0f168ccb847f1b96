// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to plot spectral-index results and band stacks as PNGs.


use std::path::Path;

use plotters::prelude::*;
use thiserror::Error;

use crate::{
    constants::JY_TO_MJY,
    spec_index::SpectralIndexResult,
    stack::{BandStack, StackLayout},
};

/// The number of X pixels on the plots.
const X_PIXELS: u32 = 1600;
/// The number of Y pixels on the plots.
const Y_PIXELS: u32 = 900;

/// Pad a data range so that it can be used as a plot axis. Degenerate ranges
/// are widened.
fn axis_range(min: f64, max: f64) -> std::ops::Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span <= 0.0 {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return (min - pad)..(max + pad);
    }
    (min - span * 0.05)..(max + span * 0.05)
}

fn min_max<'a>(values: impl IntoIterator<Item = &'a f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Map `value` in `[min, max]` onto a blue-to-red ramp.
fn heat_colour(value: f64, min: f64, max: f64) -> HSLColor {
    let frac = if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.5
    };
    HSLColor(240.0 / 360.0 * (1.0 - frac), 1.0, 0.5)
}

/// Draw the calibrated profiles of every band (left) and the mean flux density
/// against frequency with its linear fit (right).
pub(crate) fn plot_spec_index(path: &Path, result: &SpectralIndexResult) -> Result<(), DrawError> {
    let root = BitMapBackend::new(path, (X_PIXELS, Y_PIXELS)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| DrawError::Profiles(e.to_string()))?;
    let panels = root.split_evenly((1, 2));

    // Profiles.
    let (lo, hi) = min_max(result.calibrated.iter().flat_map(|c| c.profile.iter()));
    let mut cc = ChartBuilder::on(&panels[0])
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..1.0, axis_range(lo * JY_TO_MJY, hi * JY_TO_MJY))
        .map_err(|e| DrawError::Profiles(e.to_string()))?;
    cc.configure_mesh()
        .x_desc("Phase")
        .y_desc("Flux Density (mJy)")
        .y_label_formatter(&|v| format!("{v:.1}"))
        .draw()
        .map_err(|e| DrawError::Profiles(e.to_string()))?;
    for (i, (cal, freq)) in result
        .calibrated
        .iter()
        .zip(result.freqs.iter())
        .enumerate()
    {
        let num_bins = cal.num_bins();
        let style = ShapeStyle::from(&Palette99::pick(i).to_rgba());
        cc.draw_series(LineSeries::new(
            cal.profile
                .iter()
                .enumerate()
                .map(|(j, &s)| (j as f64 / num_bins as f64, s * JY_TO_MJY)),
            style,
        ))
        .map_err(|e| DrawError::Profiles(e.to_string()))?
        .label(format!("{freq} GHz"))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }
    cc.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| DrawError::Profiles(e.to_string()))?;

    // Spectrum.
    let (f_lo, f_hi) = min_max(&result.freqs);
    let (s_lo, s_hi) = min_max(result.mean_fluxes.iter().chain(&result.fitted_fluxes));
    let mut cc = ChartBuilder::on(&panels[1])
        .margin(20)
        .caption(
            format!("Spectral index = {:.3}", result.spectral_index),
            ("sans-serif", 30),
        )
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(
            axis_range(f_lo, f_hi),
            axis_range(s_lo * JY_TO_MJY, s_hi * JY_TO_MJY),
        )
        .map_err(|e| DrawError::Spectrum(e.to_string()))?;
    cc.configure_mesh()
        .x_desc("Frequency (GHz)")
        .y_desc("Mean Flux Density (mJy)")
        .y_label_formatter(&|v| format!("{v:.3}"))
        .draw()
        .map_err(|e| DrawError::Spectrum(e.to_string()))?;
    cc.draw_series(
        result
            .freqs
            .iter()
            .zip(result.mean_fluxes.iter())
            .map(|(&f, &s)| Circle::new((f, s * JY_TO_MJY), 5, BLUE.filled())),
    )
    .map_err(|e| DrawError::Spectrum(e.to_string()))?;
    cc.draw_series(LineSeries::new(
        result
            .freqs
            .iter()
            .zip(result.fitted_fluxes.iter())
            .map(|(&f, &s)| (f, s * JY_TO_MJY)),
        &RED,
    ))
    .map_err(|e| DrawError::Spectrum(e.to_string()))?;

    root.present()
        .map_err(|e| DrawError::Spectrum(e.to_string()))?;
    Ok(())
}

/// Draw a band stack, either as a frequency-phase image or as offset traces,
/// depending on its layout.
pub(crate) fn plot_stack(path: &Path, stack: &BandStack) -> Result<(), DrawError> {
    let root = BitMapBackend::new(path, (X_PIXELS, Y_PIXELS)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| DrawError::Stack(e.to_string()))?;

    match &stack.layout {
        StackLayout::Image { extent } => {
            let [x0, x1, y0, y1] = *extent;
            let num_bands = stack.num_bands();
            let num_bins = stack.num_bins();
            // The image spans the extent, one cell per sample.
            let dx = if x1 > x0 { (x1 - x0) / num_bins as f64 } else { 1.0 };
            let dy = (y1 - y0) / num_bands as f64;
            let (lo, hi) = min_max(stack.matrix.iter());

            let mut cc = ChartBuilder::on(&root)
                .margin(20)
                .caption(
                    format!("Flux Density (Jy), {lo:.3} (blue) to {hi:.3} (red)"),
                    ("sans-serif", 30),
                )
                .x_label_area_size(50)
                .y_label_area_size(80)
                .build_cartesian_2d(x0..x0 + dx * num_bins as f64, y0..y1)
                .map_err(|e| DrawError::Stack(e.to_string()))?;
            cc.configure_mesh()
                .disable_mesh()
                .x_desc("Phase")
                .y_desc("Frequency (MHz)")
                .draw()
                .map_err(|e| DrawError::Stack(e.to_string()))?;
            cc.draw_series(stack.matrix.indexed_iter().map(|((i, j), &v)| {
                let x = x0 + j as f64 * dx;
                let y = y0 + i as f64 * dy;
                Rectangle::new(
                    [(x, y), (x + dx, y + dy)],
                    heat_colour(v, lo, hi).filled(),
                )
            }))
            .map_err(|e| DrawError::Stack(e.to_string()))?;
        }

        StackLayout::Line {
            traces,
            tick_positions,
            tick_labels_mhz,
            ..
        } => {
            let (lo, hi) = min_max(traces.iter());
            let mut cc = ChartBuilder::on(&root)
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(80)
                .build_cartesian_2d(0.0..1.0, axis_range(lo, hi))
                .map_err(|e| DrawError::Stack(e.to_string()))?;
            cc.configure_mesh()
                .x_desc("Phase")
                .y_desc("Flux Density (Jy), offset per band")
                .draw()
                .map_err(|e| DrawError::Stack(e.to_string()))?;
            for (i, trace) in traces.outer_iter().enumerate() {
                cc.draw_series(LineSeries::new(
                    stack.phases.iter().copied().zip(trace.iter().copied()),
                    ShapeStyle::from(&Palette99::pick(i).to_rgba()),
                ))
                .map_err(|e| DrawError::Stack(e.to_string()))?;
            }
            // Label the ticked bands with their frequencies.
            cc.draw_series(tick_positions.iter().zip(tick_labels_mhz.iter()).map(
                |(&y, &f)| {
                    Text::new(
                        format!("{f:.1} MHz"),
                        (0.01, y),
                        ("sans-serif", 18).into_font(),
                    )
                },
            ))
            .map_err(|e| DrawError::Stack(e.to_string()))?;
        }
    }

    root.present()
        .map_err(|e| DrawError::Stack(e.to_string()))?;
    Ok(())
}

#[derive(Error, Debug)]
pub(crate) enum DrawError {
    #[error("While plotting profiles: {0}")]
    Profiles(String),

    #[error("While plotting the flux density spectrum: {0}")]
    Spectrum(String),

    #[error("While plotting the band stack: {0}")]
    Stack(String),
}
