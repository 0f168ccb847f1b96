// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Estimate a spectral index from profiles of the same pulsar observed in
//! several bands.
//!
//! Every band is calibrated and reduced to its on-pulse mean flux density S. A
//! straight line is fitted to S against frequency, and the spectral index is
//! the slope between the two extreme bands of that line in log-log space:
//!
//! α = (log10 S_fit(f_first) - log10 S_fit(f_last)) / (log10 f_first - log10 f_last)

mod error;
#[cfg(test)]
mod tests;

pub use error::SpecIndexError;

use log::{debug, trace};
use rayon::prelude::*;

use crate::{
    calibrate::{calibrate_profile, BaselineMethod, CalibratedProfile, ObsParams, PhaseWindow},
    math::{linear_fit, polyval},
};

/// A raw profile and the frequency it was observed at.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// The frequency of this band. Any unit may be used, as long as all bands
    /// use the same one.
    pub freq: f64,

    pub profile: Vec<f64>,

    /// Used to identify this band in messages (e.g. a file name).
    pub name: Option<String>,
}

impl Band {
    pub fn new(freq: f64, profile: Vec<f64>) -> Band {
        Band {
            freq,
            profile,
            name: None,
        }
    }

    fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(n) => n.clone(),
            None => format!("band {index}"),
        }
    }
}

/// A straight-line fit of flux density against frequency, and the spectral
/// index derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFit {
    pub spectral_index: f64,
    pub slope: f64,
    pub intercept: f64,

    /// The fitted line evaluated at each frequency.
    pub fitted_fluxes: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct SpectralIndexResult {
    pub spectral_index: f64,

    /// The slope of the linear fit of mean flux density against frequency.
    pub slope: f64,

    /// The intercept of the linear fit of mean flux density against frequency.
    pub intercept: f64,

    /// The band frequencies, in the order the bands were given.
    pub freqs: Vec<f64>,

    /// The on-pulse mean flux density of each band \[Jy\]
    pub mean_fluxes: Vec<f64>,

    pub fitted_fluxes: Vec<f64>,

    /// The calibrated profile of each band.
    pub calibrated: Vec<CalibratedProfile>,
}

/// Fit mean flux densities against frequency and get the spectral index from
/// the first and last points of the fitted line.
pub fn spectral_index_from_fluxes(
    freqs: &[f64],
    fluxes: &[f64],
) -> Result<SpectralFit, SpecIndexError> {
    if freqs.len() < 2 {
        return Err(SpecIndexError::TooFewBands {
            num_bands: freqs.len(),
        });
    }
    if let Some((index, &freq)) = freqs
        .iter()
        .enumerate()
        .find(|(_, &f)| !f.is_finite() || f <= 0.0)
    {
        return Err(SpecIndexError::NonPositiveFrequency { index, freq });
    }
    let f_first = freqs[0];
    let f_last = freqs[freqs.len() - 1];
    if f_first == f_last {
        return Err(SpecIndexError::IdenticalExtremeFrequencies { freq: f_first });
    }

    let (slope, intercept) = linear_fit(freqs, fluxes)?;
    trace!("Flux density fit: slope {slope}, intercept {intercept}");
    let fitted_fluxes: Vec<f64> = freqs
        .iter()
        .map(|&f| polyval(&[intercept, slope], f))
        .collect();

    // Every band's fitted flux must be positive, not just the extremes.
    if let Some((&freq, &flux)) = freqs
        .iter()
        .zip(fitted_fluxes.iter())
        .find(|(_, &s)| s.is_nan() || s <= 0.0)
    {
        return Err(SpecIndexError::NonPositiveFittedFlux { freq, flux });
    }
    let s_first = fitted_fluxes[0];
    let s_last = fitted_fluxes[fitted_fluxes.len() - 1];
    let spectral_index = (s_first.log10() - s_last.log10()) / (f_first.log10() - f_last.log10());

    Ok(SpectralFit {
        spectral_index,
        slope,
        intercept,
        fitted_fluxes,
    })
}

/// Calibrate every band and estimate the spectral index of their on-pulse
/// mean flux densities. All bands share the on-pulse window and observation
/// parameters, and so must have the same number of bins.
pub fn estimate_spectral_index(
    bands: &[Band],
    window: PhaseWindow,
    obs_params: &ObsParams,
    method: BaselineMethod,
) -> Result<SpectralIndexResult, SpecIndexError> {
    if bands.len() < 2 {
        return Err(SpecIndexError::TooFewBands {
            num_bands: bands.len(),
        });
    }
    let expected = bands[0].profile.len();
    for (index, band) in bands.iter().enumerate().skip(1) {
        if band.profile.len() != expected {
            return Err(SpecIndexError::BinCountMismatch {
                index,
                name: band.display_name(index),
                num_bins: band.profile.len(),
                expected,
            });
        }
    }
    let freqs: Vec<f64> = bands.iter().map(|b| b.freq).collect();
    if let Some((index, &freq)) = freqs
        .iter()
        .enumerate()
        .find(|(_, &f)| !f.is_finite() || f <= 0.0)
    {
        return Err(SpecIndexError::NonPositiveFrequency { index, freq });
    }

    // Bands are independent; the collect keeps them in order.
    let calibrated = bands
        .par_iter()
        .enumerate()
        .map(|(index, band)| {
            calibrate_profile(&band.profile, window, obs_params, method).map_err(|source| {
                SpecIndexError::Calibration {
                    index,
                    name: band.display_name(index),
                    source,
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mean_fluxes: Vec<f64> = calibrated.iter().map(|c| c.on_pulse_mean).collect();
    for (index, (band, cal)) in bands.iter().zip(calibrated.iter()).enumerate() {
        debug!(
            "{}: peak {:.6} Jy, mean {:.6} Jy, C = {:.6e}",
            band.display_name(index),
            cal.peak,
            cal.on_pulse_mean,
            cal.factor
        );
    }

    let SpectralFit {
        spectral_index,
        slope,
        intercept,
        fitted_fluxes,
    } = spectral_index_from_fluxes(&freqs, &mean_fluxes)?;

    Ok(SpectralIndexResult {
        spectral_index,
        slope,
        intercept,
        freqs,
        mean_fluxes,
        fitted_fluxes,
        calibrated,
    })
}
