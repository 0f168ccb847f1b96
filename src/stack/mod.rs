// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stack calibrated sub-band profiles into a frequency-phase matrix.
//!
//! Bands are sorted by centre frequency and calibrated with the channel
//! bandwidth, bandwidth and duration of the lowest-frequency band. The result
//! is either laid out as an image (one row per band, drawn from the lower edge
//! of each band) or as a set of traces, each raised by a fixed fraction of the
//! brightest sample.

mod error;

pub use error::StackError;

use log::{debug, warn};
use ndarray::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    calibrate::{
        calibrate_profile, tbin_from_tobs, BaselineMethod, CalibratedProfile, ObsParams,
        PhaseWindow,
    },
    constants::{HEADER_RELATIVE_TOLERANCE, MAX_STACK_TICKS, MHZ_TO_HZ, STACK_OFFSET_FRACTION},
};

/// How a stack is laid out.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StackMode {
    /// A frequency-phase image.
    #[default]
    #[strum(serialize = "image")]
    Image,

    /// One trace per band, each offset from the last.
    #[strum(serialize = "line")]
    Line,
}

/// The per-band values that are assumed to be common to all bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandMetadata {
    /// \[MHz\]
    pub chan_bw_mhz: f64,

    /// \[MHz\]
    pub bw_mhz: f64,

    /// \[s\]
    pub duration_s: f64,
}

impl BandMetadata {
    fn fields(&self) -> [(&'static str, f64); 3] {
        [
            ("channel bandwidth", self.chan_bw_mhz),
            ("bandwidth", self.bw_mhz),
            ("duration", self.duration_s),
        ]
    }
}

/// A raw sub-band profile.
#[derive(Debug, Clone, PartialEq)]
pub struct StackBand {
    /// The centre frequency of the band \[MHz\]
    pub freq_mhz: f64,

    pub profile: Vec<f64>,

    /// Only the lowest-frequency band needs this, unless metadata is being
    /// validated, in which case every band needs it.
    pub metadata: Option<BandMetadata>,

    /// Used to identify this band in messages (e.g. a file name).
    pub name: Option<String>,
}

impl StackBand {
    fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(n) => n.clone(),
            None => format!("band {index}"),
        }
    }
}

/// The calibration parameters shared by all bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackParams {
    /// System temperature \[K\]
    pub tsys: f64,

    /// Gain \[K/Jy\]
    pub gain: f64,

    pub npol: u32,

    /// If true, any band whose metadata differs from the lowest-frequency
    /// band's is an error. Otherwise, differences are only reported.
    pub validate_metadata: bool,
}

/// Where a stack's rows should be drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum StackLayout {
    Image {
        /// `[min phase, max phase, min frequency, max frequency]`, with
        /// frequencies in MHz. The frequency range covers the top band.
        extent: [f64; 4],
    },

    Line {
        /// The distance between successive traces \[Jy\]
        offset: f64,

        /// The calibrated matrix with row i raised by `i * offset`.
        traces: Array2<f64>,

        /// Where the frequency ticks go on the flux-density axis.
        tick_positions: Vec<f64>,

        /// The centre frequency of the band at each tick \[MHz\]
        tick_labels_mhz: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct BandStack {
    /// Calibrated profiles with shape (num_bands, num_bins), in ascending
    /// frequency order \[Jy\]
    pub matrix: Array2<f64>,

    /// The phase of each bin.
    pub phases: Vec<f64>,

    /// Sorted centre frequencies \[MHz\]
    pub freqs_mhz: Vec<f64>,

    /// The lower edge of each band, shifted up by half a channel \[MHz\]
    pub display_freqs_mhz: Vec<f64>,

    /// The names of the bands, in the same order as the rows.
    pub names: Vec<String>,

    pub calibrated: Vec<CalibratedProfile>,

    /// The metadata that was used for all bands.
    pub metadata: BandMetadata,

    pub layout: StackLayout,
}

impl BandStack {
    pub fn num_bands(&self) -> usize {
        self.matrix.len_of(Axis(0))
    }

    pub fn num_bins(&self) -> usize {
        self.matrix.len_of(Axis(1))
    }
}

/// Frequencies at which image rows start.
pub fn display_frequencies(freqs_mhz: &[f64], metadata: &BandMetadata) -> Vec<f64> {
    freqs_mhz
        .iter()
        .map(|f| f - metadata.bw_mhz / 2.0 + metadata.chan_bw_mhz / 2.0)
        .collect()
}

/// Tick rows for a line stack; no more than [`MAX_STACK_TICKS`] are used.
pub fn tick_rows(num_bands: usize) -> impl Iterator<Item = usize> {
    let num_ticks = num_bands.min(MAX_STACK_TICKS).max(1);
    let step = num_bands.div_ceil(num_ticks);
    (0..num_bands).step_by(step.max(1))
}

/// Sort, calibrate and lay out sub-band profiles.
pub fn assemble_stack(
    bands: &[StackBand],
    window: PhaseWindow,
    params: &StackParams,
    method: BaselineMethod,
    mode: StackMode,
) -> Result<BandStack, StackError> {
    if bands.is_empty() {
        return Err(StackError::NoBands);
    }
    for (index, band) in bands.iter().enumerate() {
        if !band.freq_mhz.is_finite() || band.freq_mhz <= 0.0 {
            return Err(StackError::InvalidFrequency {
                index,
                name: band.display_name(index),
                freq: band.freq_mhz,
            });
        }
    }

    // Stable, so bands with the same frequency stay in the order given.
    let mut order: Vec<usize> = (0..bands.len()).collect();
    order.sort_by(|&a, &b| bands[a].freq_mhz.total_cmp(&bands[b].freq_mhz));

    let lowest = order[0];
    let metadata = bands[lowest]
        .metadata
        .ok_or_else(|| StackError::MissingMetadata {
            index: lowest,
            name: bands[lowest].display_name(lowest),
        })?;
    check_metadata(bands, lowest, &metadata, params.validate_metadata)?;

    let num_bins = bands[lowest].profile.len();
    for &index in &order {
        let band = &bands[index];
        if band.profile.len() != num_bins {
            return Err(StackError::BinCountMismatch {
                index,
                name: band.display_name(index),
                num_bins: band.profile.len(),
                expected: num_bins,
            });
        }
    }

    let obs_params = ObsParams {
        tsys: params.tsys,
        gain: params.gain,
        npol: params.npol,
        tbin: tbin_from_tobs(metadata.duration_s, num_bins),
        bw: metadata.bw_mhz * MHZ_TO_HZ,
    };
    debug!("Stacking {} bands with {obs_params:?}", bands.len());

    let calibrated = order
        .par_iter()
        .map(|&index| {
            let band = &bands[index];
            calibrate_profile(&band.profile, window, &obs_params, method).map_err(|source| {
                StackError::Calibration {
                    index,
                    name: band.display_name(index),
                    source,
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut matrix = Array2::zeros((bands.len(), num_bins));
    for (mut row, cal) in matrix.outer_iter_mut().zip(calibrated.iter()) {
        row.assign(&cal.profile);
    }

    let phases: Vec<f64> = (0..num_bins).map(|i| i as f64 / num_bins as f64).collect();
    let freqs_mhz: Vec<f64> = order.iter().map(|&i| bands[i].freq_mhz).collect();
    let display_freqs_mhz = display_frequencies(&freqs_mhz, &metadata);
    let names = order.iter().map(|&i| bands[i].display_name(i)).collect();

    let layout = match mode {
        StackMode::Image => {
            let min_f = display_freqs_mhz
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);
            let max_f = display_freqs_mhz
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            StackLayout::Image {
                extent: [
                    phases[0],
                    phases[num_bins - 1],
                    min_f,
                    max_f + metadata.bw_mhz,
                ],
            }
        }

        StackMode::Line => {
            let max = matrix.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
            let offset = max * STACK_OFFSET_FRACTION;
            let mut traces = matrix.clone();
            for (i, mut row) in traces.outer_iter_mut().enumerate() {
                row += i as f64 * offset;
            }
            let rows: Vec<usize> = tick_rows(bands.len()).collect();
            StackLayout::Line {
                offset,
                traces,
                tick_positions: rows.iter().map(|&i| i as f64 * offset).collect(),
                tick_labels_mhz: rows.iter().map(|&i| freqs_mhz[i]).collect(),
            }
        }
    };

    Ok(BandStack {
        matrix,
        phases,
        freqs_mhz,
        display_freqs_mhz,
        names,
        calibrated,
        metadata,
        layout,
    })
}

/// Compare every band's metadata against the reference band's.
fn check_metadata(
    bands: &[StackBand],
    reference: usize,
    expected: &BandMetadata,
    strict: bool,
) -> Result<(), StackError> {
    for (index, band) in bands.iter().enumerate() {
        if index == reference {
            continue;
        }
        let metadata = match (&band.metadata, strict) {
            (Some(m), _) => m,
            (None, true) => {
                return Err(StackError::UnvalidatedMetadata {
                    index,
                    name: band.display_name(index),
                })
            }
            (None, false) => continue,
        };
        for ((field, found), (_, expected)) in metadata.fields().into_iter().zip(expected.fields())
        {
            let tol = HEADER_RELATIVE_TOLERANCE * found.abs().max(expected.abs());
            if (found - expected).abs() <= tol {
                continue;
            }
            if strict {
                return Err(StackError::MetadataMismatch {
                    index,
                    name: band.display_name(index),
                    field,
                    found,
                    expected,
                });
            }
            warn!(
                "{} has a {field} of {found}, but {expected} (from the lowest-frequency band) will be used",
                band.display_name(index)
            );
        }
    }
    Ok(())
}
