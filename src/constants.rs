// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `fluxcal` does all of its arithmetic
in double precision, even though profiles are often written in single
precision.
 */

/// The degree of the polynomial used to flatten profile baselines.
pub const BASELINE_POLY_DEGREE: usize = 4;

/// The band centre frequencies used by `spec-index` when the user doesn't
/// supply any \[GHz\].
pub const DEFAULT_SPEC_INDEX_FREQS: [f64; 6] = [11.2, 12.5, 13.8, 15.0, 16.3, 17.6];

/// The maximum number of frequency ticks drawn on a stacked line plot.
pub const MAX_STACK_TICKS: usize = 10;

/// Stacked line plots offset each band by this fraction of the largest
/// calibrated sample.
pub const STACK_OFFSET_FRACTION: f64 = 0.1;

/// The number of header lines a profile written with the legacy layout has
/// (centre frequency, channel bandwidth, bandwidth, duration).
pub const NUM_LEGACY_HEADER_LINES: usize = 4;

/// Header values that should be identical across bands are compared with this
/// relative tolerance.
pub const HEADER_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Megahertz to hertz.
pub const MHZ_TO_HZ: f64 = 1e6;

/// Jansky to millijansky; plots are labelled in mJy.
pub const JY_TO_MJY: f64 = 1e3;
