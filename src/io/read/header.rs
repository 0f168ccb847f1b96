// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Profile headers.
//!
//! Header lines look like
//!
//! ```text
//! # Centre frequency                  : 1369.5 MHz
//! # Channel bandwidth                 : 0.5 MHz
//! # Bandwidth                         : 16 MHz
//! # Duration                          : 600 s
//! ```
//!
//! i.e. a key, a colon, a number and an optional unit. Keys are matched
//! case-insensitively. If no header line has a known key, the header is
//! assumed to have the legacy layout, in which the first four header lines
//! are (in order) the centre frequency, channel bandwidth, bandwidth and
//! duration. Keys and positions are never mixed.

use log::trace;
use regex::Regex;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

use crate::constants::NUM_LEGACY_HEADER_LINES;

lazy_static::lazy_static! {
    static ref HEADER_LINE: Regex = Regex::new(
        r"^\s*(?P<key>[^:]*?)\s*:\s*(?P<value>[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*(?P<unit>[A-Za-z]+)?\s*$"
    )
    .expect("header regex is valid");
}

/// The values in a profile header needed to calibrate and stack it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ProfileHeader {
    /// \[MHz\]
    pub(crate) centre_freq_mhz: f64,

    /// \[MHz\]
    pub(crate) chan_bw_mhz: f64,

    /// \[MHz\]
    pub(crate) bw_mhz: f64,

    /// The length of the observation that was folded into the profile \[s\]
    pub(crate) duration_s: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub(crate) enum HeaderField {
    #[strum(serialize = "centre frequency")]
    CentreFreq,

    #[strum(serialize = "channel bandwidth")]
    ChanBw,

    #[strum(serialize = "bandwidth")]
    Bw,

    #[strum(serialize = "duration")]
    Duration,
}

impl HeaderField {
    /// Lower-case keys that identify this field.
    fn keys(self) -> &'static [&'static str] {
        match self {
            HeaderField::CentreFreq => &["centre frequency", "center frequency", "fcentre"],
            HeaderField::ChanBw => &["channel bandwidth", "chan bw", "chanbw"],
            HeaderField::Bw => &["bandwidth", "bw", "total bandwidth"],
            HeaderField::Duration => &["duration", "time", "tobs", "length of observation"],
        }
    }

    fn matches(self, key: &str) -> bool {
        self.keys().contains(&key)
    }

    /// Which header line holds this field in the legacy layout.
    fn legacy_position(self) -> usize {
        match self {
            HeaderField::CentreFreq => 0,
            HeaderField::ChanBw => 1,
            HeaderField::Bw => 2,
            HeaderField::Duration => 3,
        }
    }

    /// The factor that converts a value with the given unit into MHz (for
    /// frequencies) or seconds (for the duration). No unit means the value is
    /// already in MHz or seconds.
    fn unit_scale(self, unit: Option<&str>) -> Result<f64, HeaderError> {
        let unit = match unit {
            None => return Ok(1.0),
            Some(u) => u.to_lowercase(),
        };
        let scale = match (self, unit.as_str()) {
            (HeaderField::Duration, "s" | "sec" | "secs" | "seconds") => Some(1.0),
            (HeaderField::Duration, "ms") => Some(1e-3),
            (HeaderField::Duration, "min" | "mins") => Some(60.0),
            (HeaderField::Duration, "h" | "hr" | "hours") => Some(3600.0),
            (HeaderField::Duration, _) => None,
            (_, "mhz") => Some(1.0),
            (_, "ghz") => Some(1e3),
            (_, "khz") => Some(1e-3),
            (_, "hz") => Some(1e-6),
            (_, _) => None,
        };
        scale.ok_or(HeaderError::UnknownUnit { field: self, unit })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct HeaderEntry {
    /// Lower case, with internal whitespace collapsed.
    key: String,
    value: f64,
    unit: Option<String>,
}

impl HeaderEntry {
    fn parse(line: &str) -> Option<HeaderEntry> {
        let caps = HEADER_LINE.captures(line)?;
        let key = caps["key"]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let value = caps["value"].parse().ok()?;
        let unit = caps.name("unit").map(|u| u.as_str().to_string());
        Some(HeaderEntry { key, value, unit })
    }
}

impl ProfileHeader {
    /// Interpret header lines (without their leading `#`).
    pub(crate) fn parse<S: AsRef<str>>(lines: &[S]) -> Result<ProfileHeader, HeaderError> {
        let (entries, keyed) = header_entries(lines);
        let mut values = [0.0; 4];
        for (field, value) in HeaderField::iter().zip(values.iter_mut()) {
            *value = lookup(field, lines, &entries, keyed)?;
        }
        let [centre_freq_mhz, chan_bw_mhz, bw_mhz, duration_s] = values;

        Ok(ProfileHeader {
            centre_freq_mhz,
            chan_bw_mhz,
            bw_mhz,
            duration_s,
        })
    }
}

/// Find only the centre frequency \[MHz\] in header lines. The rest of the
/// header may be absent or broken.
pub(crate) fn parse_centre_freq<S: AsRef<str>>(lines: &[S]) -> Result<f64, HeaderError> {
    let (entries, keyed) = header_entries(lines);
    lookup(HeaderField::CentreFreq, lines, &entries, keyed)
}

/// Parse each header line, and report whether any line has a known key.
fn header_entries<S: AsRef<str>>(lines: &[S]) -> (Vec<Option<HeaderEntry>>, bool) {
    let entries: Vec<Option<HeaderEntry>> = lines
        .iter()
        .map(|l| HeaderEntry::parse(l.as_ref()))
        .collect();

    // One known key means every field must be found by its key.
    let keyed = entries
        .iter()
        .flatten()
        .any(|e| HeaderField::iter().any(|f| f.matches(&e.key)));
    if !keyed {
        trace!("No known header keys; assuming the legacy layout");
    }
    (entries, keyed)
}

fn lookup<S: AsRef<str>>(
    field: HeaderField,
    lines: &[S],
    entries: &[Option<HeaderEntry>],
    keyed: bool,
) -> Result<f64, HeaderError> {
    let entry = match entries.iter().flatten().find(|e| field.matches(&e.key)) {
        Some(e) => e,
        None if keyed => return Err(HeaderError::Missing { field }),
        None => {
            let position = field.legacy_position();
            let legacy = &entries[..entries.len().min(NUM_LEGACY_HEADER_LINES)];
            match legacy.get(position) {
                Some(Some(e)) => {
                    trace!("Using header line {} as the {field}", position + 1);
                    e
                }
                Some(None) => {
                    return Err(HeaderError::Unparsable {
                        field,
                        line_num: position + 1,
                        line: lines[position].as_ref().trim().to_string(),
                    })
                }
                None => return Err(HeaderError::Missing { field }),
            }
        }
    };

    let value = entry.value * field.unit_scale(entry.unit.as_deref())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(HeaderError::NonPositive { field, value });
    }
    Ok(value)
}

#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum HeaderError {
    #[error("No {field} was found in the header")]
    Missing { field: HeaderField },

    #[error("Expected the {field} on header line {line_num}, but couldn't parse '{line}'")]
    Unparsable {
        field: HeaderField,
        line_num: usize,
        line: String,
    },

    #[error("Unrecognised unit '{unit}' for the {field}")]
    UnknownUnit { field: HeaderField, unit: String },

    #[error("The {field} must be positive, but got {value}")]
    NonPositive { field: HeaderField, value: f64 },
}
