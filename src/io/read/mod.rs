// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read folded profiles.
//!
//! Profiles are plain text with one sample per line. Lines starting with `#`
//! are header (or comment) lines; blank lines are ignored. See [`header`] for
//! how header values are interpreted.

mod error;
pub(crate) mod header;

pub(crate) use error::ProfileReadError;
pub(crate) use header::{HeaderError, ProfileHeader};

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use log::trace;

/// The contents of a profile file.
#[derive(Debug, Clone)]
pub(crate) struct ProfileFile {
    pub(crate) path: PathBuf,

    /// The raw samples, in file order.
    pub(crate) samples: Vec<f64>,

    /// The header lines, with the leading `#` removed.
    pub(crate) header_lines: Vec<String>,
}

impl ProfileFile {
    /// Interpret the header lines of this file.
    pub(crate) fn header(&self) -> Result<ProfileHeader, ProfileReadError> {
        ProfileHeader::parse(&self.header_lines).map_err(|source| ProfileReadError::Header {
            path: self.path.clone(),
            source,
        })
    }

    /// Interpret only the centre frequency \[MHz\] from the header lines of
    /// this file.
    pub(crate) fn centre_freq_mhz(&self) -> Result<f64, ProfileReadError> {
        header::parse_centre_freq(&self.header_lines).map_err(|source| {
            ProfileReadError::Header {
                path: self.path.clone(),
                source,
            }
        })
    }

    pub(crate) fn num_bins(&self) -> usize {
        self.samples.len()
    }

    /// A short name for this file suitable for messages.
    pub(crate) fn name(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Read a profile file.
pub(crate) fn read_profile_file(path: &Path) -> Result<ProfileFile, ProfileReadError> {
    trace!("Reading profile {}", path.display());
    let f = File::open(path).map_err(|source| ProfileReadError::IO {
        path: path.to_path_buf(),
        source,
    })?;
    let (samples, header_lines) =
        parse_profile(BufReader::new(f)).map_err(|e| e.with_path(path))?;
    if samples.is_empty() {
        return Err(ProfileReadError::NoSamples {
            path: path.to_path_buf(),
        });
    }
    trace!(
        "{}: {} samples, {} header lines",
        path.display(),
        samples.len(),
        header_lines.len()
    );

    Ok(ProfileFile {
        path: path.to_path_buf(),
        samples,
        header_lines,
    })
}

/// Split a profile into its samples and header lines.
pub(crate) fn parse_profile<R: BufRead>(
    reader: R,
) -> Result<(Vec<f64>, Vec<String>), ProfileReadError> {
    let mut samples = vec![];
    let mut header_lines = vec![];
    for (i_line, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ProfileReadError::IO {
            path: PathBuf::new(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(header) = trimmed.strip_prefix('#') {
            header_lines.push(header.to_string());
            continue;
        }

        let sample = trimmed
            .parse::<f64>()
            .map_err(|_| ProfileReadError::ParseSample {
                path: PathBuf::new(),
                line_num: i_line + 1,
                text: trimmed.to_string(),
            })?;
        samples.push(sample);
    }

    Ok((samples, header_lines))
}
