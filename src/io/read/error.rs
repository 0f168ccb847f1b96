// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading in profiles.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::HeaderError;

#[derive(Error, Debug)]
pub(crate) enum ProfileReadError {
    #[error("Couldn't read '{}': {source}", path.display())]
    IO {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{}' line {line_num}: couldn't parse '{text}' as a profile sample", path.display())]
    ParseSample {
        path: PathBuf,
        line_num: usize,
        text: String,
    },

    #[error("'{}' doesn't contain any profile samples", path.display())]
    NoSamples { path: PathBuf },

    #[error("'{}' has a bad header: {source}", path.display())]
    Header { path: PathBuf, source: HeaderError },
}

impl ProfileReadError {
    /// Errors raised while parsing a stream don't know which file they came
    /// from; attach it here.
    pub(super) fn with_path(self, p: &Path) -> ProfileReadError {
        match self {
            Self::IO { source, .. } => Self::IO {
                path: p.to_path_buf(),
                source,
            },
            Self::ParseSample { line_num, text, .. } => Self::ParseSample {
                path: p.to_path_buf(),
                line_num,
                text,
            },
            Self::NoSamples { .. } => Self::NoSamples {
                path: p.to_path_buf(),
            },
            Self::Header { source, .. } => Self::Header {
                path: p.to_path_buf(),
                source,
            },
        }
    }
}
