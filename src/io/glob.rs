// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Functions to glob files.

use std::path::PathBuf;

use glob::glob;
use thiserror::Error;

/// Given a glob pattern, get all of the matches from the filesystem.
pub(crate) fn get_all_matches_from_glob(g: &str) -> Result<Vec<PathBuf>, GlobError> {
    let mut entries = vec![];
    for entry in glob(g)? {
        match entry {
            Ok(e) => entries.push(e),
            Err(e) => return Err(GlobError::GlobCrate(e)),
        }
    }
    Ok(entries)
}

/// Expand each of the supplied strings into files. A string that names an
/// existing file is used as is (even if it contains glob characters);
/// otherwise it is treated as a glob, which must match at least one file. The
/// order of the inputs is preserved, and matches from a single glob are in
/// alphabetical order.
pub(crate) fn get_all_matches_from_globs<S: AsRef<str>>(
    globs: &[S],
) -> Result<Vec<PathBuf>, GlobError> {
    let mut files = vec![];
    for g in globs {
        let g = g.as_ref();
        let pb = PathBuf::from(g);
        if pb.is_file() {
            files.push(pb);
            continue;
        }
        let matches = get_all_matches_from_glob(g)?;
        if matches.is_empty() {
            return Err(GlobError::NoMatches {
                glob: g.to_string(),
            });
        }
        files.extend(matches);
    }
    Ok(files)
}

#[derive(Error, Debug)]
/// Error type associated with glob helper functions.
pub enum GlobError {
    #[error("No files were found for '{glob}'")]
    NoMatches { glob: String },

    #[error(transparent)]
    GlobCrate(#[from] glob::GlobError),

    #[error(transparent)]
    PatternError(#[from] glob::PatternError),
}
