/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Resolves host paths before they are bind-mounted. Docker only accepts absolute host paths.

use std::path::{Path, PathBuf};

use faccess::{AccessMode, PathExt};

use crate::error::Error;

/// Returns the canonicalized absolute path of an existing file or directory.
pub fn absolute_path(path: &Path) -> Result<PathBuf, Error> {
    dunce::canonicalize(path).map_err(|_| Error::InvalidHostPath(path.to_path_buf()))
}

/// Creates the directory if it does not exist and returns its absolute path, checking that it is
/// writable since the container writes its artifacts there.
pub fn writable_dir(path: &Path) -> Result<PathBuf, Error> {
    std::fs::create_dir_all(path).map_err(|_| Error::InvalidHostPath(path.to_path_buf()))?;
    let canonicalized_path = absolute_path(path)?;
    canonicalized_path
        .access(AccessMode::WRITE)
        .map(|_| canonicalized_path.clone())
        .map_err(|_| Error::InvalidHostPath(path.to_path_buf()))
}
