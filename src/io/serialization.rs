// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floor record serialization and deserialization.
//!
//! Each map image gets a JSON sidecar with the same stem and a `.map`
//! extension holding its explored centres and last view.

use crate::error::PersistenceError;
use crate::models::record::FloorRecord;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Sidecar path for an image: `maps/keep.png` -> `maps/keep.map`.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let candidate = image_path.with_extension("map");
    if candidate == image_path {
        let mut name = OsString::from(image_path.as_os_str());
        name.push(".map");
        PathBuf::from(name)
    } else {
        candidate
    }
}

/// Write a record as JSON.
pub fn export_record(record: &FloorRecord, path: &Path) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(record).map_err(PersistenceError::Encode)?;
    std::fs::write(path, json).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Read a record. A missing file is `Ok(None)`; anything unreadable or
/// malformed is an error.
pub fn import_record(path: &Path) -> Result<Option<FloorRecord>, PersistenceError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let record = serde_json::from_str(&json).map_err(|source| PersistenceError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(record))
}

/// Save the record that belongs to `image_path`. Returns the sidecar path.
pub fn save_for_image(record: &FloorRecord, image_path: &Path) -> Result<PathBuf, PersistenceError> {
    let path = sidecar_path(image_path);
    export_record(record, &path)?;
    Ok(path)
}

/// Load the record that belongs to `image_path`, if one was saved.
pub fn load_for_image(image_path: &Path) -> Result<Option<FloorRecord>, PersistenceError> {
    import_record(&sidecar_path(image_path))
}
