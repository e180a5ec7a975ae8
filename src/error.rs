// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the fog engine.
//!
//! None of these are fatal: the session stays usable after any of them and
//! the application reports them in the status line.

use std::path::PathBuf;

/// An image could not be opened or decoded.
#[derive(Debug, thiserror::Error)]
#[error("failed to load image {}: {source}", .path.display())]
pub struct MediaError {
    pub path: PathBuf,
    #[source]
    pub source: image::ImageError,
}

/// Reading or writing a floor's sidecar record failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed map record {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode map record: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The viewer configuration file is unreadable or inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failures of session-level operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no floor at index {index} (have {len})")]
    InvalidFloorIndex { index: usize, len: usize },

    #[error("no floor is loaded")]
    NoActiveFloor,

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("{failed} of {total} floors could not be saved")]
    SaveAll { failed: usize, total: usize },
}
