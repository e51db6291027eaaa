// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::path::PathBuf;

use strata_geometry::GeometryError;
use thiserror::Error;

use crate::RecordId;

/// Failures raised by store operations and queries.
#[derive(Debug, Error)]
pub enum Error {
    /// Normalization or intersection testing failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// No record with this id.
    #[error("unknown record id {0}")]
    UnknownId(RecordId),
    /// Every id up to `u64::MAX` has been handed out.
    #[error("record ids exhausted")]
    IdSpaceExhausted,
    /// A JSON record or query could not be decoded.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] serde_json::Error),
}

/// Failures while loading a [`StoreConfig`](crate::StoreConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for a store config.
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },
    /// Some other I/O step of discovery failed.
    #[error("{message}")]
    Context {
        /// What was being done.
        message: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
