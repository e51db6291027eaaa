// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TOML configuration for a [`Store`](crate::Store).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use strata_geometry::TestParams;

use crate::{ConfigError, RecordId};

/// Environment variable naming a config file for [`StoreConfig::discover`].
pub const CONFIG_ENV: &str = "STRATA_CONFIG";

/// Root of the store configuration.
///
/// ```toml
/// first_id = 1
///
/// [index]
/// cell_size = 64.0
///
/// [tests]
/// line_tolerance = 1.0
///
/// [logging]
/// level = "info"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreConfig {
    /// First id handed out to records put without one.
    #[serde(default = "StoreConfig::default_first_id")]
    pub first_id: RecordId,
    /// Spatial index settings.
    #[serde(default)]
    pub index: IndexConfig,
    /// Tolerances for the exact intersection tests.
    #[serde(default)]
    pub tests: TestParams,
    /// Log filter for binaries embedding the store.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StoreConfig {
    fn default_first_id() -> RecordId {
        1
    }

    /// Load a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Find a config: the file named by `STRATA_CONFIG` if set, else
    /// `./config/strata.toml` if it exists, else the defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("strata.toml"))
            .map_err(|source| ConfigError::Context {
                message: "failed to read the current directory".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            first_id: Self::default_first_id(),
            index: IndexConfig::default(),
            tests: TestParams::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Spatial index settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexConfig {
    /// Side length of a uniform grid cell.
    #[serde(default = "IndexConfig::default_cell_size")]
    pub cell_size: f64,
}

impl IndexConfig {
    fn default_cell_size() -> f64 {
        64.0
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cell_size: Self::default_cell_size(),
        }
    }
}

/// Logging settings, consumed by whoever installs the subscriber.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as `info` or `strata_store=debug`.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, StoreConfig::default());
        assert_eq!(cfg.first_id, 1);
        assert_eq!(cfg.index.cell_size, 64.0);
        assert_eq!(cfg.tests, TestParams::default());
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = StoreConfig::from_toml_str(
            r#"
            [tests]
            line_tolerance = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.tests.line_tolerance, 0.5);
        assert_eq!(cfg.tests.vertex_merge, 0.01);
        assert_eq!(cfg.index.cell_size, 64.0);
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            first_id = 100

            [index]
            cell_size = 16.0

            [tests]
            line_tolerance = 2.0
            vertex_merge = 0.1
            snap = 0.001

            [logging]
            level = "strata_store=debug"
            "#
        )
        .unwrap();

        let cfg = StoreConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.first_id, 100);
        assert_eq!(cfg.index.cell_size, 16.0);
        assert_eq!(
            cfg.tests,
            TestParams {
                line_tolerance: 2.0,
                vertex_merge: 0.1,
                snap: 0.001,
            }
        );
        assert_eq!(cfg.logging.level, "strata_store=debug");
    }

    #[test]
    fn missing_and_malformed_files_report_their_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            StoreConfig::from_file(&missing),
            Err(ConfigError::Io { path, .. }) if path == missing
        ));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "first_id = \"one\"").expect("write file");
        assert!(matches!(
            StoreConfig::from_file(&bad),
            Err(ConfigError::Parse { path, .. }) if path == bad
        ));
    }
}
