//! `metadata.txt` sidecar written next to every recorded frame sequence.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{encode, PartialConfig};
use crate::config::ExperimentConfig;
use crate::errors::{DwError, ErrorInfo};
use crate::serde::{from_json_slice, to_pretty_json_bytes};

/// File name of the run metadata inside a sequence directory.
pub const METADATA_FILE: &str = "metadata.txt";

/// Parsed contents of a run's `metadata.txt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Configuration the sequence was rendered with.
    pub config: ExperimentConfig,
    /// Recording frame rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    /// Number of frames written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<usize>,
    /// Samples per pixel of the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u32>,
}

impl RunMetadata {
    /// Metadata carrying only the configuration.
    pub fn new(config: ExperimentConfig) -> Self {
        Self {
            config,
            fps: None,
            frame_count: None,
            sample_count: None,
        }
    }
}

/// Path of the metadata file inside `dir`.
pub fn metadata_path(dir: &Path) -> PathBuf {
    dir.join(METADATA_FILE)
}

/// Writes `metadata` into `dir/metadata.txt`.
pub fn store_metadata(dir: &Path, metadata: &RunMetadata) -> Result<PathBuf, DwError> {
    let path = metadata_path(dir);
    let bytes = to_pretty_json_bytes(metadata)?;
    fs::write(&path, bytes).map_err(|err| DwError::io("metadata-write", &path, err))?;
    Ok(path)
}

/// Reads and parses `dir/metadata.txt`.
pub fn load_metadata(dir: &Path) -> Result<RunMetadata, DwError> {
    let path = metadata_path(dir);
    let bytes = fs::read(&path).map_err(|err| {
        DwError::Metadata(
            ErrorInfo::new("metadata-read", "metadata file is unreadable")
                .with_path(&path)
                .with_hint(err.to_string()),
        )
    })?;
    from_json_slice(&bytes).map_err(|err| {
        DwError::Metadata(
            ErrorInfo::new("metadata-parse", err.info().message.clone()).with_path(&path),
        )
    })
}

/// Loads the metadata of `dir` and verifies it was rendered with `expected`.
///
/// Configurations are compared on their encoded fields, so values the name
/// does not carry never cause a mismatch. `expected` is either the projection
/// of a requested [`ExperimentConfig`] or the fields decoded from a discovered
/// directory name.
pub fn check_metadata(dir: &Path, expected: &PartialConfig) -> Result<RunMetadata, DwError> {
    let metadata = load_metadata(dir)?;
    if PartialConfig::from(&metadata.config) != *expected {
        let directory = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(DwError::Metadata(
            ErrorInfo::new("metadata-mismatch", "recorded configuration differs from the expected one")
                .with_path(&metadata_path(dir))
                .with_context("directory", directory)
                .with_context("recorded", encode(&metadata.config).into_string()),
        ));
    }
    debug!(dir = %dir.display(), "metadata matches expected configuration");
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionMode;

    fn config(alpha: f64) -> ExperimentConfig {
        ExperimentConfig::builder("Scene", SelectionMode::Unweighted)
            .iters(1, 0)
            .alpha(alpha)
            .build()
            .unwrap()
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = RunMetadata {
            fps: Some(30),
            frame_count: Some(600),
            ..RunMetadata::new(config(0.05))
        };
        store_metadata(dir.path(), &metadata).unwrap();
        let text = fs::read_to_string(metadata_path(dir.path())).unwrap();
        assert!(text.contains("\"steepness\": \"inf\""));
        assert_eq!(load_metadata(dir.path()).unwrap(), metadata);
    }

    #[test]
    fn mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        store_metadata(dir.path(), &RunMetadata::new(config(0.05))).unwrap();
        let err = check_metadata(dir.path(), &PartialConfig::from(&config(0.1))).unwrap_err();
        assert_eq!(err.info().code, "metadata-mismatch");
        assert_eq!(
            err.info().context.get("recorded").map(String::as_str),
            Some("Scene_iters(1,0)_Alpha(0.05)")
        );
        assert!(check_metadata(dir.path(), &PartialConfig::from(&config(0.05))).is_ok());
    }

    #[test]
    fn decoded_name_is_checked_against_metadata() {
        let dir = tempfile::tempdir().unwrap();
        store_metadata(dir.path(), &RunMetadata::new(config(0.05))).unwrap();
        let decoded = crate::codec::decode("Scene_iters(1,0)_Alpha(0.05)", "Scene").unwrap();
        assert!(check_metadata(dir.path(), &decoded).is_ok());
        let renamed = crate::codec::decode("Scene_iters(1,0)_Alpha(0.2)", "Scene").unwrap();
        assert!(matches!(check_metadata(dir.path(), &renamed), Err(DwError::Metadata(_))));
    }

    #[test]
    fn missing_file_is_metadata_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_metadata(dir.path()), Err(DwError::Metadata(_))));
    }
}
