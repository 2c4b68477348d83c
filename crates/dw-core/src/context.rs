//! Explicit sweep context replacing process-wide experiment settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codec::CanonicalName;
use crate::errors::{DwError, ErrorInfo};
use crate::measure::{Device, ErrorKind, Field, VariantFlags};
use crate::serde::from_yaml_slice;

/// Everything a sweep needs to locate, compare and cache frame sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepContext {
    /// Scene prefix of every candidate directory.
    pub scene_name: String,
    /// Directory holding the recorded runs.
    pub record_root: PathBuf,
    /// Reference run, relative to `record_root` unless absolute.
    pub reference: PathBuf,
    /// Recording frame rate.
    #[serde(default = "SweepContext::default_fps")]
    pub fps: u32,
    /// Evaluated duration in seconds.
    #[serde(default = "SweepContext::default_duration")]
    pub duration: f64,
    /// Render pass part of the frame file name.
    #[serde(default = "SweepContext::default_pass")]
    pub pass: String,
    /// Output channel part of the frame file name.
    #[serde(default = "SweepContext::default_channel")]
    pub channel: String,
    /// Per-pixel error function.
    #[serde(default = "SweepContext::default_error_kind")]
    pub error_kind: ErrorKind,
    /// Fields computed for every item.
    #[serde(default = "SweepContext::default_fields")]
    pub fields: Vec<Field>,
    /// Cache variant switches.
    #[serde(default)]
    pub variant: VariantFlags,
    /// Numeric backend.
    #[serde(default)]
    pub device: Device,
    /// Decode retries per frame.
    #[serde(default = "SweepContext::default_retries")]
    pub retries: u32,
    /// Delay between decode retries in milliseconds.
    #[serde(default = "SweepContext::default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Ignore cached sidecars.
    #[serde(default)]
    pub force: bool,
    /// Fovea radius used instead of the candidate's own when masking.
    #[serde(default)]
    pub fovea_radius: Option<f64>,
}

impl SweepContext {
    const fn default_fps() -> u32 {
        30
    }

    const fn default_duration() -> f64 {
        20.0
    }

    fn default_pass() -> String {
        "SVGFPass".to_string()
    }

    fn default_channel() -> String {
        "Filtered image".to_string()
    }

    const fn default_error_kind() -> ErrorKind {
        ErrorKind::RelMse
    }

    fn default_fields() -> Vec<Field> {
        Field::ALL.to_vec()
    }

    const fn default_retries() -> u32 {
        5
    }

    const fn default_retry_delay_ms() -> u64 {
        50
    }

    /// Context with default settings for `scene_name`.
    pub fn new(
        scene_name: impl Into<String>,
        record_root: impl Into<PathBuf>,
        reference: impl Into<PathBuf>,
    ) -> Self {
        Self {
            scene_name: scene_name.into(),
            record_root: record_root.into(),
            reference: reference.into(),
            fps: Self::default_fps(),
            duration: Self::default_duration(),
            pass: Self::default_pass(),
            channel: Self::default_channel(),
            error_kind: Self::default_error_kind(),
            fields: Self::default_fields(),
            variant: VariantFlags::default(),
            device: Device::default(),
            retries: Self::default_retries(),
            retry_delay_ms: Self::default_retry_delay_ms(),
            force: false,
            fovea_radius: None,
        }
    }

    /// Number of frames every compared sequence must provide.
    pub fn required_frames(&self) -> usize {
        (f64::from(self.fps) * self.duration).round().max(0.0) as usize
    }

    /// Directory of the reference run.
    pub fn reference_dir(&self) -> PathBuf {
        self.record_root.join(&self.reference)
    }

    /// Directory of the candidate run called `name`.
    pub fn candidate_dir(&self, name: &CanonicalName) -> PathBuf {
        self.record_root.join(name.as_str())
    }

    /// Frame file pattern with a `{}` placeholder for the 1-based index.
    pub fn frame_pattern(&self) -> String {
        format!("{}fps.{}.{}.{{}}.exr", self.fps, self.pass, self.channel)
    }

    /// Delay between decode retries.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), DwError> {
        if self.scene_name.trim().is_empty() {
            return Err(DwError::config("context-scene", "scene name must not be empty"));
        }
        if self.fps == 0 {
            return Err(DwError::config("context-fps", "fps must be positive"));
        }
        if !(self.duration > 0.0 && self.duration.is_finite()) {
            return Err(DwError::Config(
                ErrorInfo::new("context-duration", "duration must be positive and finite")
                    .with_context("duration", format!("{:?}", self.duration)),
            ));
        }
        if self.fields.is_empty() {
            return Err(DwError::config("context-fields", "at least one field is required"));
        }
        if let Some(radius) = self.fovea_radius {
            if !(radius > 0.0) {
                return Err(DwError::config("context-fovea", "fovea radius must be positive"));
            }
        }
        Ok(())
    }
}

/// Loads and validates a YAML sweep context.
pub fn load_context(path: &Path) -> Result<SweepContext, DwError> {
    let bytes = fs::read(path).map_err(|err| DwError::io("context-read", path, err))?;
    let context: SweepContext = from_yaml_slice(&bytes).map_err(|err| {
        DwError::Config(
            ErrorInfo::new("context-parse", err.info().message.clone()).with_path(path),
        )
    })?;
    context.validate()?;
    info!(
        scene = %context.scene_name,
        fps = context.fps,
        duration = context.duration,
        "loaded sweep context"
    );
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_defaults_fill_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.yaml");
        fs::write(
            &path,
            "scene_name: VeachAjar\nrecord_root: /records\nreference: VeachAjar_iters(0,-1)_Alpha(0.05)_128\nfps: 60\nerror_kind: L1\n",
        )
        .unwrap();
        let context = load_context(&path).unwrap();
        assert_eq!(context.fps, 60);
        assert_eq!(context.error_kind, ErrorKind::L1);
        assert_eq!(context.retries, 5);
        assert_eq!(context.fields, Field::ALL.to_vec());
        assert_eq!(context.required_frames(), 1200);
        assert_eq!(
            context.frame_pattern(),
            "60fps.SVGFPass.Filtered image.{}.exr"
        );
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut context = SweepContext::new("Scene", "/records", "ref");
        context.duration = 0.0;
        assert!(matches!(context.validate(), Err(DwError::Config(_))));
    }
}
