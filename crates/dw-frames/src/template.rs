use std::fmt;
use std::path::{Path, PathBuf};

use dw_core::errors::{DwError, ErrorInfo};

const PLACEHOLDER: &str = "{}";

/// Frame file name pattern with a single `{}` placeholder for the 1-based index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameTemplate {
    prefix: String,
    suffix: String,
}

impl FrameTemplate {
    /// Parses a pattern such as `30fps.SVGFPass.Filtered image.{}.exr`.
    pub fn new(pattern: &str) -> Result<Self, DwError> {
        let mut pieces = pattern.split(PLACEHOLDER);
        match (pieces.next(), pieces.next(), pieces.next()) {
            (Some(prefix), Some(suffix), None) => Ok(Self {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            }),
            _ => Err(DwError::Config(
                ErrorInfo::new("frame-template", "pattern needs exactly one {} placeholder")
                    .with_context("pattern", pattern),
            )),
        }
    }

    /// Renderer default layout `{fps}fps.{pass}.{channel}.{}.exr`.
    pub fn renderer(fps: u32, pass: &str, channel: &str) -> Self {
        Self {
            prefix: format!("{fps}fps.{pass}.{channel}."),
            suffix: ".exr".to_string(),
        }
    }

    /// File name of frame `index`.
    pub fn file_name(&self, index: usize) -> String {
        format!("{}{index}{}", self.prefix, self.suffix)
    }

    /// Full path of frame `index` inside `root`.
    pub fn path(&self, root: &Path, index: usize) -> PathBuf {
        root.join(self.file_name(index))
    }
}

impl fmt::Display for FrameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{PLACEHOLDER}{}", self.prefix, self.suffix)
    }
}
