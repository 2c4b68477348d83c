//! Structured error types shared across the evaluation crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`DwError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, frame counts, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Adds the displayed form of `path` under the `path` key.
    pub fn with_path(self, path: &Path) -> Self {
        self.with_context("path", path.display().to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the evaluation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum DwError {
    /// A canonical name does not match the experiment grammar.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
    /// The reference directory of a sweep item does not exist.
    #[error("missing reference: {0}")]
    MissingReference(ErrorInfo),
    /// The candidate directory of a sweep item does not exist.
    #[error("missing candidate: {0}")]
    MissingCandidate(ErrorInfo),
    /// Fewer frames exist than the sweep requires.
    #[error("insufficient frames: {0}")]
    InsufficientFrames(ErrorInfo),
    /// A frame sequence ended before the length required by the caller.
    #[error("sequence too short: {0}")]
    SequenceTooShort(ErrorInfo),
    /// A frame failed to decode after every retry.
    #[error("frame read error: {0}")]
    FrameRead(ErrorInfo),
    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Metadata is unreadable or disagrees with the expected configuration.
    #[error("metadata error: {0}")]
    Metadata(ErrorInfo),
    /// Filesystem failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl DwError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            DwError::Parse(info)
            | DwError::MissingReference(info)
            | DwError::MissingCandidate(info)
            | DwError::InsufficientFrames(info)
            | DwError::SequenceTooShort(info)
            | DwError::FrameRead(info)
            | DwError::Config(info)
            | DwError::Metadata(info)
            | DwError::Io(info)
            | DwError::Serde(info) => info,
        }
    }

    /// Wraps an IO failure on `path` with the given code.
    pub fn io(code: &str, path: &Path, err: impl ToString) -> Self {
        DwError::Io(
            ErrorInfo::new(code, "filesystem operation failed")
                .with_path(path)
                .with_hint(err.to_string()),
        )
    }

    /// Shorthand for an invalid configuration value.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        DwError::Config(ErrorInfo::new(code, message))
    }
}
