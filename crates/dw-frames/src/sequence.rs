use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use dw_core::errors::{DwError, ErrorInfo};
use tracing::{debug, warn};

use crate::decoder::{DecodeFailure, ExrDecoder, FrameDecoder};
use crate::frame::Frame;
use crate::template::FrameTemplate;

/// Counts the frames of a sequence by probing indices from 1 until a file is missing.
pub fn count(root: &Path, template: &FrameTemplate) -> usize {
    let mut index = 1;
    while template.path(root, index).is_file() {
        index += 1;
    }
    index - 1
}

/// Iteration policy of a [`FrameSequence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOptions {
    /// Minimum number of frames the caller requires.
    pub expected: Option<usize>,
    /// Decode retries for a frame that exists but fails to decode.
    pub retries: u32,
    /// Pause between retries.
    pub retry_delay: Duration,
}

impl SequenceOptions {
    /// Default retry policy requiring at least `expected` frames.
    pub fn expecting(expected: usize) -> Self {
        Self {
            expected: Some(expected),
            ..Self::default()
        }
    }
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            expected: None,
            retries: 5,
            retry_delay: Duration::from_millis(50),
        }
    }
}

/// Lazy iterator over the frames `1..` of a recorded run.
///
/// The sequence ends at the first missing file, or fails with
/// [`DwError::SequenceTooShort`] when that file lies within the expected
/// length. After yielding an error the iterator is exhausted.
#[derive(Debug)]
pub struct FrameSequence<D: FrameDecoder = ExrDecoder> {
    root: PathBuf,
    template: FrameTemplate,
    options: SequenceOptions,
    decoder: D,
    next_index: usize,
    done: bool,
}

impl FrameSequence<ExrDecoder> {
    /// Opens the sequence in `root` with the OpenEXR decoder.
    pub fn open(root: impl Into<PathBuf>, template: FrameTemplate, options: SequenceOptions) -> Self {
        Self::with_decoder(root, template, options, ExrDecoder)
    }
}

impl<D: FrameDecoder> FrameSequence<D> {
    /// Opens the sequence with a custom decoder.
    pub fn with_decoder(
        root: impl Into<PathBuf>,
        template: FrameTemplate,
        options: SequenceOptions,
        decoder: D,
    ) -> Self {
        Self {
            root: root.into(),
            template,
            options,
            decoder,
            next_index: 1,
            done: false,
        }
    }

    /// Directory the frames are read from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Index of the frame the next call to `next` decodes.
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    fn read(&self, index: usize) -> Result<Option<Frame>, DwError> {
        let path = self.template.path(&self.root, index);
        let mut attempt = 0;
        loop {
            match self.decoder.decode(&path) {
                Ok(frame) => {
                    debug!(path = %path.display(), attempt, "decoded frame");
                    return Ok(Some(frame));
                }
                Err(DecodeFailure::Missing) => {
                    return match self.options.expected {
                        Some(expected) if index <= expected => Err(DwError::SequenceTooShort(
                            ErrorInfo::new("sequence-short", "frame sequence ended early")
                                .with_path(&self.root)
                                .with_context("missing_index", index.to_string())
                                .with_context("expected", expected.to_string()),
                        )),
                        _ => Ok(None),
                    };
                }
                Err(DecodeFailure::Corrupt(reason)) if attempt < self.options.retries => {
                    attempt += 1;
                    warn!(path = %path.display(), attempt, %reason, "retrying frame decode");
                    thread::sleep(self.options.retry_delay);
                }
                Err(DecodeFailure::Corrupt(reason)) => {
                    return Err(DwError::FrameRead(
                        ErrorInfo::new("frame-decode", "frame failed to decode after retries")
                            .with_path(&path)
                            .with_context("attempts", (attempt + 1).to_string())
                            .with_hint(reason),
                    ));
                }
            }
        }
    }
}

impl<D: FrameDecoder> Iterator for FrameSequence<D> {
    type Item = Result<Frame, DwError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let index = self.next_index;
        match self.read(index) {
            Ok(Some(frame)) => {
                self.next_index += 1;
                Some(Ok(frame))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<D: FrameDecoder> std::iter::FusedIterator for FrameSequence<D> {}
