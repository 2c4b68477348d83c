use std::io;
use std::path::Path;

use image::{ImageError, ImageFormat, ImageReader};
use thiserror::Error;

use crate::frame::Frame;

/// Classified decoder failure.
#[derive(Debug, Error)]
pub enum DecodeFailure {
    /// The file does not exist; never retried.
    #[error("frame file is missing")]
    Missing,
    /// The file exists but could not be decoded, typically because a producer
    /// is still writing it.
    #[error("frame file is unreadable: {0}")]
    Corrupt(String),
}

/// Decodes one frame file into linear RGB.
pub trait FrameDecoder: Send + Sync {
    /// Reads the frame stored at `path`.
    fn decode(&self, path: &Path) -> Result<Frame, DecodeFailure>;
}

/// OpenEXR decoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExrDecoder;

impl FrameDecoder for ExrDecoder {
    fn decode(&self, path: &Path) -> Result<Frame, DecodeFailure> {
        if !path.exists() {
            return Err(DecodeFailure::Missing);
        }
        let mut reader = ImageReader::open(path).map_err(classify_io)?;
        reader.set_format(ImageFormat::OpenExr);
        let image = reader.decode().map_err(|err| match err {
            ImageError::IoError(io_err) => classify_io(io_err),
            other => DecodeFailure::Corrupt(other.to_string()),
        })?;
        Ok(Frame::from(image.into_rgb32f()))
    }
}

fn classify_io(err: io::Error) -> DecodeFailure {
    if err.kind() == io::ErrorKind::NotFound {
        DecodeFailure::Missing
    } else {
        DecodeFailure::Corrupt(err.to_string())
    }
}
