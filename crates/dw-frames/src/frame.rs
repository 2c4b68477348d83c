use std::path::Path;

use dw_core::errors::{DwError, ErrorInfo};
use image::Rgb32FImage;

/// Linear-light RGB frame stored row-major with interleaved channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Frame {
    /// Wraps interleaved RGB samples; `data.len()` must equal `width * height * 3`.
    pub fn from_rgb(width: usize, height: usize, data: Vec<f32>) -> Result<Self, DwError> {
        if data.len() != width * height * 3 {
            return Err(DwError::FrameRead(
                ErrorInfo::new("frame-shape", "sample count does not match dimensions")
                    .with_context("width", width.to_string())
                    .with_context("height", height.to_string())
                    .with_context("samples", data.len().to_string()),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame filled with a constant colour.
    pub fn filled(width: usize, height: usize, rgb: [f32; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Interleaved samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable interleaved samples.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// RGB triple at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        let offset = (y * self.width + x) * 3;
        [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
    }

    /// True when both frames have the same dimensions.
    pub fn same_shape(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl From<Rgb32FImage> for Frame {
    fn from(image: Rgb32FImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width: width as usize,
            height: height as usize,
            data: image.into_raw(),
        }
    }
}

/// Writes `frame` as a 32-bit float OpenEXR file.
pub fn write_exr(path: &Path, frame: &Frame) -> Result<(), DwError> {
    let image = Rgb32FImage::from_raw(frame.width as u32, frame.height as u32, frame.data.clone())
        .ok_or_else(|| {
            DwError::FrameRead(
                ErrorInfo::new("frame-shape", "frame buffer does not match its dimensions")
                    .with_path(path),
            )
        })?;
    image
        .save_with_format(path, image::ImageFormat::OpenExr)
        .map_err(|err| DwError::io("frame-write", path, err))
}
