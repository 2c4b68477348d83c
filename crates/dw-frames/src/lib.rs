#![doc = "Frame sequence access for recorded denoiser runs."]

pub mod decoder;
pub mod frame;
pub mod sequence;
pub mod template;

pub use decoder::{DecodeFailure, ExrDecoder, FrameDecoder};
pub use frame::{write_exr, Frame};
pub use sequence::{count, FrameSequence, SequenceOptions};
pub use template::FrameTemplate;
