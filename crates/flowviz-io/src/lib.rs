#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the video module.
pub mod error;

/// video reading and writing module.
pub mod video;

pub use crate::error::VideoError;
pub use crate::video::{VideoCodec, VideoReader, VideoWriter};
