#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the flow module.
pub mod error;

/// dense optical flow estimation module.
pub mod farneback;

/// flow field rendering module.
pub mod render;

pub use crate::error::FlowError;
pub use crate::farneback::{calc_optical_flow_farneback, FarnebackParams};
pub use crate::render::{render_flow, FlowColorMode};
