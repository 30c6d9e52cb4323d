#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// image filtering module.
pub mod filter;

/// utilities for interpolation.
pub mod interpolation;

/// operations to normalize images.
pub mod normalize;

/// module containing parallelization utilities.
pub mod parallel;

/// cartesian to polar conversions for vector fields.
pub mod polar;

/// pyramid operations.
pub mod pyramid;

/// utility functions for resizing images.
pub mod resize;
