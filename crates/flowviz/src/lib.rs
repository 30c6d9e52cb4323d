#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use flowviz_image as image;

#[doc(inline)]
pub use flowviz_imgproc as imgproc;

#[doc(inline)]
pub use flowviz_flow as flow;

#[doc(inline)]
pub use flowviz_io as io;

/// end to end video processing pipeline.
pub mod pipeline;
