use flowviz_image::ImageError;

/// An error type for the flow module.
#[derive(thiserror::Error, Debug)]
pub enum FlowError {
    /// Error when an estimator parameter is out of range.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// The name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Error when a color mode name is not recognized.
    #[error("Invalid color mode: {0}. Use 'grayscale' or 'hsv'")]
    InvalidColorMode(String),

    /// Error when the input images are too small for the polynomial window.
    #[error("Images are too small ({0}x{1}) for the polynomial window ({2})")]
    ImageTooSmall(usize, usize, usize),

    /// Error from an underlying image operation.
    #[error(transparent)]
    Image(#[from] ImageError),
}
