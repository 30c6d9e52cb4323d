/// An error type for the image module.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Error when the pixel data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images are expected to have the same size.
    #[error("Invalid image size ({0}x{1}), expected ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index ({0}) out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the pixel data cannot be cast to the requested type.
    #[error("Failed to cast the pixel data")]
    CastError,

    /// Error when a filter kernel has an invalid size.
    #[error("Kernel size ({0}) must be odd and non-zero")]
    InvalidKernelSize(usize),

    /// Error when a Gaussian sigma is not a positive finite number.
    #[error("Sigma ({0}) must be a positive finite number")]
    InvalidSigma(f32),

    /// Error when a pyramid scale factor is outside the open interval (0, 1).
    #[error("Scale factor ({0}) must be in the open interval (0, 1)")]
    InvalidScale(f32),
}
