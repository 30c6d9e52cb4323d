use gstreamer as gst;

/// An error type for the video module.
#[derive(thiserror::Error, Debug)]
pub enum VideoError {
    /// An error occurred during GStreamer initialization or pipeline parsing.
    #[error(transparent)]
    GStreamer(#[from] gst::glib::Error),

    /// An error occurred during GStreamer downcast of a pipeline element.
    #[error("Failed to downcast pipeline element")]
    DowncastPipeline(gst::Element),

    /// An error occurred while looking up a pipeline element by name.
    #[error("Failed to get an element by name")]
    GetElementByName,

    /// An error occurred while getting the pipeline bus.
    #[error("Failed to get the bus")]
    Bus,

    /// An error occurred while setting the pipeline state.
    #[error(transparent)]
    SetPipelineState(#[from] gst::StateChangeError),

    /// An error occurred while pushing a buffer into the pipeline.
    #[error(transparent)]
    GStreamerFlow(#[from] gst::FlowError),

    /// An error occurred while reading the caps of a sample.
    #[error("Failed to get the caps from the sample")]
    GetCaps,

    /// An error occurred while reading a field from the caps.
    #[error("Failed to get the {0} from the caps")]
    GetCapsField(&'static str),

    /// An error occurred while getting the buffer from a sample.
    #[error("Failed to get the buffer from the sample")]
    GetBuffer,

    /// An error occurred while mapping a buffer for reading.
    #[error("Failed to map the buffer as readable")]
    MapBuffer,

    /// The input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// An error for an invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An error occurred while checking the image format.
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    /// An error from the image container.
    #[error(transparent)]
    Image(#[from] flowviz_image::ImageError),
}
