use std::path::Path;

use flowviz_flow::{
    calc_optical_flow_farneback, render_flow, FarnebackParams, FlowColorMode, FlowError,
};
use flowviz_image::{Image, ImageError};
use flowviz_imgproc::color::gray_from_rgb_u8;
use flowviz_io::{VideoCodec, VideoError, VideoReader, VideoWriter};

/// An error type for the video processing pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Error when the frame skip is zero.
    #[error("Invalid frame skip ({0}), must be at least 1")]
    InvalidFrameSkip(usize),

    /// Error when the video yields fewer than two frames to process.
    #[error("The video has fewer than two frames to process")]
    EmptyVideo,

    /// Error from the optical flow estimator or renderer.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// Error from the video reader or writer.
    #[error(transparent)]
    Video(#[from] VideoError),

    /// Error from an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Configuration of the video processing pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// The optical flow estimator parameters.
    pub params: FarnebackParams,
    /// Process every nth frame of the input.
    pub frame_skip: usize,
    /// How the flow field is mapped to colors.
    pub color_mode: FlowColorMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            params: FarnebackParams::default(),
            frame_skip: 1,
            color_mode: FlowColorMode::default(),
        }
    }
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Total number of frames decoded from the input.
    pub frames_read: usize,
    /// Number of frame pairs rendered into the output.
    pub pairs_rendered: usize,
    /// The frame rate of the output video.
    pub output_fps: i32,
}

/// Replace each frame pair of a video with its dense optical flow rendering.
///
/// The input video is decoded frame by frame; every `frame_skip`-th frame is
/// kept, and each consecutive kept pair is run through the Farneback estimator
/// and the flow renderer. The output video has the input frame size and a
/// frame rate reduced by the skip factor.
///
/// # Arguments
///
/// * `input` - The path of the video to process.
/// * `output` - The path of the video to write.
/// * `config` - The pipeline configuration.
/// * `on_pair` - Callback invoked with the running pair count after each
///   rendered pair, for progress reporting.
pub fn process_video(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &PipelineConfig,
    mut on_pair: impl FnMut(usize),
) -> Result<PipelineReport, PipelineError> {
    config.params.validate()?;
    if config.frame_skip == 0 {
        return Err(PipelineError::InvalidFrameSkip(0));
    }

    let mut reader = VideoReader::new(input)?;
    reader.start()?;

    let size = reader.size();
    let output_fps = ((reader.fps() / config.frame_skip as f64).round() as i32).max(1);

    let mut writer = VideoWriter::new(output, VideoCodec::H264, output_fps, size)?;
    writer.start()?;

    log::info!(
        "processing video: size={}, output_fps={}, frame_skip={}, color_mode={}",
        size,
        output_fps,
        config.frame_skip,
        config.color_mode
    );

    let mut flow = Image::<f32, 2>::from_size_val(size, 0.0)?;
    let mut prev_gray: Option<Image<f32, 1>> = None;
    let mut frames_read = 0usize;
    let mut pairs_rendered = 0usize;

    while let Some(frame) = reader.read()? {
        frames_read += 1;
        if (frames_read - 1) % config.frame_skip != 0 {
            continue;
        }

        let gray = gray_frame(&frame)?;

        if let Some(prev) = prev_gray.take() {
            calc_optical_flow_farneback(&prev, &gray, &mut flow, &config.params)?;
            let rendered = render_flow(&flow, config.color_mode)?;
            writer.write(&rendered)?;

            pairs_rendered += 1;
            on_pair(pairs_rendered);
        }

        prev_gray = Some(gray);
    }

    writer.close()?;
    reader.close()?;

    if pairs_rendered == 0 {
        return Err(PipelineError::EmptyVideo);
    }

    log::info!("processed {pairs_rendered} frame pairs from {frames_read} frames");

    Ok(PipelineReport {
        frames_read,
        pairs_rendered,
        output_fps,
    })
}

/// Convert a decoded RGB8 frame to the grayscale intensity image the flow
/// estimator expects, in the [0, 255] range.
fn gray_frame(frame: &Image<u8, 3>) -> Result<Image<f32, 1>, PipelineError> {
    let mut gray_u8 = Image::<u8, 1>::from_size_val(frame.size(), 0)?;
    gray_from_rgb_u8(frame, &mut gray_u8)?;
    Ok(gray_u8.cast_and_scale::<f32>(1.0)?)
}
