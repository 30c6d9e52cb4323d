use std::path::Path;

use gstreamer as gst;
use gstreamer_app as gst_app;

use gst::prelude::*;

use flowviz_image::{Image, ImageSize};

use crate::error::VideoError;

/// The codec to use for the video writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    /// H.264 codec.
    H264,
}

/// A struct for writing RGB8 frames into a video file.
pub struct VideoWriter {
    pipeline: gst::Pipeline,
    appsrc: gst_app::AppSrc,
    fps: i32,
    size: ImageSize,
    counter: u64,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl VideoWriter {
    /// Create a new VideoWriter.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to save the video file.
    /// * `codec` - The codec to use for the video writer.
    /// * `fps` - The frames per second of the video, clamped to at least 1.
    /// * `size` - The size of the video frames.
    pub fn new(
        path: impl AsRef<Path>,
        codec: VideoCodec,
        fps: i32,
        size: ImageSize,
    ) -> Result<Self, VideoError> {
        gst::init()?;

        let encoder = match codec {
            VideoCodec::H264 => "x264enc",
        };

        let fps = fps.max(1);

        let path = path.as_ref().to_owned();
        let location = if cfg!(windows) {
            path.to_string_lossy().replace('\\', "/")
        } else {
            path.to_string_lossy().into_owned()
        };

        let pipeline_str = format!(
            "appsrc name=src ! \
            videoconvert ! video/x-raw,format=I420 ! \
            {encoder} ! \
            video/x-h264,profile=main ! \
            h264parse ! \
            mp4mux ! \
            filesink location=\"{location}\""
        );
        log::debug!("writer pipeline: {pipeline_str}");

        let pipeline = gst::parse::launch(&pipeline_str)?
            .dynamic_cast::<gst::Pipeline>()
            .map_err(VideoError::DowncastPipeline)?;

        let appsrc = pipeline
            .by_name("src")
            .ok_or(VideoError::GetElementByName)?
            .dynamic_cast::<gst_app::AppSrc>()
            .map_err(VideoError::DowncastPipeline)?;

        appsrc.set_format(gst::Format::Time);

        let caps = gst::Caps::builder("video/x-raw")
            .field("format", "RGB")
            .field("width", size.width as i32)
            .field("height", size.height as i32)
            .field("framerate", gst::Fraction::new(fps, 1))
            .build();
        appsrc.set_caps(Some(&caps));
        appsrc.set_is_live(true);
        appsrc.set_property("block", false);

        Ok(Self {
            pipeline,
            appsrc,
            fps,
            size,
            counter: 0,
            handle: None,
        })
    }

    /// Start the video writer.
    ///
    /// Sets the pipeline to playing and launches a thread to drain the bus.
    pub fn start(&mut self) -> Result<(), VideoError> {
        self.pipeline.set_state(gst::State::Playing)?;

        let bus = self.pipeline.bus().ok_or(VideoError::Bus)?;
        let pipeline_weak = self.pipeline.downgrade();

        let handle = std::thread::spawn(move || {
            for msg in bus.iter_timed(gst::ClockTime::NONE) {
                if pipeline_weak.upgrade().is_none() {
                    break;
                }
                match msg.view() {
                    gst::MessageView::Eos(..) => {
                        log::debug!("writer bus received EOS");
                        break;
                    }
                    gst::MessageView::Error(err) => {
                        log::error!(
                            "writer bus error from {:?}: {} ({:?})",
                            msg.src().map(|s| s.path_string()),
                            err.error(),
                            err.debug()
                        );
                        break;
                    }
                    _ => {}
                }
            }
        });
        self.handle = Some(handle);

        Ok(())
    }

    /// Write an RGB8 frame to the video file.
    pub fn write(&mut self, img: &Image<u8, 3>) -> Result<(), VideoError> {
        if img.size() != self.size {
            return Err(VideoError::InvalidImageFormat(format!(
                "expected frame size {}, got {}",
                self.size,
                img.size()
            )));
        }

        let mut buffer = gst::Buffer::from_mut_slice(img.as_slice().to_vec());

        let pts = gst::ClockTime::from_nseconds(self.counter * 1_000_000_000 / self.fps as u64);
        let duration = gst::ClockTime::from_nseconds(1_000_000_000 / self.fps as u64);

        let buffer_ref = buffer
            .get_mut()
            .ok_or_else(|| VideoError::InvalidConfig("failed to map the frame buffer".into()))?;
        buffer_ref.set_pts(Some(pts));
        buffer_ref.set_duration(Some(duration));

        self.counter += 1;
        self.appsrc.push_buffer(buffer)?;

        Ok(())
    }

    /// Close the video writer.
    ///
    /// Sends EOS, joins the bus thread and brings the pipeline down so the
    /// container is finalized.
    pub fn close(&mut self) -> Result<(), VideoError> {
        match self.appsrc.end_of_stream() {
            Ok(_) => log::debug!("EOS signal sent to the writer"),
            Err(gst::FlowError::NotLinked) => {
                log::warn!("appsrc already EOS or not linked when sending EOS")
            }
            Err(err) => return Err(err.into()),
        }

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("failed to join the writer bus thread");
            }
        }

        self.pipeline.set_state(gst::State::Null)?;

        Ok(())
    }
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.close() {
                log::error!("error closing video writer in drop: {e}");
            }
        } else if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            log::error!("error setting writer pipeline to null in drop: {e}");
        }
    }
}

/// A struct for reading RGB8 frames from a video file.
pub struct VideoReader {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    fps: f64,
    size: ImageSize,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl VideoReader {
    /// Create a new VideoReader.
    ///
    /// The decoded frames are converted to RGB8 regardless of the source
    /// format.
    ///
    /// # Arguments
    ///
    /// * `path` - The path of the video file to read.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        let path = path.as_ref().to_owned();
        if !path.exists() {
            return Err(VideoError::FileNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        gst::init()?;

        let location = path.to_string_lossy();
        let pipeline_str = format!(
            "filesrc location=\"{location}\" ! \
            decodebin ! \
            videoconvert ! \
            video/x-raw,format=RGB ! \
            appsink name=sink sync=false max-buffers=5 drop=false"
        );
        log::debug!("reader pipeline: {pipeline_str}");

        let pipeline = gst::parse::launch(&pipeline_str)?
            .dynamic_cast::<gst::Pipeline>()
            .map_err(VideoError::DowncastPipeline)?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or(VideoError::GetElementByName)?
            .dynamic_cast::<gst_app::AppSink>()
            .map_err(VideoError::DowncastPipeline)?;

        Ok(Self {
            pipeline,
            appsink,
            fps: 0.0,
            size: ImageSize {
                width: 0,
                height: 0,
            },
            handle: None,
        })
    }

    /// Start the video reader.
    ///
    /// Sets the pipeline to playing and waits for the preroll sample to learn
    /// the frame size and rate.
    pub fn start(&mut self) -> Result<(), VideoError> {
        if self.handle.is_some() {
            log::warn!("video reader already started");
            return Ok(());
        }

        self.pipeline.set_state(gst::State::Playing)?;

        let preroll_timeout = gst::ClockTime::from_seconds(15);
        let preroll_sample = match self.appsink.try_pull_preroll(preroll_timeout) {
            Some(sample) => sample,
            None => {
                self.pipeline.set_state(gst::State::Null)?;
                return Err(VideoError::InvalidConfig(
                    "timeout waiting for the pipeline preroll sample".into(),
                ));
            }
        };

        let caps = preroll_sample.caps().ok_or(VideoError::GetCaps)?;
        let structure = caps.structure(0).ok_or(VideoError::GetCaps)?;

        let width = structure
            .get::<i32>("width")
            .map_err(|_| VideoError::GetCapsField("width"))?;
        let height = structure
            .get::<i32>("height")
            .map_err(|_| VideoError::GetCapsField("height"))?;
        self.size = ImageSize {
            width: width as usize,
            height: height as usize,
        };

        match structure.get::<gst::Fraction>("framerate") {
            Ok(fps_frac) if fps_frac.numer() > 0 && fps_frac.denom() > 0 => {
                self.fps = fps_frac.numer() as f64 / fps_frac.denom() as f64;
            }
            _ => {
                log::warn!("could not determine the video framerate from the caps");
                self.fps = 0.0;
            }
        }

        let bus = self.pipeline.bus().ok_or(VideoError::Bus)?;
        let pipeline_weak = self.pipeline.downgrade();
        let handle = std::thread::spawn(move || {
            for msg in bus.iter_timed(gst::ClockTime::NONE) {
                if pipeline_weak.upgrade().is_none() {
                    break;
                }
                match msg.view() {
                    gst::MessageView::Eos(..) => {
                        log::debug!("reader bus received EOS");
                        break;
                    }
                    gst::MessageView::Error(err) => {
                        log::error!(
                            "reader bus error from {:?}: {} ({:?})",
                            msg.src().map(|s| s.path_string()),
                            err.error(),
                            err.debug()
                        );
                        break;
                    }
                    _ => {}
                }
            }
        });
        self.handle = Some(handle);

        log::info!(
            "video reader started: size={}, fps={:.2}",
            self.size,
            self.fps
        );

        Ok(())
    }

    /// Read the next frame from the video.
    ///
    /// Returns `Ok(None)` once the end of the stream is reached.
    pub fn read(&mut self) -> Result<Option<Image<u8, 3>>, VideoError> {
        if self.appsink.is_eos() {
            return Ok(None);
        }

        let timeout = gst::ClockTime::from_seconds(5);
        let sample = match self.appsink.try_pull_sample(timeout) {
            Some(sample) => sample,
            None => return Ok(None),
        };

        let buffer = sample.buffer().ok_or(VideoError::GetBuffer)?;
        let map = buffer.map_readable().map_err(|_| VideoError::MapBuffer)?;
        let data = map.as_slice();

        let expected_size = self.size.width * self.size.height * 3;
        if data.len() < expected_size {
            return Err(VideoError::InvalidImageFormat(format!(
                "buffer too small: expected {} bytes, got {}",
                expected_size,
                data.len()
            )));
        }
        if data.len() > expected_size {
            log::warn!(
                "buffer size mismatch: expected {} bytes, got {}",
                expected_size,
                data.len()
            );
        }

        let img = Image::<u8, 3>::new(self.size, data[..expected_size].to_vec())?;
        Ok(Some(img))
    }

    /// Get the frames per second of the video.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Get the size of the video frames.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Check if the video has reached the end of the stream.
    pub fn is_eos(&self) -> bool {
        self.appsink.is_eos()
    }

    /// Get the duration of the video in seconds.
    pub fn duration(&self) -> Option<f64> {
        self.pipeline
            .query_duration::<gst::ClockTime>()
            .map(|d| d.seconds_f64())
    }

    /// Close the video reader.
    pub fn close(&mut self) -> Result<(), VideoError> {
        self.pipeline.set_state(gst::State::Null)?;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("failed to join the reader bus thread");
            }
        }
        Ok(())
    }
}

impl Drop for VideoReader {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("error closing video reader in drop: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{VideoCodec, VideoReader, VideoWriter};
    use flowviz_image::{Image, ImageSize};

    use crate::error::VideoError;

    fn setup_test_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn create_dummy_video(
        file_path: &std::path::Path,
        num_frames: u32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let size = ImageSize {
            width: 64,
            height: 48,
        };
        let fps = 10;
        let mut writer = VideoWriter::new(file_path, VideoCodec::H264, fps, size)?;
        writer.start()?;

        for i in 0..num_frames {
            let frame_val = (i * 255 / num_frames) as u8;
            let data = vec![frame_val; size.width * size.height * 3];
            let img = Image::<u8, 3>::new(size, data)?;
            writer.write(&img)?;
        }
        writer.close()?;
        Ok(())
    }

    #[test]
    fn video_reader_missing_file() {
        let res = VideoReader::new("/definitely/not/here.mp4");
        assert!(matches!(res, Err(VideoError::FileNotFound(_))));
    }

    #[test]
    #[ignore = "needs gstreamer installed and configured"]
    fn video_writer_rgb8() -> Result<(), Box<dyn std::error::Error>> {
        setup_test_logging();
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("test_writer_rgb.mp4");
        create_dummy_video(&file_path, 5)?;
        assert!(file_path.exists(), "file does not exist: {file_path:?}");
        assert!(std::fs::metadata(&file_path)?.len() > 0, "file is empty");
        Ok(())
    }

    #[test]
    #[ignore = "needs gstreamer installed and configured"]
    fn video_writer_rejects_wrong_size() -> Result<(), Box<dyn std::error::Error>> {
        setup_test_logging();
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("test_writer_size.mp4");

        let size = ImageSize {
            width: 64,
            height: 48,
        };
        let mut writer = VideoWriter::new(&file_path, VideoCodec::H264, 10, size)?;
        writer.start()?;

        let wrong = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 32,
                height: 32,
            },
            0,
        )?;
        assert!(matches!(
            writer.write(&wrong),
            Err(VideoError::InvalidImageFormat(_))
        ));

        writer.close()?;
        Ok(())
    }

    #[test]
    #[ignore = "needs gstreamer installed and configured"]
    fn video_reader_basic_metadata() -> Result<(), Box<dyn std::error::Error>> {
        setup_test_logging();
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("test_reader_basic.mp4");
        let num_frames = 15;
        create_dummy_video(&file_path, num_frames)?;

        let mut reader = VideoReader::new(&file_path)?;
        reader.start()?;

        assert_eq!(reader.size().width, 64);
        assert_eq!(reader.size().height, 48);
        assert!((reader.fps() - 10.0).abs() < 0.1, "fps: {}", reader.fps());
        assert!(reader.duration().is_some());

        reader.close()?;
        Ok(())
    }

    #[test]
    #[ignore = "needs gstreamer installed and configured"]
    fn video_reader_writer_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        setup_test_logging();
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("roundtrip.mp4");
        let num_frames = 12;
        create_dummy_video(&file_path, num_frames)?;

        let mut reader = VideoReader::new(&file_path)?;
        reader.start()?;

        let mut frame_count = 0;
        while let Some(frame) = reader.read()? {
            assert_eq!(frame.size().width, 64);
            assert_eq!(frame.size().height, 48);
            frame_count += 1;
        }

        assert_eq!(frame_count, num_frames as usize);
        assert!(reader.is_eos());
        assert!(reader.read()?.is_none());

        reader.close()?;
        Ok(())
    }
}
