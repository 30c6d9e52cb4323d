use std::path::PathBuf;
use std::str::FromStr;

use argh::FromArgs;

use flowviz::flow::{FarnebackParams, FlowColorMode};
use flowviz::pipeline::{process_video, PipelineConfig};

#[derive(FromArgs, Debug)]
/// Render a video as its dense optical flow visualization
struct Args {
    /// path to the input video file
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the output video file, must end with .mp4
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// scale between consecutive pyramid levels
    #[argh(option, default = "0.5")]
    pyr_scale: f32,

    /// number of pyramid levels
    #[argh(option, default = "3")]
    levels: usize,

    /// averaging window size
    #[argh(option, default = "15")]
    winsize: usize,

    /// number of iterations per pyramid level
    #[argh(option, default = "3")]
    iterations: usize,

    /// size of the pixel neighborhood for the polynomial expansion
    #[argh(option, default = "5")]
    poly_n: usize,

    /// standard deviation of the polynomial expansion weighting
    #[argh(option, default = "1.2")]
    poly_sigma: f32,

    /// process every nth frame
    #[argh(option, default = "1")]
    frame_skip: usize,

    /// color mode of the rendering, 'grayscale' or 'hsv'
    #[argh(option, default = "String::from(\"grayscale\")")]
    color_mode: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = argh::from_env();

    env_logger::init();

    if args.output.extension().and_then(|ext| ext.to_str()) != Some("mp4") {
        return Err("Output file must have a .mp4 extension".into());
    }

    let config = PipelineConfig {
        params: FarnebackParams {
            pyr_scale: args.pyr_scale,
            levels: args.levels,
            winsize: args.winsize,
            iterations: args.iterations,
            poly_n: args.poly_n,
            poly_sigma: args.poly_sigma,
        },
        frame_skip: args.frame_skip,
        color_mode: FlowColorMode::from_str(&args.color_mode)?,
    };

    log::info!("🚀 processing {:?} -> {:?}", args.input, args.output);

    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(
        indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} frame pairs ({per_sec})")
            .expect("Failed to set progress bar style"),
    );

    let report = process_video(&args.input, &args.output, &config, |_| pb.inc(1))?;

    pb.finish_and_clear();

    println!(
        "🔥 rendered {} frame pairs from {} frames at {} fps into {:?}",
        report.pairs_rendered, report.frames_read, report.output_fps, args.output
    );

    Ok(())
}
