use std::str::FromStr;
use std::time::Instant;

use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use flowviz::flow::{FarnebackParams, FlowColorMode};
use flowviz::pipeline::{process_video, PipelineConfig};

#[derive(Debug, Deserialize)]
pub struct FlowRequest {
    src_path: String,
    dst_path: String,
    pyr_scale: Option<f32>,
    levels: Option<usize>,
    winsize: Option<usize>,
    iterations: Option<usize>,
    poly_n: Option<usize>,
    poly_sigma: Option<f32>,
    frame_skip: Option<usize>,
    color_mode: Option<String>,
}

pub async fn compute_flow(Json(req): Json<FlowRequest>) -> impl IntoResponse {
    let defaults = FarnebackParams::default();

    let color_mode = match req
        .color_mode
        .as_deref()
        .map(FlowColorMode::from_str)
        .transpose()
    {
        Ok(mode) => mode.unwrap_or_default(),
        Err(e) => return Json(serde_json::json!({ "error": e.to_string() })),
    };

    let config = PipelineConfig {
        params: FarnebackParams {
            pyr_scale: req.pyr_scale.unwrap_or(defaults.pyr_scale),
            levels: req.levels.unwrap_or(defaults.levels),
            winsize: req.winsize.unwrap_or(defaults.winsize),
            iterations: req.iterations.unwrap_or(defaults.iterations),
            poly_n: req.poly_n.unwrap_or(defaults.poly_n),
            poly_sigma: req.poly_sigma.unwrap_or(defaults.poly_sigma),
        },
        frame_skip: req.frame_skip.unwrap_or(1),
        color_mode,
    };

    log::info!("🚀 processing {} -> {}", req.src_path, req.dst_path);

    let started = Instant::now();
    let dst_path = req.dst_path.clone();

    let result = tokio::task::spawn_blocking(move || {
        process_video(&req.src_path, &req.dst_path, &config, |_| {})
    })
    .await;

    match result {
        Ok(Ok(report)) => Json(serde_json::json!({
            "frames_read": report.frames_read,
            "pairs_rendered": report.pairs_rendered,
            "output_fps": report.output_fps,
            "dst_path": dst_path,
            "elapsed_ms": started.elapsed().as_millis() as u64,
        })),
        Ok(Err(e)) => Json(serde_json::json!({ "error": e.to_string() })),
        Err(e) => Json(serde_json::json!({ "error": format!("processing task failed: {e}") })),
    }
}
