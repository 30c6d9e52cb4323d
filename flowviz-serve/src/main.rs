mod flow;

use argh::FromArgs;
use axum::{
    routing::{get, post},
    Router,
};

#[derive(FromArgs, Debug)]
/// HTTP service exposing the flowviz video processing pipeline
struct Args {
    /// port to listen on
    #[argh(option, short = 'p', default = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = argh::from_env();

    env_logger::init();

    log::info!("🚀 Starting the server");
    log::info!("🔥 Listening on: http://0.0.0.0:{}", args.port);
    log::info!("🔧 Press Ctrl+C to stop the server");

    // build our application with a single route
    let app = Router::new()
        .route("/", get(|| async { "Welcome to flowviz!" }))
        .route("/api/v0/flow", post(flow::compute_flow));

    // run our app with hyper, listening on the configured port
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
