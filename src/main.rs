use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use speedtrack::{
    CalibrationConfig, JsonlDetectionSource, PipelineDriver, VideoSink, VideoSource,
};

/// Overlays calibrated real-world speeds of tracked objects onto a video,
/// using per-frame detections from an external detector/tracker.
#[derive(Parser, Debug)]
#[command(name = "speedtrack", version)]
struct Args {
    /// Input video file
    video: PathBuf,

    /// Sidecar detections file produced by the external tracker
    /// (one line per frame: "<frame>: [<detections>]")
    dets: PathBuf,

    /// Annotated output video
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Calibration scale in meters per pixel
    #[arg(long, default_value_t = 0.0113)]
    scale_factor: f32,

    /// Pixel displacement at or below this is treated as no movement
    #[arg(long, default_value_t = 1.0)]
    movement_threshold: f32,

    /// Number of frames averaged for the displayed speed
    #[arg(long, default_value_t = 5)]
    window_size: usize,

    /// Minimum detection confidence
    #[arg(long, default_value_t = 0.5)]
    confidence: f32,

    /// COCO class id to track (2 = car)
    #[arg(long, default_value_t = 2)]
    class: i32,

    /// Drop identities unseen for this many frames (0 disables)
    #[arg(long, default_value_t = 300)]
    stale_after: u64,

    /// Frame rate assumed when the source carries no fps metadata
    #[arg(long, default_value_t = 30.0)]
    fallback_fps: f64,

    /// Show a live preview window; press 'q' to stop early
    #[arg(long)]
    preview: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "speedtrack=info".to_string()),
        )
        .init();

    let args = Args::parse();

    let config = CalibrationConfig::new(
        args.scale_factor,
        args.movement_threshold,
        args.window_size,
        args.confidence,
        args.class,
        args.stale_after,
        args.fallback_fps,
    )?;

    let mut source = VideoSource::open(&args.video)?;
    let mut detections = JsonlDetectionSource::open(&args.dets)?;

    let fps = config.effective_fps(source.fps())?;
    let mut sink = VideoSink::new(args.output.to_string_lossy(), fps);

    let mut driver = PipelineDriver::new(config, args.preview);
    let stats = driver.run(&mut source, &mut detections, &mut sink)?;

    info!(
        "done: {} frames, output saved as {}",
        stats.frames,
        args.output.display()
    );

    Ok(())
}
