pub mod annotate;
pub mod bbox;
pub mod config;
pub mod detection;
pub mod error;
pub mod estimator;
pub mod frame;
pub mod pipeline;
pub mod source;
pub mod speed_window;
pub mod video;

pub use config::CalibrationConfig;
pub use detection::{Detection, TrackId};
pub use error::Error;
pub use estimator::SpeedEstimator;
pub use frame::FrameBatch;
pub use pipeline::{PipelineDriver, RunStats};
pub use source::{DetectionSource, JsonlDetectionSource};
pub use speed_window::SpeedWindow;
pub use video::{VideoSink, VideoSource};
