use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot open video source {path}")]
    SourceOpen { path: PathBuf },

    #[error("cannot open detections file {path}: {source}")]
    DetectionsOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed detections line {line}: {source}")]
    DetectionParse {
        line: u64,
        source: serde_json::Error,
    },

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
