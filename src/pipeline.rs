use opencv::{core::Mat, highgui};
use tracing::{debug, info};

use crate::annotate;
use crate::config::CalibrationConfig;
use crate::detection::{class_name, Detection};
use crate::error::Error;
use crate::estimator::SpeedEstimator;
use crate::source::DetectionSource;
use crate::video::{VideoSink, VideoSource};

const PREVIEW_WINDOW: &str = "speedtrack";
const QUIT_KEY: i32 = b'q' as i32;

/// Accepts only detections of the configured class with sufficient
/// confidence; everything else stays out of the speed state entirely.
#[inline]
pub fn passes_filter(det: &Detection, config: &CalibrationConfig) -> bool {
    det.class == config.target_class && det.confidence >= config.confidence_threshold
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    pub frames: u64,
    pub tracked: u64,
    pub without_id: u64,
}

/// Drives the per-frame loop: pull frame and detection batch, filter,
/// estimate, annotate, emit. Strictly sequential; the only blocking points
/// are the source read and the sink write.
pub struct PipelineDriver {
    config: CalibrationConfig,
    preview: bool,
}

impl PipelineDriver {
    pub fn new(config: CalibrationConfig, preview: bool) -> Self {
        Self { config, preview }
    }

    pub fn run<S: DetectionSource>(
        &mut self,
        source: &mut VideoSource,
        detections: &mut S,
        sink: &mut VideoSink,
    ) -> Result<RunStats, Error> {
        let fps = self.config.effective_fps(source.fps())?;
        let mut estimator = SpeedEstimator::new(&self.config, fps);

        info!(
            fps,
            class = %class_name(self.config.target_class),
            "processing started"
        );

        let mut stats = RunStats::default();
        let mut frame = Mat::default();
        let total = source.total_frames();

        loop {
            if !source.read(&mut frame)? {
                break;
            }

            // video and detections are parallel streams; the run ends at
            // the shorter one
            let batch = match detections.next_batch()? {
                Some(batch) => batch,
                None => {
                    debug!("detections exhausted before video");
                    break;
                }
            };

            let index = stats.frames;

            for det in batch.iter().filter(|det| passes_filter(det, &self.config)) {
                let speed = match det.track_id {
                    Some(id) => {
                        stats.tracked += 1;
                        estimator.observe(id, det.bbox().center(), index)
                    }
                    None => {
                        // tracker has no identity yet: box only, no state
                        stats.without_id += 1;
                        None
                    }
                };

                annotate::draw_detection(&mut frame, det, speed)?;
            }

            annotate::draw_frame_counter(&mut frame, index)?;
            sink.feed(&frame)?;

            if self.preview {
                highgui::imshow(PREVIEW_WINDOW, &frame)?;
                if highgui::wait_key(1)? == QUIT_KEY {
                    info!("quit requested, stopping");
                    stats.frames += 1;
                    break;
                }
            }

            estimator.evict_stale(index);
            stats.frames += 1;

            if stats.frames % 100 == 0 {
                debug!(
                    frame = stats.frames,
                    total,
                    live_tracks = estimator.len(),
                    "progress"
                );
            }
        }

        sink.release()?;

        if self.preview {
            highgui::destroy_all_windows()?;
        }

        info!(
            frames = stats.frames,
            tracked = stats.tracked,
            without_id = stats.without_id,
            "processing finished"
        );

        Ok(stats)
    }
}
