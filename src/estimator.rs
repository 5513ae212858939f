use std::collections::HashMap;

use nalgebra as na;
use tracing::debug;

use crate::config::CalibrationConfig;
use crate::detection::TrackId;
use crate::speed_window::SpeedWindow;

const KMH_PER_MPS: f32 = 3.6;

#[derive(Debug)]
struct TrackState {
    last_pos: na::Point2<f32>,
    window: SpeedWindow,
    last_seen: u64,
}

/// Per-identity speed estimation state and the smoothing algorithm.
///
/// Owned by the pipeline driver; one `observe` call per surviving detection
/// per frame. Displacements are scaled by the source's nominal frame rate,
/// not by wall-clock time, so speeds stay consistent for offline files.
pub struct SpeedEstimator {
    scale_factor: f32,
    movement_threshold: f32,
    window_size: usize,
    stale_after: u64,
    fps: f32,
    tracks: HashMap<TrackId, TrackState>,
}

impl SpeedEstimator {
    pub fn new(config: &CalibrationConfig, fps: f64) -> Self {
        Self {
            scale_factor: config.scale_factor,
            movement_threshold: config.movement_threshold,
            window_size: config.window_size,
            stale_after: config.stale_after,
            fps: fps as f32,
            tracks: HashMap::new(),
        }
    }

    /// Feeds one position observation and returns the smoothed speed in
    /// km/h, or `None` on the first observation of an identity (no prior
    /// position, nothing to display yet).
    pub fn observe(
        &mut self,
        id: TrackId,
        pos: na::Point2<f32>,
        frame_index: u64,
    ) -> Option<f32> {
        match self.tracks.get_mut(&id) {
            Some(state) => {
                let d = na::distance(&state.last_pos, &pos);

                let instant = if d <= self.movement_threshold {
                    0.0
                } else {
                    d * self.scale_factor * self.fps * KMH_PER_MPS
                };

                state.window.push(instant);
                state.last_pos = pos;
                state.last_seen = frame_index;

                state.window.mean()
            }
            None => {
                self.tracks.insert(
                    id,
                    TrackState {
                        last_pos: pos,
                        window: SpeedWindow::with_capacity(self.window_size),
                        last_seen: frame_index,
                    },
                );

                None
            }
        }
    }

    /// Drops identities unseen for `stale_after` frames, returning how many
    /// were evicted. No-op when eviction is disabled (`stale_after == 0`).
    pub fn evict_stale(&mut self, frame_index: u64) -> usize {
        if self.stale_after == 0 {
            return 0;
        }

        let stale_after = self.stale_after;
        let before = self.tracks.len();

        self.tracks
            .retain(|_, state| frame_index.saturating_sub(state.last_seen) < stale_after);

        let evicted = before - self.tracks.len();
        if evicted > 0 {
            debug!(evicted, live = self.tracks.len(), "evicted stale tracks");
        }

        evicted
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: TrackId) -> bool {
        self.tracks.contains_key(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator(scale: f32, threshold: f32, fps: f64) -> SpeedEstimator {
        let config = CalibrationConfig::new(scale, threshold, 5, 0.5, 2, 300, 30.0).unwrap();
        SpeedEstimator::new(&config, fps)
    }

    fn pt(x: f32, y: f32) -> na::Point2<f32> {
        na::Point2::new(x, y)
    }

    #[test]
    fn first_observation_records_without_speed() {
        let mut est = estimator(0.1, 1.0, 25.0);

        assert_eq!(est.observe(TrackId(1), pt(100.0, 100.0), 0), None);
        assert!(est.contains(TrackId(1)));

        // second observation uses the recorded position
        assert!(est.observe(TrackId(1), pt(110.0, 100.0), 1).is_some());
    }

    #[test]
    fn displacement_at_threshold_is_zero() {
        let mut est = estimator(1000.0, 5.0, 25.0);

        est.observe(TrackId(1), pt(0.0, 0.0), 0);
        // d == 5 == threshold, suppressed regardless of the huge scale
        assert_eq!(est.observe(TrackId(1), pt(5.0, 0.0), 1), Some(0.0));
        // d == 3, still suppressed
        assert_eq!(est.observe(TrackId(1), pt(8.0, 0.0), 2), Some(0.0));
    }

    #[test]
    fn km_h_conversion() {
        // 10 px at 0.1 m/px and 25 fps: 1 m per frame, 25 m/s, 90 km/h
        let mut est = estimator(0.1, 1.0, 25.0);

        est.observe(TrackId(1), pt(0.0, 0.0), 0);
        let speed = est.observe(TrackId(1), pt(10.0, 0.0), 1).unwrap();

        assert!((speed - 90.0).abs() < 1e-3, "got {}", speed);
        assert_eq!(format!("{:.2} km/h", speed), "90.00 km/h");
    }

    #[test]
    fn smoothing_averages_the_window() {
        // threshold 0 with equal steps keeps each instantaneous speed equal,
        // so drive the window with varying step sizes instead
        let mut est = estimator(0.1, 0.0, 25.0);

        est.observe(TrackId(1), pt(0.0, 0.0), 0);
        let s1 = est.observe(TrackId(1), pt(10.0, 0.0), 1).unwrap();
        let s2 = est.observe(TrackId(1), pt(30.0, 0.0), 2).unwrap();

        // second smoothed value is the mean of 90 and 180
        assert!((s1 - 90.0).abs() < 1e-3);
        assert!((s2 - 135.0).abs() < 1e-2, "got {}", s2);
    }

    #[test]
    fn window_keeps_most_recent_samples() {
        let mut est = estimator(0.1, 0.0, 25.0);

        est.observe(TrackId(1), pt(0.0, 0.0), 0);
        // seven equal 10 px steps: window of 5 saturates at 90 km/h
        for i in 1..=7u64 {
            est.observe(TrackId(1), pt(10.0 * i as f32, 0.0), i);
        }
        // one 20 px step shifts the mean of 5 samples by (180-90)/5
        let speed = est.observe(TrackId(1), pt(90.0, 0.0), 8).unwrap();
        assert!((speed - 108.0).abs() < 1e-2, "got {}", speed);
    }

    #[test]
    fn identities_are_isolated() {
        let mut est = estimator(0.1, 1.0, 25.0);

        est.observe(TrackId(1), pt(0.0, 0.0), 0);
        // a new identity never sees id 1's position
        assert_eq!(est.observe(TrackId(2), pt(500.0, 500.0), 0), None);

        let fast = est.observe(TrackId(1), pt(10.0, 0.0), 1).unwrap();
        let slow = est.observe(TrackId(2), pt(500.0, 500.0), 1).unwrap();

        assert!((fast - 90.0).abs() < 1e-3);
        assert_eq!(slow, 0.0);
    }

    #[test]
    fn stale_identities_are_evicted() {
        let mut est = estimator(0.1, 1.0, 25.0);

        est.observe(TrackId(1), pt(0.0, 0.0), 0);
        est.observe(TrackId(2), pt(0.0, 0.0), 299);

        assert_eq!(est.evict_stale(299), 0);
        assert_eq!(est.evict_stale(300), 1);
        assert!(!est.contains(TrackId(1)));
        assert!(est.contains(TrackId(2)));

        // an evicted identity starts over
        assert_eq!(est.observe(TrackId(1), pt(0.0, 0.0), 301), None);
    }

    #[test]
    fn eviction_disabled_with_zero() {
        let config = CalibrationConfig::new(0.1, 1.0, 5, 0.5, 2, 0, 30.0).unwrap();
        let mut est = SpeedEstimator::new(&config, 25.0);

        est.observe(TrackId(1), pt(0.0, 0.0), 0);
        assert_eq!(est.evict_stale(1_000_000), 0);
        assert!(est.contains(TrackId(1)));
    }
}
