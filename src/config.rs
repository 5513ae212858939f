use crate::error::Error;

/// Calibration and threshold settings, validated once at startup.
#[derive(Debug, Clone)]
pub struct CalibrationConfig {
    /// Meters per pixel at the measurement plane.
    pub scale_factor: f32,
    /// Displacements at or below this many pixels are treated as no
    /// movement, suppressing detection jitter.
    pub movement_threshold: f32,
    /// Number of recent instantaneous samples averaged for display.
    pub window_size: usize,
    /// Minimum detection confidence accepted from the tracker.
    pub confidence_threshold: f32,
    /// The single object class to track; everything else is ignored.
    pub target_class: i32,
    /// Identities unseen for this many frames are dropped. Zero disables
    /// eviction and retains state for the whole run.
    pub stale_after: u64,
    /// Frame rate used when the source carries no usable fps metadata.
    pub fallback_fps: f64,
}

impl CalibrationConfig {
    pub fn new(
        scale_factor: f32,
        movement_threshold: f32,
        window_size: usize,
        confidence_threshold: f32,
        target_class: i32,
        stale_after: u64,
        fallback_fps: f64,
    ) -> Result<Self, Error> {
        if !(scale_factor > 0.0) {
            return Err(Error::Config(format!(
                "scale_factor must be positive, got {}",
                scale_factor
            )));
        }

        if !(movement_threshold >= 0.0) {
            return Err(Error::Config(format!(
                "movement_threshold must be non-negative, got {}",
                movement_threshold
            )));
        }

        if window_size == 0 {
            return Err(Error::Config("window_size must be at least 1".into()));
        }

        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(Error::Config(format!(
                "confidence_threshold must be within [0, 1], got {}",
                confidence_threshold
            )));
        }

        if !(fallback_fps > 0.0) {
            return Err(Error::Config(format!(
                "fallback_fps must be positive, got {}",
                fallback_fps
            )));
        }

        Ok(Self {
            scale_factor,
            movement_threshold,
            window_size,
            confidence_threshold,
            target_class,
            stale_after,
            fallback_fps,
        })
    }

    /// Resolves the frame rate to scale displacements by: the nominal rate
    /// the source reports, or the configured fallback when metadata is
    /// missing. A negative rate is a structural error in the source.
    pub fn effective_fps(&self, source_fps: f64) -> Result<f64, Error> {
        if source_fps > 0.0 {
            Ok(source_fps)
        } else if source_fps == 0.0 {
            Ok(self.fallback_fps)
        } else {
            Err(Error::Config(format!(
                "source reported a negative frame rate: {}",
                source_fps
            )))
        }
    }
}

impl Default for CalibrationConfig {
    /// Defaults tuned for a fixed roadside camera tracking cars.
    fn default() -> Self {
        Self {
            scale_factor: 0.0113,
            movement_threshold: 1.0,
            window_size: 5,
            confidence_threshold: 0.5,
            target_class: 2,
            stale_after: 300,
            fallback_fps: 30.0,
        }
    }
}
