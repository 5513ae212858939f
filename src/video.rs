use std::path::Path;

use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio,
};
use tracing::info;

use crate::error::Error;

/// Wraps an OpenCV capture, exposing the source metadata the pipeline
/// needs: nominal frame rate and frame size.
pub struct VideoSource {
    cam: videoio::VideoCapture,
    fps: f64,
    width: i32,
    height: i32,
    total: i32,
}

impl VideoSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let cam = videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;

        if !videoio::VideoCapture::is_opened(&cam)? {
            return Err(Error::SourceOpen {
                path: path.to_path_buf(),
            });
        }

        let fps = cam.get(videoio::CAP_PROP_FPS)?;
        let width = cam.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = cam.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
        let total = cam.get(videoio::CAP_PROP_FRAME_COUNT)? as i32;

        info!(
            "video {}x{} {:.2} fps, {} frames",
            width, height, fps, total
        );

        Ok(Self {
            cam,
            fps,
            width,
            height,
            total,
        })
    }

    /// Reads the next frame into `frame`, returning `false` at end of
    /// stream (read failure or an empty frame).
    pub fn read(&mut self, frame: &mut Mat) -> Result<bool, Error> {
        if !self.cam.read(frame)? {
            return Ok(false);
        }

        Ok(frame.cols() > 0 && frame.rows() > 0)
    }

    /// Nominal frame rate from container metadata; 0.0 when missing.
    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    #[inline]
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn total_frames(&self) -> i32 {
        self.total
    }
}

/// Lazily-initialized video writer: opened on the first frame so the
/// output size always matches what the pipeline actually produces, and no
/// file appears when the run fails before the first frame.
pub struct VideoSink {
    writer: Option<videoio::VideoWriter>,
    size: Option<(i32, i32)>,
    fps: f64,
    out_file: String,
}

impl VideoSink {
    pub fn new<S: ToString>(out_file: S, fps: f64) -> Self {
        Self {
            writer: None,
            size: None,
            fps,
            out_file: out_file.to_string(),
        }
    }

    pub fn release(&mut self) -> Result<(), Error> {
        if let Some(mut w) = self.writer.take() {
            w.release()?;
        }

        Ok(())
    }

    fn reinit(&mut self, size: (i32, i32)) -> Result<(), Error> {
        self.release()?;

        let fourcc = videoio::VideoWriter::fourcc(b'm' as _, b'p' as _, b'4' as _, b'v' as _)?;
        let writer = videoio::VideoWriter::new(
            &self.out_file,
            fourcc,
            self.fps,
            Size::new(size.0, size.1),
            true,
        )?;

        self.size = Some(size);
        self.writer = Some(writer);

        Ok(())
    }

    pub fn feed(&mut self, m: &Mat) -> Result<(), Error> {
        let size = (m.cols(), m.rows());

        if self.writer.is_none() || self.size != Some(size) {
            self.reinit(size)?;
        }

        if let Some(writer) = self.writer.as_mut() {
            writer.write(m)?;
        }

        Ok(())
    }
}
