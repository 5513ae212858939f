use opencv::{
    core::{self, Mat},
    imgproc,
};

use crate::detection::Detection;
use crate::error::Error;

const BOX_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
const ID_COLOR: (f64, f64, f64) = (255.0, 255.0, 0.0);
const SPEED_COLOR: (f64, f64, f64) = (0.0, 255.0, 255.0);

/// Draws one detection overlay: bounding box always, `ID:n` label when the
/// tracker assigned an identity, and the smoothed speed only when one has
/// been recorded for that identity.
pub fn draw_detection(frame: &mut Mat, det: &Detection, speed: Option<f32>) -> Result<(), Error> {
    let bbox = det.bbox().as_ltrb();
    let rect = core::Rect::new(
        bbox.left() as i32,
        bbox.top() as i32,
        det.w as i32,
        det.h as i32,
    );

    imgproc::rectangle(
        frame,
        rect,
        core::Scalar::new(BOX_COLOR.0, BOX_COLOR.1, BOX_COLOR.2, 0.0),
        2,
        imgproc::LINE_8,
        0,
    )?;

    if let Some(id) = det.track_id {
        imgproc::put_text(
            frame,
            &format!("ID:{}", id),
            core::Point::new(bbox.left() as i32, bbox.top() as i32 - 10),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.6,
            core::Scalar::new(ID_COLOR.0, ID_COLOR.1, ID_COLOR.2, 0.0),
            2,
            imgproc::LINE_AA,
            false,
        )?;
    }

    if let Some(speed) = speed {
        imgproc::put_text(
            frame,
            &format!("{:.2} km/h", speed),
            core::Point::new(bbox.left() as i32, bbox.bottom() as i32 + 20),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.6,
            core::Scalar::new(SPEED_COLOR.0, SPEED_COLOR.1, SPEED_COLOR.2, 0.0),
            2,
            imgproc::LINE_AA,
            false,
        )?;
    }

    Ok(())
}

/// Frame counter in the top-left corner.
pub fn draw_frame_counter(frame: &mut Mat, index: u64) -> Result<(), Error> {
    imgproc::put_text(
        frame,
        &format!("{}", index),
        core::Point::new(10, 30),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.9,
        core::Scalar::new(255.0, 255.0, 0.0, 0.0),
        1,
        imgproc::LINE_AA,
        false,
    )?;

    Ok(())
}
