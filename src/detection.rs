use serde_derive::{Deserialize, Serialize};
use std::fmt;

use crate::bbox::{BBox, Xywh};

/// Identity token assigned by the external tracker. Opaque: compared and
/// hashed, never constructed or manipulated arithmetically by this crate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Contains (x,y) of the center and (width,height) of bbox
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c")]
    pub class: i32,
    /// Absent when the tracker has not yet established identity continuity.
    #[serde(rename = "id", default)]
    pub track_id: Option<TrackId>,
}

impl Detection {
    #[inline(always)]
    pub fn bbox(&self) -> BBox<Xywh> {
        BBox::xywh(self.x, self.y, self.w, self.h)
    }
}

pub const NAMES: [&str; 8] = [
    "person",
    "bicycle",
    "car",
    "motorbike",
    "aeroplane",
    "bus",
    "train",
    "truck",
];

/// Human-readable label for a COCO class id, falling back to the raw id.
pub fn class_name(class: i32) -> String {
    usize::try_from(class)
        .ok()
        .and_then(|idx| NAMES.get(idx))
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("class {}", class))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_with_id() {
        let det: Detection =
            serde_json::from_str(r#"{"x":10,"y":20,"w":4,"h":6,"p":0.9,"c":2,"id":7}"#).unwrap();
        assert_eq!(det.track_id, Some(TrackId(7)));
        assert_eq!(det.class, 2);
        assert_eq!(det.bbox().center(), nalgebra::Point2::new(10.0, 20.0));
    }

    #[test]
    fn wire_format_without_id() {
        let det: Detection =
            serde_json::from_str(r#"{"x":1,"y":2,"w":3,"h":4,"p":0.5,"c":2}"#).unwrap();
        assert_eq!(det.track_id, None);
    }

    #[test]
    fn class_names() {
        assert_eq!(class_name(2), "car");
        assert_eq!(class_name(7), "truck");
        assert_eq!(class_name(42), "class 42");
        assert_eq!(class_name(-1), "class -1");
    }
}
