use crate::detection::Detection;

/// One video frame's worth of tracker output.
pub struct FrameBatch {
    pub index: u64,
    pub detections: Vec<Detection>,
}

impl FrameBatch {
    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
