use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::detection::Detection;
use crate::error::Error;
use crate::frame::FrameBatch;

/// Pull-based stream of per-frame tracker output.
///
/// Finite and non-restartable: the driver pulls one batch per video frame
/// and stops at the first `None`.
pub trait DetectionSource {
    fn next_batch(&mut self) -> Result<Option<FrameBatch>, Error>;
}

/// Reads a sidecar `.dets` file produced by the external detector/tracker:
/// one line per frame, `"<frame>: [<detections as JSON>]"`. Lines without a
/// separator carry no detections for that frame.
pub struct JsonlDetectionSource<R> {
    reader: R,
    line_no: u64,
    frame_index: u64,
}

impl JsonlDetectionSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::DetectionsOpen {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonlDetectionSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            frame_index: 0,
        }
    }
}

impl<R: BufRead> DetectionSource for JsonlDetectionSource<R> {
    fn next_batch(&mut self) -> Result<Option<FrameBatch>, Error> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        self.line_no += 1;

        let detections: Vec<Detection> = match line.find(':') {
            Some(idx) => {
                let (_, vector) = line.split_at(idx + 1);
                serde_json::from_str(vector.trim()).map_err(|source| Error::DetectionParse {
                    line: self.line_no,
                    source,
                })?
            }
            None => Vec::new(),
        };

        let batch = FrameBatch {
            index: self.frame_index,
            detections,
        };
        self.frame_index += 1;

        Ok(Some(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::TrackId;
    use std::io::Cursor;

    #[test]
    fn parses_frames_in_order() {
        let data = "\
0: [{\"x\":10,\"y\":20,\"w\":4,\"h\":6,\"p\":0.9,\"c\":2,\"id\":7}]
1: []
2: [{\"x\":1,\"y\":2,\"w\":3,\"h\":4,\"p\":0.6,\"c\":2},{\"x\":5,\"y\":6,\"w\":7,\"h\":8,\"p\":0.7,\"c\":0,\"id\":9}]
";
        let mut src = JsonlDetectionSource::new(Cursor::new(data));

        let b0 = src.next_batch().unwrap().unwrap();
        assert_eq!(b0.index, 0);
        assert_eq!(b0.len(), 1);
        assert_eq!(b0.detections[0].track_id, Some(TrackId(7)));

        let b1 = src.next_batch().unwrap().unwrap();
        assert_eq!(b1.index, 1);
        assert!(b1.is_empty());

        let b2 = src.next_batch().unwrap().unwrap();
        assert_eq!(b2.index, 2);
        assert_eq!(b2.len(), 2);
        assert_eq!(b2.detections[0].track_id, None);

        assert!(src.next_batch().unwrap().is_none());
    }

    #[test]
    fn line_without_separator_is_empty_frame() {
        let mut src = JsonlDetectionSource::new(Cursor::new("no detections here\n"));
        let batch = src.next_batch().unwrap().unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let mut src = JsonlDetectionSource::new(Cursor::new("0: []\n1: [{broken\n"));
        src.next_batch().unwrap();

        match src.next_batch() {
            Err(Error::DetectionParse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_file_is_a_structural_error() {
        match JsonlDetectionSource::open("/nonexistent/path.dets") {
            Err(Error::DetectionsOpen { .. }) => {}
            _ => panic!("expected DetectionsOpen"),
        }
    }
}
