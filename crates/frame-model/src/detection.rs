//! Subject detections and the detection stream format.
//!
//! Detections are stored in append-only JSONL, one frame per line. Lines
//! beginning with `#` are headers or comments; the first header may carry a
//! [`DetectionStreamHeader`] describing the source frame.

use serde::{Deserialize, Serialize};
use vptz_common::{VptzError, VptzResult};

use crate::geometry::FrameGeometry;

/// Schema version written by [`serialize_detections`].
pub const DETECTION_SCHEMA_VERSION: &str = "1.0";

/// A relative bounding box produced by the external detector.
///
/// All components are normalized to the source frame: `(0.0, 0.0)` is the
/// top-left corner, `(1.0, 1.0)` the bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x_min: f64,
    pub y_min: f64,
    pub width: f64,
    pub height: f64,

    /// Detector confidence in `[0.0, 1.0]`, when the detector reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Detection {
    pub fn new(x_min: f64, y_min: f64, width: f64, height: f64) -> Self {
        Self {
            x_min,
            y_min,
            width,
            height,
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Copy with non-finite components replaced by 0 and every component
    /// clamped into `[0, 1]`.
    pub fn sanitized(&self) -> Self {
        Self {
            x_min: unit(self.x_min),
            y_min: unit(self.y_min),
            width: unit(self.width),
            height: unit(self.height),
            score: self.score.map(unit),
        }
    }

    /// Horizontally flipped copy, for sources displayed as a mirror image.
    pub fn mirrored(&self) -> Self {
        Self {
            x_min: 1.0 - self.x_min - self.width,
            ..*self
        }
    }

    /// Whether this detection is trusted at the given threshold.
    /// Detections without a score always pass.
    pub fn meets_confidence(&self, min_confidence: f64) -> bool {
        self.score.map_or(true, |score| score >= min_confidence)
    }

    /// Box center in source pixels.
    pub fn center_px(&self, geometry: &FrameGeometry) -> (f64, f64) {
        (
            (self.x_min + self.width / 2.0) * geometry.width_px(),
            (self.y_min + self.height / 2.0) * geometry.height_px(),
        )
    }

    /// Subject size in pixels: the larger of the box's pixel width and height.
    pub fn size_px(&self, geometry: &FrameGeometry) -> f64 {
        (self.width * geometry.width_px()).max(self.height * geometry.height_px())
    }

    /// Subject size relative to the frame's shorter side.
    pub fn size_ratio(&self, geometry: &FrameGeometry) -> f64 {
        self.size_px(geometry) / geometry.shorter_side()
    }
}

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// All detections reported for one frame, in detector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetections {
    /// Zero-based frame index.
    pub frame: u64,

    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl FrameDetections {
    pub fn new(frame: u64, detections: Vec<Detection>) -> Self {
        Self { frame, detections }
    }

    /// A frame in which nothing was found.
    pub fn empty(frame: u64) -> Self {
        Self::new(frame, Vec::new())
    }

    /// The subject to frame: the first detection meeting the threshold.
    pub fn primary(&self, min_confidence: f64) -> Option<&Detection> {
        self.detections
            .iter()
            .find(|d| d.meets_confidence(min_confidence))
    }
}

/// Metadata header for a detection stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionStreamHeader {
    pub schema_version: String,

    /// Source frame size the detections were computed on.
    pub frame_width: u32,
    pub frame_height: u32,
}

impl DetectionStreamHeader {
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            schema_version: DETECTION_SCHEMA_VERSION.to_string(),
            frame_width,
            frame_height,
        }
    }
}

/// Parse frames from JSONL content (one JSON object per line).
///
/// A malformed line fails the whole parse with its 1-based line number.
pub fn parse_detections(jsonl: &str) -> VptzResult<Vec<FrameDetections>> {
    jsonl
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            serde_json::from_str(line)
                .map_err(|e| VptzError::detection(format!("line {number}: {e}")))
        })
        .collect()
}

/// Find the stream header: the first `#` line whose body parses as one.
/// Plain comments are ignored.
pub fn parse_stream_header(jsonl: &str) -> Option<DetectionStreamHeader> {
    jsonl
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix('#'))
        .find_map(|body| serde_json::from_str(body.trim()).ok())
}

/// Serialize frames to JSONL, optionally preceded by a header line.
pub fn serialize_detections(
    header: Option<&DetectionStreamHeader>,
    frames: &[FrameDetections],
) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    if let Some(header) = header {
        output.push_str("# ");
        output.push_str(&serde_json::to_string(header)?);
        output.push('\n');
    }
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
