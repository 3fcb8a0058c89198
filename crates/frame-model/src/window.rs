//! Crop windows: per-frame targets, smoothed viewport state, and the
//! integral rectangle handed to the crop stage.
//!
//! Windows always preserve the frame's aspect ratio, so they are described
//! by top-left position and height only; width is `height * A`.

use serde::{Deserialize, Serialize};

use crate::geometry::FrameGeometry;

/// The window the controller wants to show this frame, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetWindow {
    pub x: f64,
    pub y: f64,
    pub height: f64,
}

impl TargetWindow {
    /// Build a target, clamped into the frame.
    pub fn clamped(geometry: &FrameGeometry, x: f64, y: f64, height: f64) -> Self {
        let (x, y, height) = geometry.clamp_window(x, y, height);
        Self { x, y, height }
    }

    /// The whole source frame: the target held before any subject is seen.
    pub fn full_frame(geometry: &FrameGeometry) -> Self {
        Self::clamped(geometry, 0.0, 0.0, geometry.height_px())
    }

    pub fn width(&self, geometry: &FrameGeometry) -> f64 {
        self.height * geometry.aspect_ratio()
    }
}

/// Smoothed viewport carried from frame to frame.
///
/// Fractional positions are kept so slow pans stay smooth; only
/// [`ViewportState::crop`] truncates to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub x: f64,
    pub y: f64,
    pub height: f64,
}

impl ViewportState {
    /// Session-start state: origin, full frame height.
    pub fn initial(geometry: &FrameGeometry) -> Self {
        let (x, y, height) = geometry.clamp_window(0.0, 0.0, geometry.height_px());
        Self { x, y, height }
    }

    pub fn width(&self, geometry: &FrameGeometry) -> f64 {
        self.height * geometry.aspect_ratio()
    }

    /// Integral crop rectangle for this state.
    pub fn crop(&self, geometry: &FrameGeometry) -> CropRect {
        CropRect::from_window(geometry, self.x, self.y, self.height)
    }
}

/// Integral crop rectangle in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Truncate a fractional window to whole pixels inside the frame.
    ///
    /// Width is derived from the truncated height so the emitted ratio stays
    /// within one pixel of `A`. The result is never empty.
    pub fn from_window(geometry: &FrameGeometry, x: f64, y: f64, height: f64) -> Self {
        let height = (height.trunc() as u32).clamp(1, geometry.height());
        let width = (u64::from(height) * u64::from(geometry.width()) / u64::from(geometry.height()))
            .clamp(1, u64::from(geometry.width())) as u32;
        let x = (x.trunc() as u32).min(geometry.width() - width);
        let y = (y.trunc() as u32).min(geometry.height() - height);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the rectangle lies inside the frame.
    pub fn fits(&self, geometry: &FrameGeometry) -> bool {
        self.right() <= geometry.width() && self.bottom() <= geometry.height()
    }

    /// Zoom factor relative to the full frame (1.0 = no zoom).
    pub fn zoom_factor(&self, geometry: &FrameGeometry) -> f64 {
        geometry.height_px() / self.height as f64
    }
}

/// One line of controller output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRecord {
    pub frame: u64,

    /// Whether a trusted detection drove this frame's target.
    pub detected: bool,

    #[serde(flatten)]
    pub rect: CropRect,
}

/// Serialize crop records to JSONL.
pub fn serialize_records(records: &[CropRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}
