//! Target estimation: detection → desired crop window.
//!
//! # Algorithm
//!
//! 1. **Measure** the subject: center in pixels and size ratio
//!    `fs = max(w·W, h·H) / min(W, H)`.
//! 2. **Zoom**: subjects at or above `fs_min` get a fixed wide crop
//!    (`wide_zoom_fraction · H`); smaller ones get `H / fs_min · fs`.
//! 3. **Center** a window of that height on the subject and clamp it into
//!    the frame without resizing.
//! 4. **Deadzone**: a box `deadzone_fraction` the size of the target window,
//!    centered on the *frame*. A subject outside it nudges the target by
//!    `translate_smoothing · (subject − frame center)`.
//! 5. **Clamp** again.
//!
//! With no detection the previous target is held, so the smoother keeps
//! converging on the last known subject position.

use vptz_common::ControllerConfig;
use vptz_frame_model::{Detection, FrameGeometry, TargetWindow};

/// Axis-aligned dead box in source pixels. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl DeadBox {
    /// Box of the given size centered at `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self {
            x_min: cx - width / 2.0,
            y_min: cy - height / 2.0,
            x_max: cx + width / 2.0,
            y_max: cy + height / 2.0,
        }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x_min && px <= self.x_max && py >= self.y_min && py <= self.y_max
    }
}

/// Everything the estimator worked out for one detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetEstimate {
    /// The resulting target, clamped into the frame.
    pub window: TargetWindow,
    /// Subject center in pixels.
    pub subject_center: (f64, f64),
    /// Subject size relative to the frame's shorter side.
    pub fs_ratio: f64,
    /// Whether the fixed wide framing was used.
    pub wide: bool,
    pub dead_box: DeadBox,
    /// Whether the subject sat outside the dead box and moved the target.
    pub nudged: bool,
}

/// Maps detections to target windows for one frame geometry.
#[derive(Debug, Clone)]
pub struct TargetEstimator {
    geometry: FrameGeometry,
    fs_min: f64,
    wide_zoom_fraction: f64,
    deadzone_fraction: f64,
    translate_smoothing: f64,
}

impl TargetEstimator {
    pub fn new(geometry: FrameGeometry, config: &ControllerConfig) -> Self {
        Self {
            geometry,
            fs_min: config.fs_min,
            wide_zoom_fraction: config.wide_zoom_fraction,
            deadzone_fraction: config.deadzone_fraction,
            translate_smoothing: config.translate_smoothing,
        }
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Target for this frame. No detection holds `previous`.
    pub fn estimate(
        &self,
        detection: Option<&Detection>,
        previous: &TargetWindow,
    ) -> TargetWindow {
        match detection {
            Some(detection) => self.estimate_detection(detection).window,
            None => *previous,
        }
    }

    /// Full estimate for a present detection.
    pub fn estimate_detection(&self, detection: &Detection) -> TargetEstimate {
        let g = &self.geometry;
        let detection = detection.sanitized();

        let (cx, cy) = detection.center_px(g);
        let fs_ratio = detection.size_ratio(g);
        let (height, wide) = self.zoom_height(fs_ratio);

        // Size is fixed from here on; clamping only moves the window.
        let (_, _, height) = g.clamp_window(0.0, 0.0, height);
        let width = height * g.aspect_ratio();
        let (x, y, _) = g.clamp_window(cx - width / 2.0, cy - height / 2.0, height);

        let (fx, fy) = g.center();
        let dead_box = DeadBox::centered(
            fx,
            fy,
            width * self.deadzone_fraction,
            height * self.deadzone_fraction,
        );
        let nudged = !dead_box.contains(cx, cy);
        let (x, y) = if nudged {
            (
                x + self.translate_smoothing * (cx - fx),
                y + self.translate_smoothing * (cy - fy),
            )
        } else {
            (x, y)
        };

        let window = TargetWindow::clamped(g, x, y, height);

        tracing::trace!(
            cx,
            cy,
            fs_ratio,
            wide,
            nudged,
            x = window.x,
            y = window.y,
            height = window.height,
            "Estimated target"
        );

        TargetEstimate {
            window,
            subject_center: (cx, cy),
            fs_ratio,
            wide,
            dead_box,
            nudged,
        }
    }

    /// Crop height for a subject size ratio, and whether the wide branch
    /// was taken.
    ///
    /// Below `fs_min` the height grows linearly with subject size, so a
    /// smaller subject gets a tighter crop.
    pub fn zoom_height(&self, fs_ratio: f64) -> (f64, bool) {
        let h = self.geometry.height_px();
        if fs_ratio >= self.fs_min {
            (h * self.wide_zoom_fraction, true)
        } else {
            (h / self.fs_min * fs_ratio, false)
        }
    }
}
