//! Viewport smoothing.
//!
//! Moves the viewport a fixed fraction of the remaining distance toward the
//! target every frame (a first-order IIR low-pass, no overshoot). With the
//! default factor of 0.05 the time constant is about 20 frames. Smoothing is
//! counted in frames, not seconds, so the visual speed follows the frame rate.

use vptz_common::ControllerConfig;
use vptz_frame_model::{CropRect, FrameGeometry, TargetWindow, ViewportState};

/// Exponential smoother for the crop viewport.
#[derive(Debug, Clone)]
pub struct ViewportSmoother {
    geometry: FrameGeometry,
    zoom_smoothing: f64,
    translate_smoothing: f64,
}

impl ViewportSmoother {
    pub fn new(geometry: FrameGeometry, config: &ControllerConfig) -> Self {
        Self {
            geometry,
            zoom_smoothing: config.zoom_smoothing,
            translate_smoothing: config.translate_smoothing,
        }
    }

    /// State at session start: the full frame.
    pub fn initial_state(&self) -> ViewportState {
        ViewportState::initial(&self.geometry)
    }

    /// Advance `state` one frame toward `target`, clamp it into the frame and
    /// return the new value.
    ///
    /// Never fails: any target, including one outside the frame, leaves
    /// `state` describing a valid window.
    pub fn advance(&self, target: &TargetWindow, state: &mut ViewportState) -> ViewportState {
        let height = state.height + self.zoom_smoothing * (target.height - state.height);
        let x = state.x + self.translate_smoothing * (target.x - state.x);
        let y = state.y + self.translate_smoothing * (target.y - state.y);

        let (x, y, height) = self.geometry.clamp_window(x, y, height);
        *state = ViewportState { x, y, height };
        *state
    }

    /// Integral crop rectangle for `state`.
    pub fn crop(&self, state: &ViewportState) -> CropRect {
        state.crop(&self.geometry)
    }
}
