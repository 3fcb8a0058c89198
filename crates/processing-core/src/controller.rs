//! The per-frame vPTZ control loop.
//!
//! One [`VptzController`] per video session. Each frame runs exactly one
//! target estimate followed by one smoother update and yields the crop
//! rectangle for that frame. All state lives in the controller; dropping it
//! or calling [`VptzController::reset`] starts a fresh session.

use vptz_common::{ControllerConfig, VptzResult};
use vptz_frame_model::{
    CropRect, Detection, FrameDetections, FrameGeometry, TargetWindow, ViewportState,
};

use crate::smoother::ViewportSmoother;
use crate::target::{TargetEstimate, TargetEstimator};

/// Single-subject virtual pan-tilt-zoom controller.
#[derive(Debug, Clone)]
pub struct VptzController {
    geometry: FrameGeometry,
    config: ControllerConfig,
    estimator: TargetEstimator,
    smoother: ViewportSmoother,
    target: TargetWindow,
    state: ViewportState,
    last_estimate: Option<TargetEstimate>,
    frames_processed: u64,
}

impl VptzController {
    /// Create a controller for one session. Fails only on invalid config.
    pub fn new(geometry: FrameGeometry, config: ControllerConfig) -> VptzResult<Self> {
        config.validate()?;

        tracing::debug!(
            width = geometry.width(),
            height = geometry.height(),
            ?config,
            "vPTZ controller created"
        );

        Ok(Self::build(geometry, config))
    }

    /// Create a controller with default tuning.
    pub fn with_defaults(geometry: FrameGeometry) -> Self {
        Self::build(geometry, ControllerConfig::default())
    }

    fn build(geometry: FrameGeometry, config: ControllerConfig) -> Self {
        let smoother = ViewportSmoother::new(geometry, &config);
        Self {
            geometry,
            estimator: TargetEstimator::new(geometry, &config),
            target: TargetWindow::full_frame(&geometry),
            state: smoother.initial_state(),
            smoother,
            config,
            last_estimate: None,
            frames_processed: 0,
        }
    }

    /// Process one frame's subject (or its absence) and return the crop.
    ///
    /// When `mirror` is configured the detection is flipped horizontally
    /// first.
    pub fn step(&mut self, detection: Option<&Detection>) -> CropRect {
        let detection = detection.map(|d| if self.config.mirror { d.mirrored() } else { *d });

        self.last_estimate = detection.map(|d| self.estimator.estimate_detection(&d));
        self.target = match &self.last_estimate {
            Some(estimate) => estimate.window,
            None => self.estimator.estimate(None, &self.target),
        };

        self.smoother.advance(&self.target, &mut self.state);
        self.frames_processed += 1;
        self.smoother.crop(&self.state)
    }

    /// Process one frame of raw detector output.
    ///
    /// The subject is the first detection scoring at least `min_confidence`;
    /// any others are ignored.
    pub fn step_frame(&mut self, frame: &FrameDetections) -> CropRect {
        let subject = frame.primary(self.config.min_confidence).copied();
        if subject.is_none() && !frame.detections.is_empty() {
            tracing::trace!(
                frame = frame.frame,
                count = frame.detections.len(),
                "All detections below confidence threshold"
            );
        }
        self.step(subject.as_ref())
    }

    /// Return to the session-start state: full-frame target and viewport.
    pub fn reset(&mut self) {
        self.target = TargetWindow::full_frame(&self.geometry);
        self.state = self.smoother.initial_state();
        self.last_estimate = None;
        tracing::debug!(frames = self.frames_processed, "vPTZ controller reset");
        self.frames_processed = 0;
    }

    /// Current smoothed viewport.
    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    /// Target the viewport is converging on.
    pub fn target(&self) -> &TargetWindow {
        &self.target
    }

    /// Crop rectangle for the current state, without advancing.
    pub fn crop(&self) -> CropRect {
        self.smoother.crop(&self.state)
    }

    /// Estimator diagnostics for the last frame, if it had a subject.
    pub fn last_estimate(&self) -> Option<&TargetEstimate> {
        self.last_estimate.as_ref()
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Frames processed since creation or the last reset.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vga() -> FrameGeometry {
        FrameGeometry::new(640, 480).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ControllerConfig {
            translate_smoothing: 1.5,
            ..Default::default()
        };
        assert!(VptzController::new(vga(), config).is_err());
    }

    #[test]
    fn test_starts_at_full_frame() {
        let ctrl = VptzController::with_defaults(vga());
        let crop = ctrl.crop();
        assert_eq!((crop.x, crop.y, crop.width, crop.height), (0, 0, 640, 480));
        assert_eq!(ctrl.frames_processed(), 0);
        assert!(ctrl.last_estimate().is_none());
    }

    #[test]
    fn test_no_detection_never_moves() {
        let mut ctrl = VptzController::with_defaults(vga());
        let initial_target = *ctrl.target();
        for _ in 0..100 {
            let crop = ctrl.step(None);
            assert_eq!((crop.x, crop.y, crop.width, crop.height), (0, 0, 640, 480));
            assert_eq!(*ctrl.target(), initial_target);
        }
        assert_eq!(ctrl.frames_processed(), 100);
    }

    #[test]
    fn test_holds_target_through_dropouts() {
        let mut ctrl = VptzController::with_defaults(vga());
        let subject = Detection::new(0.6, 0.4, 0.03, 0.04);
        ctrl.step(Some(&subject));
        let held = *ctrl.target();

        for _ in 0..10 {
            ctrl.step(None);
            assert_eq!(*ctrl.target(), held);
            assert!(ctrl.last_estimate().is_none());
        }
    }

    #[test]
    fn test_step_frame_filters_low_confidence() {
        let mut ctrl = VptzController::with_defaults(vga());
        let frame = FrameDetections::new(
            0,
            vec![Detection::new(0.45, 0.45, 0.02, 0.02).with_score(0.1)],
        );
        ctrl.step_frame(&frame);
        assert!(ctrl.last_estimate().is_none());
        assert_eq!(*ctrl.target(), TargetWindow::full_frame(&vga()));

        let frame = FrameDetections::new(
            1,
            vec![
                Detection::new(0.1, 0.1, 0.02, 0.02).with_score(0.2),
                Detection::new(0.45, 0.45, 0.02, 0.02).with_score(0.9),
            ],
        );
        ctrl.step_frame(&frame);
        let estimate = ctrl.last_estimate().unwrap();
        assert!((estimate.subject_center.0 - 0.46 * 640.0).abs() < 1e-9);
    }

    #[test]
    fn test_mirror_flips_subject() {
        let config = ControllerConfig {
            mirror: true,
            ..Default::default()
        };
        let mut ctrl = VptzController::new(vga(), config).unwrap();
        ctrl.step(Some(&Detection::new(0.1, 0.45, 0.05, 0.05)));
        let (cx, _) = ctrl.last_estimate().unwrap().subject_center;
        assert!((cx - 0.875 * 640.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restores_session_start() {
        let mut ctrl = VptzController::with_defaults(vga());
        let subject = Detection::new(0.7, 0.2, 0.02, 0.02);
        for _ in 0..30 {
            ctrl.step(Some(&subject));
        }
        assert_ne!(ctrl.crop().height, 480);

        ctrl.reset();
        assert_eq!(*ctrl.state(), ViewportState::initial(&vga()));
        assert_eq!(*ctrl.target(), TargetWindow::full_frame(&vga()));
        assert_eq!(ctrl.frames_processed(), 0);
    }
}
