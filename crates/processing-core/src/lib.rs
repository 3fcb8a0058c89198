//! vPTZ Processing Core — the virtual pan-tilt-zoom controller
//!
//! Turns per-frame subject detections into a smooth crop trajectory:
//! - **Target Estimation:** Map a detection to a desired crop window (zoom + deadzone)
//! - **Viewport Smoothing:** Ease the crop toward the target, clamped to the frame
//! - **Controller:** One estimate plus one smoother update per frame
//!
//! This crate is pure computation — no I/O, no timers, no global state.
//! All inputs are data; all outputs are data.

pub mod controller;
pub mod smoother;
pub mod stats;
pub mod target;

pub use controller::VptzController;
pub use smoother::ViewportSmoother;
pub use stats::TrajectoryStats;
pub use target::{DeadBox, TargetEstimate, TargetEstimator};
