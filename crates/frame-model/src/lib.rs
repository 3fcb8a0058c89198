//! vPTZ Frame Model
//!
//! Defines the data contracts shared by the controller and its drivers:
//! - **Geometry:** Source frame size and the window clamping rule
//! - **Detections:** Normalized subject bounding boxes and the JSONL stream format
//! - **Windows:** Target windows, viewport state, and integral crop rectangles
//!
//! Detections are normalized to `[0.0, 1.0]`; windows and crops are in
//! source pixels.

pub mod detection;
pub mod geometry;
pub mod window;

pub use detection::*;
pub use geometry::*;
pub use window::*;
