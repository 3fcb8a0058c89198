//! Source frame geometry.

use serde::Serialize;
use vptz_common::{VptzError, VptzResult};

/// Smallest window height (pixels) the controller will ever produce.
pub const MIN_WINDOW_HEIGHT: f64 = 1.0;

/// Immutable per-session frame dimensions.
///
/// The aspect ratio `A = W / H` is the ratio every crop window preserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameGeometry {
    width: u32,
    height: u32,
}

impl FrameGeometry {
    /// Create a geometry, rejecting zero-sized frames.
    pub fn new(width: u32, height: u32) -> VptzResult<Self> {
        if width == 0 || height == 0 {
            return Err(VptzError::geometry(format!(
                "frame must have non-zero size, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width_px(&self) -> f64 {
        self.width as f64
    }

    pub fn height_px(&self) -> f64 {
        self.height as f64
    }

    /// `W / H`.
    pub fn aspect_ratio(&self) -> f64 {
        self.width_px() / self.height_px()
    }

    /// Length of the shorter side, used to normalize subject size.
    pub fn shorter_side(&self) -> f64 {
        self.width_px().min(self.height_px())
    }

    /// Center of the full frame in pixels.
    pub fn center(&self) -> (f64, f64) {
        (self.width_px() / 2.0, self.height_px() / 2.0)
    }

    /// Largest window height. Since `A = W / H`, a window of height `H` is
    /// also exactly `W` wide.
    pub fn max_window_height(&self) -> f64 {
        self.height_px()
    }

    /// Clamp an aspect-preserving window `(x, y, height)` into the frame.
    ///
    /// Size is clamped first, then position, so an oversized window shrinks
    /// to fit instead of being pushed off the edge. A window that already fits
    /// keeps its size and is only shifted. Non-finite input never escapes:
    /// a NaN height becomes the full frame and NaN positions become 0.
    pub fn clamp_window(&self, x: f64, y: f64, height: f64) -> (f64, f64, f64) {
        let max_height = self.max_window_height();
        let height = if height.is_nan() {
            max_height
        } else {
            height.clamp(MIN_WINDOW_HEIGHT.min(max_height), max_height)
        };
        let width = height * self.aspect_ratio();

        let x = clamp_or_zero(x, (self.width_px() - width).max(0.0));
        let y = clamp_or_zero(y, (self.height_px() - height).max(0.0));

        (x, y, height)
    }
}

fn clamp_or_zero(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn vga() -> FrameGeometry {
        FrameGeometry::new(640, 480).unwrap()
    }

    #[test]
    fn test_rejects_zero_size() {
        assert!(FrameGeometry::new(0, 480).is_err());
        assert!(FrameGeometry::new(640, 0).is_err());
    }

    #[test]
    fn test_derived_values() {
        let g = vga();
        assert!((g.aspect_ratio() - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(g.shorter_side(), 480.0);
        assert_eq!(g.center(), (320.0, 240.0));
        assert_eq!(g.max_window_height(), 480.0);
    }

    #[test]
    fn test_clamp_window_shifts_without_resizing() {
        let g = vga();
        let (x, y, h) = g.clamp_window(-50.0, 400.0, 240.0);
        assert_eq!(x, 0.0);
        assert_eq!(h, 240.0);
        assert_eq!(y, 240.0);

        let (x, _, _) = g.clamp_window(600.0, 0.0, 240.0);
        assert!((x - 320.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_window_shrinks_oversized() {
        let g = vga();
        let (x, y, h) = g.clamp_window(10.0, 10.0, 1000.0);
        assert!((h - 480.0).abs() < 1e-9);
        assert_eq!(x, 0.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn test_clamp_window_handles_degenerate_input() {
        let g = vga();
        let (_, _, h) = g.clamp_window(0.0, 0.0, 0.0);
        assert_eq!(h, MIN_WINDOW_HEIGHT);

        let (x, y, h) = g.clamp_window(f64::NAN, f64::NAN, f64::NAN);
        assert_eq!((x, y), (0.0, 0.0));
        assert!((h - 480.0).abs() < 1e-9);

        let (x, _, _) = g.clamp_window(f64::INFINITY, 0.0, 100.0);
        assert!(x + 100.0 * g.aspect_ratio() <= 640.0 + 1e-9);
    }

    proptest! {
        #[test]
        fn clamped_window_always_fits(
            w in 1u32..=4096,
            h in 1u32..=4096,
            x in -1e5..1e5f64,
            y in -1e5..1e5f64,
            height in -1e4..1e5f64,
        ) {
            let g = FrameGeometry::new(w, h).unwrap();
            let (cx, cy, ch) = g.clamp_window(x, y, height);
            prop_assert!(ch >= MIN_WINDOW_HEIGHT.min(g.height_px()));
            prop_assert!(ch <= g.height_px());
            prop_assert!(cx >= 0.0 && cy >= 0.0);
            prop_assert!(cx + ch * g.aspect_ratio() <= g.width_px() + 1e-6);
            prop_assert!(cy + ch <= g.height_px() + 1e-6);
        }
    }
}
