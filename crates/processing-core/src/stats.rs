//! Trajectory statistics over a run of crop rectangles.
//!
//! Used to summarize replays and to measure jitter: a well-tuned
//! controller keeps per-frame position deltas small.

use vptz_frame_model::CropRect;

/// Running summary of emitted crops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryStats {
    /// Frames recorded.
    pub frames: u64,
    /// Frames whose target came from a trusted detection.
    pub detected_frames: u64,
    /// Smallest crop height seen (tightest zoom).
    pub min_height: Option<u32>,
    /// Largest crop height seen (widest zoom).
    pub max_height: Option<u32>,
    /// Largest frame-to-frame move of the crop's top-left corner (pixels).
    pub max_step: f64,
    total_step: f64,
    last: Option<CropRect>,
}

impl TrajectoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame's crop.
    pub fn record(&mut self, crop: &CropRect, detected: bool) {
        self.frames += 1;
        if detected {
            self.detected_frames += 1;
        }
        self.min_height = Some(self.min_height.map_or(crop.height, |h| h.min(crop.height)));
        self.max_height = Some(self.max_height.map_or(crop.height, |h| h.max(crop.height)));

        if let Some(last) = self.last {
            let dx = crop.x as f64 - last.x as f64;
            let dy = crop.y as f64 - last.y as f64;
            let step = (dx * dx + dy * dy).sqrt();
            self.total_step += step;
            self.max_step = self.max_step.max(step);
        }
        self.last = Some(*crop);
    }

    /// Mean frame-to-frame move of the top-left corner (pixels).
    pub fn mean_step(&self) -> f64 {
        if self.frames < 2 {
            0.0
        } else {
            self.total_step / (self.frames - 1) as f64
        }
    }

    /// Fraction of frames that had a trusted detection.
    pub fn detection_rate(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.detected_frames as f64 / self.frames as f64
        }
    }

    /// Crop from the most recent frame.
    pub fn last(&self) -> Option<&CropRect> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop(x: u32, y: u32, height: u32) -> CropRect {
        CropRect {
            x,
            y,
            width: height * 4 / 3,
            height,
        }
    }

    #[test]
    fn test_empty_stats() {
        let stats = TrajectoryStats::new();
        assert_eq!(stats.frames, 0);
        assert_eq!(stats.mean_step(), 0.0);
        assert_eq!(stats.detection_rate(), 0.0);
        assert!(stats.min_height.is_none());
        assert!(stats.last().is_none());
    }

    #[test]
    fn test_records_steps_and_heights() {
        let mut stats = TrajectoryStats::new();
        stats.record(&crop(0, 0, 480), false);
        stats.record(&crop(3, 4, 450), true);
        stats.record(&crop(3, 4, 420), true);

        assert_eq!(stats.frames, 3);
        assert_eq!(stats.detected_frames, 2);
        assert_eq!(stats.min_height, Some(420));
        assert_eq!(stats.max_height, Some(480));
        assert!((stats.max_step - 5.0).abs() < 1e-9);
        assert!((stats.mean_step() - 2.5).abs() < 1e-9);
        assert!((stats.detection_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.last().map(|c| c.height), Some(420));
    }
}
