//! Generate synthetic detection streams for exercising the controller.
//!
//! The subject drifts along a Lissajous path while its apparent size swings
//! between small (tight zoom) and large (wide framing). Every `dropout`th
//! frame has no detection, and every seventh frame carries a low-confidence
//! distractor ahead of the real subject.

use std::f64::consts::TAU;
use std::path::PathBuf;

use vptz_frame_model::{
    serialize_detections, Detection, DetectionStreamHeader, FrameDetections, FrameGeometry,
};

pub fn run(
    output: PathBuf,
    frames: u64,
    width: u32,
    height: u32,
    dropout: u64,
) -> anyhow::Result<()> {
    let geometry = FrameGeometry::new(width, height)?;
    let stream = synthetic_stream(frames, dropout);
    let header = DetectionStreamHeader::new(geometry.width(), geometry.height());
    let jsonl = serialize_detections(Some(&header), &stream)?;

    std::fs::write(&output, jsonl)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;

    let detected = stream.iter().filter(|f| !f.detections.is_empty()).count();
    tracing::debug!(frames, dropout, "Synthetic stream generated");
    println!(
        "Wrote {frames} frames ({detected} with detections) to {}",
        output.display()
    );
    Ok(())
}

/// Deterministic detection stream of `frames` frames.
pub fn synthetic_stream(frames: u64, dropout: u64) -> Vec<FrameDetections> {
    (0..frames)
        .map(|i| {
            if dropout > 0 && i % dropout == dropout - 1 {
                return FrameDetections::empty(i);
            }

            let t = i as f64 / 240.0;
            let size = 0.11 + 0.09 * (TAU * t * 0.5).sin();
            let cx = 0.5 + 0.3 * (TAU * t).sin();
            let cy = 0.5 + 0.2 * (TAU * t * 2.0).sin();

            let subject = Detection::new(cx - size / 2.0, cy - size / 2.0, size, size)
                .with_score(0.9)
                .sanitized();

            let mut detections = Vec::with_capacity(2);
            if i % 7 == 3 {
                detections.push(Detection::new(0.05, 0.05, 0.1, 0.1).with_score(0.1));
            }
            detections.push(subject);
            FrameDetections::new(i, detections)
        })
        .collect()
}
