//! Replay a detection stream through the controller.

use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use vptz_common::config::{AppConfig, ControllerConfig};
use vptz_frame_model::{
    parse_detections, parse_stream_header, serialize_records, CropRecord, DetectionStreamHeader,
    FrameDetections, FrameGeometry,
};
use vptz_processing_core::{TrajectoryStats, VptzController};

pub struct ReplayOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mirror: bool,
    pub min_confidence: Option<f64>,
}

/// Header line written ahead of the crop records.
#[derive(Debug, Serialize)]
struct ReplayHeader {
    generated_at: String,
    frame_width: u32,
    frame_height: u32,
    frames: usize,
}

/// Crop records and summary for one replay.
pub struct ReplayReport {
    pub records: Vec<CropRecord>,
    pub stats: TrajectoryStats,
}

impl ReplayReport {
    /// Tightest zoom reached during the replay (1.0 = never zoomed in).
    pub fn max_zoom(&self, geometry: &FrameGeometry) -> f64 {
        self.records
            .iter()
            .map(|record| record.rect.zoom_factor(geometry))
            .fold(1.0, f64::max)
    }
}

pub fn run(config: &AppConfig, options: ReplayOptions) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&options.input).map_err(|e| {
        anyhow::anyhow!("Failed to read detections {}: {e}", options.input.display())
    })?;

    let header = parse_stream_header(&content);
    let frames = parse_detections(&content)
        .with_context(|| format!("Failed to parse detections {}", options.input.display()))?;

    let geometry = resolve_geometry(config, header.as_ref(), options.width, options.height)?;

    let mut controller_config = config.controller;
    if options.mirror {
        controller_config.mirror = true;
    }
    if let Some(min_confidence) = options.min_confidence {
        controller_config.min_confidence = min_confidence;
    }

    tracing::info!(
        frames = frames.len(),
        width = geometry.width(),
        height = geometry.height(),
        "Replaying detection stream"
    );

    let report = replay(geometry, controller_config, &frames)?;

    let replay_header = ReplayHeader {
        generated_at: chrono::Utc::now().to_rfc3339(),
        frame_width: geometry.width(),
        frame_height: geometry.height(),
        frames: report.records.len(),
    };
    let mut output = format!("# {}\n", serde_json::to_string(&replay_header)?);
    output.push_str(&serialize_records(&report.records)?);

    let stats = &report.stats;
    let max_zoom = report.max_zoom(&geometry);
    match &options.output {
        Some(path) => {
            std::fs::write(path, output)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
            println!(
                "Replayed {} frames from {}",
                stats.frames,
                options.input.display()
            );
            println!("  Detection rate: {:.1}%", stats.detection_rate() * 100.0);
            if let (Some(min), Some(max)) = (stats.min_height, stats.max_height) {
                println!("  Crop height: {min}..={max} px (up to {max_zoom:.2}x zoom)");
            }
            println!(
                "  Motion: mean {:.2} px/frame, max {:.2} px/frame",
                stats.mean_step(),
                stats.max_step
            );
            println!("  Crops saved to: {}", path.display());
        }
        None => {
            print!("{output}");
            tracing::info!(
                frames = stats.frames,
                detection_rate = stats.detection_rate(),
                max_zoom,
                mean_step = stats.mean_step(),
                max_step = stats.max_step,
                "Replay complete"
            );
        }
    }

    Ok(())
}

/// Run a fresh controller over `frames`, one step per frame.
pub fn replay(
    geometry: FrameGeometry,
    config: ControllerConfig,
    frames: &[FrameDetections],
) -> anyhow::Result<ReplayReport> {
    let mut controller = VptzController::new(geometry, config)?;
    let mut stats = TrajectoryStats::new();

    let records = frames
        .iter()
        .map(|frame| {
            let rect = controller.step_frame(frame);
            let detected = controller.last_estimate().is_some();
            stats.record(&rect, detected);
            CropRecord {
                frame: frame.frame,
                detected,
                rect,
            }
        })
        .collect();

    Ok(ReplayReport { records, stats })
}

/// Frame size from CLI flags, then the stream header, then config.
fn resolve_geometry(
    config: &AppConfig,
    header: Option<&DetectionStreamHeader>,
    width: Option<u32>,
    height: Option<u32>,
) -> anyhow::Result<FrameGeometry> {
    let width = width
        .or(header.map(|h| h.frame_width))
        .unwrap_or(config.frame.width);
    let height = height
        .or(header.map(|h| h.frame_height))
        .unwrap_or(config.frame.height);

    if let Some(header) = header {
        if (header.frame_width, header.frame_height) != (width, height) {
            tracing::warn!(
                header_width = header.frame_width,
                header_height = header.frame_height,
                width,
                height,
                "Frame size differs from detection stream header"
            );
        }
    }

    Ok(FrameGeometry::new(width, height)?)
}

#[cfg(test)]
mod tests {
    use vptz_frame_model::Detection;

    use super::*;

    #[test]
    fn test_geometry_precedence() {
        let config = AppConfig::default();
        let header = DetectionStreamHeader::new(1280, 720);

        let g = resolve_geometry(&config, None, None, None).unwrap();
        assert_eq!((g.width(), g.height()), (640, 480));

        let g = resolve_geometry(&config, Some(&header), None, None).unwrap();
        assert_eq!((g.width(), g.height()), (1280, 720));

        let g = resolve_geometry(&config, Some(&header), Some(1920), None).unwrap();
        assert_eq!((g.width(), g.height()), (1920, 720));

        assert!(resolve_geometry(&config, None, Some(0), None).is_err());
    }

    #[test]
    fn test_replay_marks_detected_frames() {
        let geometry = FrameGeometry::new(640, 480).unwrap();
        let frames = vec![
            FrameDetections::new(0, vec![Detection::new(0.4, 0.4, 0.05, 0.05)]),
            FrameDetections::empty(1),
            FrameDetections::new(
                2,
                vec![Detection::new(0.4, 0.4, 0.05, 0.05).with_score(0.05)],
            ),
        ];

        let report = replay(geometry, ControllerConfig::default(), &frames).unwrap();
        let detected: Vec<bool> = report.records.iter().map(|r| r.detected).collect();
        assert_eq!(detected, vec![true, false, false]);
        assert_eq!(report.stats.detected_frames, 1);
        assert!(report.records.iter().all(|r| r.rect.fits(&geometry)));
    }

    #[test]
    fn test_max_zoom_tracks_tightest_crop() {
        let geometry = FrameGeometry::new(640, 480).unwrap();
        let empty = replay(geometry, ControllerConfig::default(), &[]).unwrap();
        assert_eq!(empty.max_zoom(&geometry), 1.0);

        let frames: Vec<_> = (0..120)
            .map(|i| FrameDetections::new(i, vec![Detection::new(0.4, 0.3, 0.2, 0.2)]))
            .collect();
        let report = replay(geometry, ControllerConfig::default(), &frames).unwrap();
        let min_height = report.stats.min_height.unwrap();
        assert!((report.max_zoom(&geometry) - 480.0 / min_height as f64).abs() < 1e-12);
        // Wide framing settles near 360 px, so zoom approaches 4/3.
        assert!(report.max_zoom(&geometry) > 1.3);
    }

    #[test]
    fn test_replay_rejects_invalid_config() {
        let geometry = FrameGeometry::new(640, 480).unwrap();
        let config = ControllerConfig {
            fs_min: 0.0,
            ..Default::default()
        };
        assert!(replay(geometry, config, &[]).is_err());
    }
}
