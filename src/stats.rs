//! Aggregate statistics over parsed frames
//!
//! Bitrate is resolved per frame, so a stream is VBR exactly when its
//! frames declare more than one distinct bitrate.

use serde::Serialize;
use std::collections::HashSet;

use crate::mpeg::frame::Frame;

/// Statistics over a parsed frame sequence.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamStats {
    pub frame_count: usize,
    /// Per-frame bitrates, stream order (kbit/s).
    pub bitrates: Vec<u32>,
    /// Per-frame payload sizes, stream order.
    pub frame_sizes: Vec<usize>,
    pub is_vbr: bool,
    pub avg_bitrate: u32,
    pub min_bitrate: u32,
    pub max_bitrate: u32,
}

impl StreamStats {
    pub fn from_frames(frames: &[Frame]) -> Self {
        let mut stats = StreamStats::default();
        let mut unique_bitrates = HashSet::new();

        for frame in frames {
            stats.frame_count += 1;
            stats.bitrates.push(frame.bitrate);
            stats.frame_sizes.push(frame.size);
            unique_bitrates.insert(frame.bitrate);
        }

        if !stats.bitrates.is_empty() {
            stats.is_vbr = unique_bitrates.len() > 1;
            stats.avg_bitrate = stats.bitrates.iter().sum::<u32>() / stats.bitrates.len() as u32;
            stats.min_bitrate = *stats.bitrates.iter().min().unwrap();
            stats.max_bitrate = *stats.bitrates.iter().max().unwrap();
        }

        stats
    }

    /// Coefficient of variation of frame payload sizes, in percent.
    pub fn frame_size_cv(&self) -> f64 {
        if self.frame_sizes.is_empty() {
            return 0.0;
        }

        let mean: f64 = self.frame_sizes.iter().map(|&x| x as f64).sum::<f64>()
            / self.frame_sizes.len() as f64;

        if mean == 0.0 {
            return 0.0;
        }

        let variance: f64 = self
            .frame_sizes
            .iter()
            .map(|&x| {
                let diff = x as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / self.frame_sizes.len() as f64;

        (variance.sqrt() / mean) * 100.0
    }
}
