//! Stem-to-channel assignment

use crate::error::{Result, SegError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stem identifiers the pipeline recognizes. Files whose basename is not in
/// this set are ignored without error.
pub const KNOWN_STEMS: [&str; 5] = ["vocals", "song", "guitar", "rhythm", "drums"];

/// Policy for two stems landing on the same channel of one window.
///
/// The channel layout can legitimately map several stems to one channel
/// (grouped mode), so the collision behavior is explicit configuration
/// rather than an accident of directory iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Last deposited stem wins; stems are processed in sorted name order,
    /// so the outcome is deterministic.
    Replace,
    /// Running arithmetic mean of every stem deposited on the channel.
    Average,
}

/// Static mapping from stem identifier to logical channel index
#[derive(Debug, Clone)]
pub struct ChannelMap {
    assignments: HashMap<String, usize>,
    num_channels: usize,
}

impl ChannelMap {
    /// Grouped layout: vocals, melodic accompaniment, percussion.
    pub fn grouped() -> Self {
        Self::from_assignments(&[
            ("vocals", 0),
            ("song", 1),
            ("guitar", 1),
            ("rhythm", 1),
            ("drums", 2),
        ])
    }

    /// Flat layout: one channel per known stem.
    pub fn flat() -> Self {
        let pairs: Vec<(&str, usize)> = KNOWN_STEMS
            .iter()
            .enumerate()
            .map(|(idx, &stem)| (stem, idx))
            .collect();
        Self::from_assignments(&pairs)
    }

    /// Build a map from explicit (stem, channel) pairs.
    pub fn from_assignments(pairs: &[(&str, usize)]) -> Self {
        let assignments: HashMap<String, usize> = pairs
            .iter()
            .map(|&(stem, channel)| (stem.to_string(), channel))
            .collect();
        let num_channels = assignments.values().max().map_or(0, |&max| max + 1);
        Self {
            assignments,
            num_channels,
        }
    }

    /// Channel index for a stem, or `UnknownStem` for callers that require a
    /// hard mapping. The pipeline filters unknown stems before this call.
    pub fn channel_for(&self, stem_id: &str) -> Result<usize> {
        self.assignments
            .get(stem_id)
            .copied()
            .ok_or_else(|| SegError::UnknownStem(stem_id.to_string()))
    }

    pub fn contains(&self, stem_id: &str) -> bool {
        self.assignments.contains_key(stem_id)
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }
}
