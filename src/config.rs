//! Configuration for the segmentation pipeline

use crate::channels::CollisionPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sample rate every stem is expected to carry.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Canonical window length in samples. Must stay in agreement with
/// `DEFAULT_WINDOW_DURATION` at `DEFAULT_SAMPLE_RATE`.
pub const DEFAULT_WINDOW_LEN: usize = 1 << 18;

/// Window duration in seconds: DEFAULT_WINDOW_LEN / DEFAULT_SAMPLE_RATE.
pub const DEFAULT_WINDOW_DURATION: f64 = 5.461_333_3;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    /// Where segment directories are written. Defaults to
    /// `<dataset>/../audio_segments` when unset.
    pub segment_output_dir: Option<PathBuf>,
    /// Sample rate every stem must match (Hz).
    pub sample_rate: u32,
    /// Lyric window duration in seconds.
    pub window_duration: f64,
    /// Window length in samples at `sample_rate`. Fixed for the run;
    /// extraction always yields exactly this many samples per window.
    pub window_len: usize,
    /// Drop windows whose cleaned lyric text is shorter than `min_lyric_len`.
    pub ignore_short_windows: bool,
    /// Minimum lyric text length (characters) for a window to be kept.
    pub min_lyric_len: usize,
    /// Write the per-stem mono clips into each window directory.
    pub write_raw_stems: bool,
    /// Write the channel-stacked raw tensor (`pre_fourier.json`).
    pub write_pre_transform_tensor: bool,
    /// Write the DCT output (`fourier.json`).
    pub write_transformed_tensor: bool,
    /// Write the multi-channel `collapsed.wav` derived from the raw tensor.
    pub write_collapsed_audio: bool,
    /// Grouped channel layout (vocals / melodic / percussion) instead of one
    /// channel per known stem.
    pub use_grouped_channels: bool,
    /// What to do when two stems land on the same channel of one window.
    pub channel_collision: CollisionPolicy,
    /// File extension identifying stem audio files.
    pub audio_extension: String,
    /// Name of the tempo/lyric MIDI file inside each song directory.
    pub midi_filename: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            segment_output_dir: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            window_duration: DEFAULT_WINDOW_DURATION,
            window_len: DEFAULT_WINDOW_LEN,
            ignore_short_windows: true,
            min_lyric_len: 4,
            write_raw_stems: true,
            write_pre_transform_tensor: true,
            write_transformed_tensor: true,
            write_collapsed_audio: true,
            use_grouped_channels: true,
            channel_collision: CollisionPolicy::Replace,
            audio_extension: "wav".to_string(),
            midi_filename: "notes.mid".to_string(),
        }
    }
}

/// Validate configuration parameters
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    if config.sample_rate == 0 {
        anyhow::bail!("sample_rate must be positive");
    }
    if config.window_len == 0 {
        anyhow::bail!("window_len must be positive");
    }
    if config.window_duration <= 0.0 {
        anyhow::bail!("window_duration must be positive");
    }

    // The window length and duration describe the same span of audio; a
    // disagreement silently misaligns every extracted segment.
    let derived_len = config.window_duration * config.sample_rate as f64;
    if (derived_len - config.window_len as f64).abs() > 1.0 {
        anyhow::bail!(
            "window_len {} disagrees with window_duration {}s at {} Hz (expected ~{:.0} samples)",
            config.window_len,
            config.window_duration,
            config.sample_rate,
            derived_len
        );
    }

    if config.write_transformed_tensor {
        let side = (config.window_len as f64).sqrt().round() as usize;
        if side * side != config.window_len {
            anyhow::bail!(
                "window_len {} is not a perfect square; the block DCT cannot be applied",
                config.window_len
            );
        }
    }

    Ok(())
}

/// Load configuration from JSON file
pub fn load_config<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Save configuration to JSON file
pub fn save_config<P: AsRef<std::path::Path>>(config: &Config, path: P) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        validate_config(&config).unwrap();
        // 2^18 samples at 48 kHz is the documented default span
        assert_eq!(config.window_len, 262_144);
        assert!((config.window_duration - 262_144.0 / 48_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_rejects_disagreeing_window_len() {
        let config = Config {
            window_len: 48_000, // 1 second, but duration says ~5.46
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_non_square_window_len_when_transforming() {
        let config = Config {
            sample_rate: 100,
            window_duration: 2.0,
            window_len: 200, // not a perfect square
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());

        let config = Config {
            write_transformed_tensor: false,
            ..config
        };
        validate_config(&config).unwrap();
    }
}
