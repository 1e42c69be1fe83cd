//! Lyric-Aligned Stem Segmentation
//!
//! Converts multi-track song recordings (audio stems plus a tempo/lyric
//! MIDI file) into fixed-duration, lyric-labeled, multi-channel audio
//! segments, with an optional block-DCT frequency representation of each
//! segment, persisted for a downstream training pipeline.

pub mod artifacts;
pub mod audio;
pub mod channels;
pub mod config;
pub mod error;
pub mod midi;
pub mod spectral;
pub mod stacker;
pub mod tempo;
pub mod timeline;

pub use channels::{ChannelMap, CollisionPolicy};
pub use config::Config;
pub use error::{Result as SegResult, SegError};
pub use timeline::LyricWindow;

use crate::audio::AudioWindowExtractor;
use crate::spectral::SpectralTransformer;
use crate::stacker::ChannelStacker;
use crate::tempo::TempoMap;
use std::path::{Path, PathBuf};

/// Outcome of one dataset run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Songs fully processed
    pub songs_processed: usize,
    /// Song directories without a MIDI file
    pub songs_skipped: usize,
    /// Songs aborted by a fatal per-song error
    pub songs_failed: usize,
    /// Window directories written across all songs
    pub windows_written: usize,
}

/// Main segmentation pipeline
pub struct SegmentPipeline {
    config: Config,
    channel_map: ChannelMap,
}

impl SegmentPipeline {
    /// Create a pipeline with the channel layout selected by the
    /// configuration (grouped or flat).
    pub fn new(config: Config) -> SegResult<Self> {
        let channel_map = if config.use_grouped_channels {
            ChannelMap::grouped()
        } else {
            ChannelMap::flat()
        };
        Self::with_channel_map(config, channel_map)
    }

    /// Create a pipeline with an explicit channel map, for callers whose
    /// stem set differs from the built-in one.
    pub fn with_channel_map(config: Config, channel_map: ChannelMap) -> SegResult<Self> {
        config::validate_config(&config)
            .map_err(|e| SegError::ConfigValidationFailed(e.to_string()))?;
        Ok(Self {
            config,
            channel_map,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process every song directory under `dataset_dir`.
    ///
    /// A song qualifies if it contains the configured MIDI file. A fatal
    /// error inside one song is logged and never aborts the batch; the
    /// per-song failure boundary is a hard requirement for multi-song runs.
    pub fn process_dataset(&self, dataset_dir: &Path) -> SegResult<RunSummary> {
        let output_root = self.output_root(dataset_dir);
        let mut summary = RunSummary::default();

        let mut song_dirs: Vec<PathBuf> = std::fs::read_dir(dataset_dir)
            .map_err(|e| {
                SegError::DatasetReadError(format!(
                    "failed to list dataset dir {}: {}",
                    dataset_dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        song_dirs.sort();

        for song_dir in song_dirs {
            if !song_dir.join(&self.config.midi_filename).exists() {
                summary.songs_skipped += 1;
                continue;
            }
            let song_name = song_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("working on song: {}", song_name);

            match self.process_song(&song_dir, &output_root.join(&song_name)) {
                Ok(windows_written) => {
                    summary.songs_processed += 1;
                    summary.windows_written += windows_written;
                }
                Err(e) => {
                    eprintln!("skipping song {}: {}", song_name, e);
                    summary.songs_failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Process a single song directory, writing one directory per kept
    /// window under `song_output_dir`. Returns the number of window
    /// directories that received artifacts.
    ///
    /// Error policy: `MalformedInput` and `ConfigurationMismatch` abort the
    /// whole song, including a bad sample rate on any one stem; only an
    /// out-of-range window is recoverable (that stem/window is skipped).
    pub fn process_song(&self, song_dir: &Path, song_output_dir: &Path) -> SegResult<usize> {
        let song_midi = midi::read_song_midi(song_dir.join(&self.config.midi_filename))?;
        let tempo_map = TempoMap::new(song_midi.tempo_events)?;
        let windows = timeline::build_windows(
            &song_midi.lyric_events,
            &tempo_map,
            song_midi.ticks_per_beat,
            self.config.window_duration,
        );

        let kept: Vec<(usize, &LyricWindow)> = windows
            .iter()
            .enumerate()
            .filter(|(_, window)| self.keep_window(window))
            .collect();
        if kept.is_empty() {
            return Ok(0);
        }

        let extractor = AudioWindowExtractor::new(self.config.window_len);
        let mut stacker = ChannelStacker::new(
            self.channel_map.num_channels(),
            self.config.window_len,
            self.config.channel_collision,
        );

        for (stem_id, stem_path) in self.discover_stems(song_dir)? {
            let stem = audio::load_stem(&stem_path)?;
            if stem.sample_rate != self.config.sample_rate {
                return Err(SegError::ConfigurationMismatch(format!(
                    "stem '{}' has sample rate {} Hz, expected {}",
                    stem_id, stem.sample_rate, self.config.sample_rate
                )));
            }
            let channel = self.channel_map.channel_for(&stem_id)?;

            for &(window_index, window) in &kept {
                let mono = match extractor.extract(&stem, window) {
                    Ok(mono) => mono,
                    // Window runs past this stem's last frame: the stem
                    // contributes nothing to this window.
                    Err(SegError::OutOfRange { .. }) => continue,
                    Err(e) => return Err(e),
                };

                if self.config.write_raw_stems {
                    let dir = artifacts::window_dir(song_output_dir, window_index, &window.text);
                    std::fs::create_dir_all(&dir)?;
                    audio::write_mono_clip(
                        dir.join(format!("{}.{}", stem_id, self.config.audio_extension)),
                        &mono,
                        self.config.sample_rate,
                    )?;
                }
                stacker.deposit(window_index, channel, &mono);
            }
        }

        // No stem reached any kept window; nothing to transform or write
        if stacker.is_empty() {
            return Ok(0);
        }

        let transformer = if self.config.write_transformed_tensor {
            Some(SpectralTransformer::new(self.config.window_len)?)
        } else {
            None
        };

        let mut windows_written = 0;
        for &(window_index, window) in &kept {
            let Some(tensor) = stacker.tensor(window_index) else {
                continue;
            };
            let dir = artifacts::window_dir(song_output_dir, window_index, &window.text);
            std::fs::create_dir_all(&dir)?;

            if self.config.write_pre_transform_tensor {
                artifacts::write_pre_transform_tensor(
                    &dir.join(artifacts::PRE_FOURIER_FILENAME),
                    tensor,
                )?;
            }
            if self.config.write_collapsed_audio {
                artifacts::write_collapsed_audio(
                    &dir.join(artifacts::COLLAPSED_FILENAME),
                    tensor,
                    self.config.sample_rate,
                )?;
            }
            if let Some(transformer) = &transformer {
                let spectral = transformer.transform(tensor)?;
                artifacts::write_transformed_tensor(
                    &dir.join(artifacts::FOURIER_FILENAME),
                    &spectral,
                )?;
            }
            windows_written += 1;
        }

        Ok(windows_written)
    }

    /// Segment output root: configured directory, or a sibling of the
    /// dataset directory.
    fn output_root(&self, dataset_dir: &Path) -> PathBuf {
        self.config
            .segment_output_dir
            .clone()
            .unwrap_or_else(|| dataset_dir.join("..").join("audio_segments"))
    }

    fn keep_window(&self, window: &LyricWindow) -> bool {
        !self.config.ignore_short_windows
            || window.text.trim().chars().count() >= self.config.min_lyric_len
    }

    /// Stem files in the song directory: configured audio extension and a
    /// basename the channel map knows. Anything else is silently excluded.
    fn discover_stems(&self, song_dir: &Path) -> SegResult<Vec<(String, PathBuf)>> {
        let mut stems: Vec<(String, PathBuf)> = std::fs::read_dir(song_dir)
            .map_err(|e| {
                SegError::DatasetReadError(format!(
                    "failed to list song dir {}: {}",
                    song_dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.config.audio_extension))
            })
            .filter_map(|path| {
                let stem_id = path.file_stem()?.to_str()?.to_string();
                self.channel_map
                    .contains(&stem_id)
                    .then_some((stem_id, path))
            })
            .collect();
        // Sorted stem order keeps the channel-collision outcome deterministic
        stems.sort();
        Ok(stems)
    }
}
