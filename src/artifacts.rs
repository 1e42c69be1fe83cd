//! Persistence of per-window artifacts
//!
//! Window directories embed the window index and a sanitized copy of the
//! lyric text; tensor artifacts are JSON-serialized ndarray values.

use crate::audio;
use crate::error::Result;
use ndarray::{Array2, Array3};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub const PRE_FOURIER_FILENAME: &str = "pre_fourier.json";
pub const FOURIER_FILENAME: &str = "fourier.json";
pub const COLLAPSED_FILENAME: &str = "collapsed.wav";

/// Longest sanitized lyric fragment embedded in a directory name
const MAX_NAME_LEN: usize = 64;

/// Reduce lyric text to a filesystem-safe fragment: alphanumerics kept,
/// whitespace runs collapsed to a single underscore, everything else
/// dropped, length-capped.
pub fn sanitize_lyrics(text: &str) -> String {
    let mut out = String::new();
    let mut pending_sep = false;
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else if ch.is_whitespace() {
            pending_sep = true;
        }
        if out.chars().count() >= MAX_NAME_LEN {
            break;
        }
    }
    out
}

/// Directory name for one kept window
pub fn window_dir_name(window_index: usize, lyrics: &str) -> String {
    format!("section_{:02}_{}", window_index, sanitize_lyrics(lyrics))
}

/// Full path of one window's directory under the song's output directory
pub fn window_dir(song_output_dir: &Path, window_index: usize, lyrics: &str) -> PathBuf {
    song_output_dir.join(window_dir_name(window_index, lyrics))
}

/// Write the channel-stacked raw tensor
pub fn write_pre_transform_tensor(path: &Path, tensor: &Array2<f32>) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, tensor)?;
    Ok(())
}

/// Write the DCT output
pub fn write_transformed_tensor(path: &Path, spectral: &Array3<f32>) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, spectral)?;
    Ok(())
}

/// Write the raw tensor back out as multi-channel audio, one WAV channel
/// per logical channel.
pub fn write_collapsed_audio(path: &Path, tensor: &Array2<f32>, sample_rate: u32) -> Result<()> {
    let (num_channels, window_len) = tensor.dim();
    let mut interleaved = Vec::with_capacity(num_channels * window_len);
    for frame_idx in 0..window_len {
        for channel in 0..num_channels {
            let value = tensor[[channel, frame_idx]];
            interleaved.push(value.clamp(i16::MIN as f32, i16::MAX as f32) as i16);
        }
    }
    audio::write_interleaved(path, &interleaved, num_channels as u16, sample_rate)
}
