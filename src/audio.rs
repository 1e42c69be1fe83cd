//! Stem audio I/O and window extraction

use crate::error::{Result, SegError};
use crate::timeline::LyricWindow;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// A stem's raw sample buffer: interleaved i16 frames plus a sample rate
#[derive(Debug, Clone)]
pub struct StemAudio {
    /// Interleaved samples, `channels` per frame
    pub samples: Vec<i16>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl StemAudio {
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }
}

/// Load a stem file into an interleaved i16 buffer
pub fn load_stem<P: AsRef<Path>>(path: P) -> Result<StemAudio> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path).map_err(|e| {
        SegError::AudioFileError(format!("failed to open {}: {}", path.display(), e))
    })?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample > 16 {
        return Err(SegError::AudioFileError(format!(
            "{}: expected 16-bit integer samples, got {}-bit {:?}",
            path.display(),
            spec.bits_per_sample,
            spec.sample_format
        )));
    }
    if spec.channels == 0 {
        return Err(SegError::AudioFileError(format!(
            "{}: zero channels",
            path.display()
        )));
    }

    let samples = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<i16>, _>>()
        .map_err(|e| {
            SegError::AudioFileError(format!("failed to read {}: {}", path.display(), e))
        })?;

    Ok(StemAudio {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

/// Write a mono i16 clip
pub fn write_mono_clip<P: AsRef<Path>>(path: P, samples: &[i16], sample_rate: u32) -> Result<()> {
    write_interleaved(path, samples, 1, sample_rate)
}

/// Write interleaved i16 frames with the given channel count
pub fn write_interleaved<P: AsRef<Path>>(
    path: P,
    samples: &[i16],
    channels: u16,
    sample_rate: u32,
) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Slices fixed-length mono windows out of stem buffers.
///
/// The window length is a fixed constant of the run, never re-derived from
/// `end_time`; this decouples segment shape from any drift in the timeline's
/// end timestamps.
#[derive(Debug, Clone, Copy)]
pub struct AudioWindowExtractor {
    window_len: usize,
}

impl AudioWindowExtractor {
    pub fn new(window_len: usize) -> Self {
        Self { window_len }
    }

    /// Extract exactly `window_len` mono samples covering `window`.
    ///
    /// The start index is `floor(start_time * sample_rate)`. Multi-channel
    /// frames are downmixed by arithmetic mean, truncated to i16. Returns
    /// `OutOfRange` when the window extends past the stem's last frame;
    /// policy there is the caller's (the pipeline skips the stem/window).
    pub fn extract(&self, stem: &StemAudio, window: &LyricWindow) -> Result<Vec<i16>> {
        let start_sample = (window.start_time * stem.sample_rate as f64).floor() as usize;
        let needed = self.window_len;
        let available = stem.num_frames();
        if start_sample + needed > available {
            return Err(SegError::OutOfRange {
                start_sample,
                needed,
                available,
            });
        }

        let channels = stem.channels as usize;
        let mut mono = Vec::with_capacity(needed);
        for frame_idx in start_sample..start_sample + needed {
            let frame = &stem.samples[frame_idx * channels..(frame_idx + 1) * channels];
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            mono.push((sum / channels as i32) as i16);
        }
        Ok(mono)
    }
}
