//! Error types for the segmentation pipeline

use std::fmt;

/// Custom error type for stem segmentation
#[derive(Debug, Clone)]
pub enum SegError {
    /// E001: Malformed MIDI input (missing lyric track, no tempo event at start)
    MalformedInput(String),
    /// E002: Configuration mismatch (sample rate disagreement, non-square window length)
    ConfigurationMismatch(String),
    /// E003: Window extends past the end of a stem's samples
    OutOfRange {
        start_sample: usize,
        needed: usize,
        available: usize,
    },
    /// E004: Stem identifier with no channel assignment
    UnknownStem(String),
    /// E005: Configuration validation failed
    ConfigValidationFailed(String),
    /// E006: Audio file I/O error
    AudioFileError(String),
    /// E007: MIDI file I/O error
    MidiFileError(String),
    /// E008: Artifact write error
    ArtifactWriteError(String),
    /// E009: Dataset or song directory could not be read
    DatasetReadError(String),
}

impl fmt::Display for SegError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegError::MalformedInput(msg) => {
                write!(f, "E001: Malformed MIDI input - {}", msg)
            }
            SegError::ConfigurationMismatch(msg) => {
                write!(f, "E002: Configuration mismatch - {}", msg)
            }
            SegError::OutOfRange {
                start_sample,
                needed,
                available,
            } => {
                write!(
                    f,
                    "E003: Window out of range (start sample {}, needs {} frames, stem has {})",
                    start_sample, needed, available
                )
            }
            SegError::UnknownStem(stem) => {
                write!(f, "E004: Unknown stem '{}'", stem)
            }
            SegError::ConfigValidationFailed(msg) => {
                write!(f, "E005: Configuration validation failed - {}", msg)
            }
            SegError::AudioFileError(msg) => {
                write!(f, "E006: Audio file I/O error - {}", msg)
            }
            SegError::MidiFileError(msg) => {
                write!(f, "E007: MIDI file I/O error - {}", msg)
            }
            SegError::ArtifactWriteError(msg) => {
                write!(f, "E008: Artifact write error - {}", msg)
            }
            SegError::DatasetReadError(msg) => {
                write!(f, "E009: Dataset directory error - {}", msg)
            }
        }
    }
}

impl std::error::Error for SegError {}

// From implementations for common error types
impl From<std::io::Error> for SegError {
    fn from(err: std::io::Error) -> Self {
        SegError::ArtifactWriteError(format!("File I/O error: {}", err))
    }
}

impl From<hound::Error> for SegError {
    fn from(err: hound::Error) -> Self {
        SegError::AudioFileError(err.to_string())
    }
}

impl From<serde_json::Error> for SegError {
    fn from(err: serde_json::Error) -> Self {
        SegError::ArtifactWriteError(format!("JSON serialization error: {}", err))
    }
}

/// Result type alias for segmentation operations
pub type Result<T> = std::result::Result<T, SegError>;
