//! MIDI input: tempo track and lyric track extraction
//!
//! The tempo map is always read from track 0, whose first event must be a
//! tempo change. The lyric track is selected by its literal name.

use crate::error::{Result, SegError};
use crate::tempo::TempoEvent;
use crate::timeline::LyricEvent;
use midly::{MetaMessage, Smf, TrackEvent, TrackEventKind};
use std::path::Path;

/// Track name carrying the lyric events
pub const LYRIC_TRACK_NAME: &str = "PART VOCALS";

/// Tempo and lyric material extracted from one song's MIDI file
#[derive(Debug, Clone)]
pub struct SongMidi {
    pub ticks_per_beat: u16,
    pub tempo_events: Vec<TempoEvent>,
    pub lyric_events: Vec<LyricEvent>,
}

/// Read the tempo track and the `PART VOCALS` track from a MIDI file.
pub fn read_song_midi<P: AsRef<Path>>(path: P) -> Result<SongMidi> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| SegError::MidiFileError(format!("failed to read {}: {}", path.display(), e)))?;
    let smf = Smf::parse(&data)
        .map_err(|e| SegError::MidiFileError(format!("failed to parse {}: {}", path.display(), e)))?;

    let ticks_per_beat = match smf.header.timing {
        midly::Timing::Metrical(tpb) => tpb.as_int(),
        midly::Timing::Timecode(..) => {
            return Err(SegError::MalformedInput(
                "SMPTE timecode timing is not supported".to_string(),
            ))
        }
    };

    let tempo_track = smf
        .tracks
        .first()
        .ok_or_else(|| SegError::MalformedInput("MIDI file has no tracks".to_string()))?;
    let tempo_events = collect_tempo_events(tempo_track)?;

    let lyric_track = smf
        .tracks
        .iter()
        .find(|track| track_name(track).as_deref() == Some(LYRIC_TRACK_NAME))
        .ok_or_else(|| {
            SegError::MalformedInput(format!("no '{}' track in MIDI file", LYRIC_TRACK_NAME))
        })?;
    let lyric_events = collect_lyric_events(lyric_track);

    Ok(SongMidi {
        ticks_per_beat,
        tempo_events,
        lyric_events,
    })
}

fn track_name(track: &[TrackEvent]) -> Option<String> {
    track.iter().find_map(|event| match &event.kind {
        TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
            Some(String::from_utf8_lossy(name).into_owned())
        }
        _ => None,
    })
}

/// Walk the tempo track, accumulating absolute tick positions of tempo
/// changes. Non-tempo events advance the tick position but are otherwise
/// skipped.
fn collect_tempo_events(track: &[TrackEvent]) -> Result<Vec<TempoEvent>> {
    match track.first().map(|event| &event.kind) {
        Some(TrackEventKind::Meta(MetaMessage::Tempo(_))) => {}
        _ => {
            return Err(SegError::MalformedInput(
                "tempo track does not start with a tempo event".to_string(),
            ))
        }
    }

    let mut events = Vec::new();
    let mut tick_position: u64 = 0;
    for event in track {
        tick_position += event.delta.as_int() as u64;
        if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = event.kind {
            events.push(TempoEvent {
                tick_position,
                microseconds_per_beat: tempo.as_int(),
            });
        }
    }
    Ok(events)
}

/// Flatten a lyric track into delta-time events. Every event keeps its
/// delta; only `Lyric` meta events contribute text.
fn collect_lyric_events(track: &[TrackEvent]) -> Vec<LyricEvent> {
    track
        .iter()
        .map(|event| match &event.kind {
            TrackEventKind::Meta(MetaMessage::Lyric(text)) => LyricEvent {
                tick_delta: event.delta.as_int(),
                text: String::from_utf8_lossy(text).into_owned(),
                is_lyric: true,
            },
            _ => LyricEvent {
                tick_delta: event.delta.as_int(),
                text: String::new(),
                is_lyric: false,
            },
        })
        .collect()
}
