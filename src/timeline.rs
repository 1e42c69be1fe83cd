//! Tempo-aware lyric timeline builder
//!
//! Walks the lyric event stream in event order, converting accumulated tick
//! deltas to wall-clock seconds under the piecewise-constant tempo, and
//! groups lyric tokens into fixed-duration windows.

use crate::tempo::TempoMap;

/// One event from the lyric track, MIDI delta-time convention
#[derive(Debug, Clone)]
pub struct LyricEvent {
    /// Ticks since the previous event on the same track
    pub tick_delta: u32,
    /// Lyric text; meaningful only when `is_lyric` is set
    pub text: String,
    /// Whether this event carries a lyric token
    pub is_lyric: bool,
}

/// A fixed-duration time window labeled with the lyrics sung inside it
#[derive(Debug, Clone, PartialEq)]
pub struct LyricWindow {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

/// Syllable continuation/annotation markers used by the lyric track format.
/// They mark hyphenation and pitch annotations, not literal lyric text.
const LYRIC_MARKERS: [&str; 6] = ["- ", "+ ", " +", " -", "#", "="];

/// Strip notation markers from accumulated lyric text
pub fn clean_lyrics(raw: &str) -> String {
    let mut text = raw.to_string();
    for marker in LYRIC_MARKERS {
        text = text.replace(marker, "");
    }
    text
}

/// Cut the lyric stream into fixed-duration windows.
///
/// Windows are contiguous in song time: each window's start is the
/// tick-derived song-elapsed value at the moment the previous window closed,
/// while its end is `start + window_duration`. The end is deliberately not
/// the last lyric timestamp, so words crossing the boundary are truncated
/// mid-word; that artifact is part of the dataset contract. A trailing
/// partial window is dropped, never emitted.
pub fn build_windows(
    lyric_events: &[LyricEvent],
    tempo_map: &TempoMap,
    ticks_per_beat: u16,
    window_duration: f64,
) -> Vec<LyricWindow> {
    let mut windows = Vec::new();
    let mut tick_position: u64 = 0;
    let mut window_elapsed = 0.0;
    let mut song_elapsed = 0.0;
    let mut window_start = 0.0;
    let mut text = String::new();

    for event in lyric_events {
        tick_position += event.tick_delta as u64;
        let delta_secs =
            tempo_map.ticks_to_seconds(event.tick_delta, tick_position, ticks_per_beat);
        window_elapsed += delta_secs;
        song_elapsed += delta_secs;

        if event.is_lyric {
            text.push_str(&event.text);
            text.push(' ');
        }

        if window_elapsed >= window_duration {
            windows.push(LyricWindow {
                start_time: window_start,
                end_time: window_start + window_duration,
                text: clean_lyrics(&text),
            });
            text.clear();
            window_elapsed = 0.0;
            // Drift between tick-derived time and the nominal grid is
            // carried forward, not corrected.
            window_start = song_elapsed;
        }
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tempo::{TempoEvent, TempoMap};

    fn constant_tempo(microseconds_per_beat: u32) -> TempoMap {
        TempoMap::new(vec![TempoEvent {
            tick_position: 0,
            microseconds_per_beat,
        }])
        .unwrap()
    }

    fn lyric(tick_delta: u32, text: &str) -> LyricEvent {
        LyricEvent {
            tick_delta,
            text: text.to_string(),
            is_lyric: true,
        }
    }

    fn non_lyric(tick_delta: u32) -> LyricEvent {
        LyricEvent {
            tick_delta,
            text: String::new(),
            is_lyric: false,
        }
    }

    #[test]
    fn test_clean_lyrics_strips_markers() {
        assert_eq!(clean_lyrics("hel- lo= wor#ld +"), "hello world");
        assert_eq!(clean_lyrics("plain words "), "plain words ");
    }

    #[test]
    fn test_trailing_partial_window_is_dropped() {
        // 120 BPM, 480 tpb: each 480-tick delta is 0.5 s
        let tempo = constant_tempo(500_000);
        let events: Vec<_> = (0..5).map(|_| lyric(480, "la")).collect();
        // 2.5 s of lyric track against 2 s windows: one full window, the
        // 0.5 s remainder is dropped
        let windows = build_windows(&events, &tempo, 480, 2.0);
        assert_eq!(windows.len(), 1);
    }

    #[test]
    fn test_windows_are_contiguous_in_song_time() {
        let tempo = constant_tempo(500_000);
        // Deltas of 0.75 s overshoot the 2 s grid, so window ends drift
        let events: Vec<_> = (0..12).map(|_| lyric(720, "da")).collect();
        let windows = build_windows(&events, &tempo, 480, 2.0);
        assert!(windows.len() >= 2);
        for pair in windows.windows(2) {
            // The next window opens where the song cursor actually was, not
            // at the previous window's nominal end.
            assert!(pair[1].start_time >= pair[0].end_time - 1e-9);
        }
        // First close happens at 2.25 s of accumulated event time
        assert!((windows[0].end_time - 2.0).abs() < 1e-9);
        assert!((windows[1].start_time - 2.25).abs() < 1e-9);
    }

    #[test]
    fn test_non_lyric_events_advance_time_but_not_text() {
        let tempo = constant_tempo(500_000);
        let events = vec![
            lyric(480, "one"),
            non_lyric(480),
            lyric(480, "two"),
            non_lyric(480),
        ];
        let windows = build_windows(&events, &tempo, 480, 2.0);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].text, "one two ");
    }

    #[test]
    fn test_tempo_change_rescales_deltas() {
        // 500_000 µs/beat up to tick 961, then twice as fast. The change
        // sits between delta end positions, so no delta straddles it.
        let tempo = TempoMap::new(vec![
            TempoEvent {
                tick_position: 0,
                microseconds_per_beat: 500_000,
            },
            TempoEvent {
                tick_position: 961,
                microseconds_per_beat: 250_000,
            },
        ])
        .unwrap();
        // Two slow beats (1.0 s) then four fast beats (1.0 s)
        let events: Vec<_> = (0..6).map(|_| lyric(480, "x")).collect();
        let windows = build_windows(&events, &tempo, 480, 2.0);
        assert_eq!(windows.len(), 1);
        assert!((windows[0].end_time - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_delta_ending_on_tempo_change_uses_new_tempo() {
        // Each delta converts under the tempo at its end position, so the
        // delta landing exactly on tick 960 is already a fast beat.
        let tempo = TempoMap::new(vec![
            TempoEvent {
                tick_position: 0,
                microseconds_per_beat: 500_000,
            },
            TempoEvent {
                tick_position: 960,
                microseconds_per_beat: 250_000,
            },
        ])
        .unwrap();
        // One slow beat (0.5 s) then five fast beats (1.25 s): 1.75 s total,
        // short of the 2 s window
        let events: Vec<_> = (0..6).map(|_| lyric(480, "x")).collect();
        assert!(build_windows(&events, &tempo, 480, 2.0).is_empty());

        // A seventh fast beat reaches 2.0 s exactly and closes the window
        let events: Vec<_> = (0..7).map(|_| lyric(480, "x")).collect();
        let windows = build_windows(&events, &tempo, 480, 2.0);
        assert_eq!(windows.len(), 1);
        assert!((windows[0].end_time - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_text_may_be_empty() {
        let tempo = constant_tempo(500_000);
        let events: Vec<_> = (0..4).map(|_| non_lyric(480)).collect();
        let windows = build_windows(&events, &tempo, 480, 2.0);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].text, "");
    }
}
