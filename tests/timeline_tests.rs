//! Validation tests for the lyric timeline builder

use stems2seg::tempo::{TempoEvent, TempoMap};
use stems2seg::timeline::{build_windows, clean_lyrics, LyricEvent};

fn constant_tempo(microseconds_per_beat: u32) -> TempoMap {
    TempoMap::new(vec![TempoEvent {
        tick_position: 0,
        microseconds_per_beat,
    }])
    .unwrap()
}

/// Alternating lyric/non-lyric events, 0.5 s apart at 120 BPM
fn alternating_events(tokens: &[&str]) -> Vec<LyricEvent> {
    let mut events = Vec::new();
    for token in tokens {
        events.push(LyricEvent {
            tick_delta: 480,
            text: token.to_string(),
            is_lyric: true,
        });
        events.push(LyricEvent {
            tick_delta: 480,
            text: String::new(),
            is_lyric: false,
        });
    }
    events
}

#[test]
fn test_window_count_is_floor_of_track_duration() {
    let tokens = [
        "twin-", "kle", "twin-", "kle", "lit-", "tle", "star", "how", "I", "won-", "der", "what",
    ];
    let tempo = constant_tempo(500_000);
    let events = alternating_events(&tokens);

    // 24 events * 0.5 s = 12 s of lyric track, 3 s windows
    let windows = build_windows(&events, &tempo, 480, 3.0);
    assert_eq!(windows.len(), 4);

    // One extra lyric event leaves a 0.5 s partial window, which is dropped
    let mut extended = events.clone();
    extended.push(LyricEvent {
        tick_delta: 480,
        text: "you".to_string(),
        is_lyric: true,
    });
    let windows = build_windows(&extended, &tempo, 480, 3.0);
    assert_eq!(windows.len(), 4);
}

#[test]
fn test_concatenated_text_reproduces_the_stream_minus_markers() {
    let tokens = [
        "twin-", "kle", "twin-", "kle", "lit-", "tle", "star", "how", "I", "won-", "der", "what",
    ];
    let tempo = constant_tempo(500_000);
    let windows = build_windows(&alternating_events(&tokens), &tempo, 480, 3.0);

    let concatenated: String = windows.iter().map(|w| w.text.as_str()).collect();
    let mut full_stream = String::new();
    for token in tokens {
        full_stream.push_str(token);
        full_stream.push(' ');
    }
    assert_eq!(concatenated, clean_lyrics(&full_stream));
    assert!(concatenated.starts_with("twinkle twinkle little star"));
}

#[test]
fn test_window_starts_chain_from_accumulated_song_time() {
    let tempo = constant_tempo(500_000);
    // 0.7 s per event never divides the 2 s grid evenly
    let events: Vec<LyricEvent> = (0..20)
        .map(|_| LyricEvent {
            tick_delta: 672,
            text: "ah".to_string(),
            is_lyric: true,
        })
        .collect();
    let windows = build_windows(&events, &tempo, 480, 2.0);
    assert!(windows.len() >= 3);

    let mut song_elapsed = 0.0;
    let mut events_consumed = 0;
    for window in &windows {
        assert!((window.start_time - song_elapsed).abs() < 1e-9);
        assert!((window.end_time - (window.start_time + 2.0)).abs() < 1e-9);
        // Advance over events until this window closed
        let mut window_elapsed = 0.0;
        while window_elapsed < 2.0 {
            window_elapsed += 0.7;
            song_elapsed += 0.7;
            events_consumed += 1;
        }
    }
    assert!(events_consumed <= events.len());
}
