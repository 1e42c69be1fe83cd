//! Piecewise-constant tempo lookup over MIDI ticks

use crate::error::{Result, SegError};

/// A tempo change at an absolute tick position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoEvent {
    /// Cumulative tick position of the change
    pub tick_position: u64,
    /// Tempo in effect from this tick on
    pub microseconds_per_beat: u32,
}

/// Step function from cumulative tick count to tempo (µs per beat)
#[derive(Debug, Clone)]
pub struct TempoMap {
    events: Vec<TempoEvent>,
}

impl TempoMap {
    /// Build a tempo map from tempo changes ordered by tick position.
    ///
    /// The file format guarantees a tempo event at tick 0; without it the
    /// tick-to-seconds conversion is undefined for the opening of the song.
    pub fn new(events: Vec<TempoEvent>) -> Result<Self> {
        match events.first() {
            Some(first) if first.tick_position == 0 => {}
            _ => {
                return Err(SegError::MalformedInput(
                    "tempo track carries no tempo event at tick 0".to_string(),
                ))
            }
        }
        debug_assert!(events
            .windows(2)
            .all(|w| w[0].tick_position <= w[1].tick_position));
        Ok(Self { events })
    }

    /// Tempo (µs per beat) in effect at the given cumulative tick count:
    /// the value of the latest event whose position is <= `tick`.
    pub fn tempo_at(&self, tick: u64) -> u32 {
        let idx = self.events.partition_point(|e| e.tick_position <= tick);
        self.events[idx - 1].microseconds_per_beat
    }

    /// Convert a tick delta ending at `at_tick` to seconds under the tempo
    /// in effect there.
    pub fn ticks_to_seconds(&self, ticks: u32, at_tick: u64, ticks_per_beat: u16) -> f64 {
        ticks as f64 * (self.tempo_at(at_tick) as f64 / 1_000_000.0) / ticks_per_beat as f64
    }
}
