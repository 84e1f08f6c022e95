use std::time::Duration;

/// Microseconds per quarter note assumed until the song says otherwise (120 BPM).
pub const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

/// The live tempo of a song. A new tempo event replaces it wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tempo {
    micros_per_beat: u32,
}

impl Default for Tempo {
    fn default() -> Self {
        Self::from_micros_per_beat(DEFAULT_MICROS_PER_BEAT)
    }
}

impl Tempo {
    pub fn from_micros_per_beat(micros_per_beat: u32) -> Self {
        Self { micros_per_beat }
    }

    /// Decodes the three big-endian bytes of a set-tempo meta event.
    pub fn from_meta_payload(payload: [u8; 3]) -> Self {
        let micros_per_beat =
            ((payload[0] as u32) << 16) | ((payload[1] as u32) << 8) | payload[2] as u32;
        Self { micros_per_beat }
    }

    pub fn micros_per_beat(&self) -> u32 {
        self.micros_per_beat
    }

    pub fn bpm(&self) -> f64 {
        60_000_000.0 / self.micros_per_beat as f64
    }

    /// Length of a single tick at this tempo for the given time division.
    pub fn tick_length(&self, ticks_per_beat: u16) -> TickLength {
        TickLength::new(self.micros_per_beat as u64 * 1_000, ticks_per_beat as u64)
    }
}

/// A tick duration kept as the exact fraction `nanos_per_beat / ticks_per_beat`
/// nanoseconds, so divisions like 480 do not round on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickLength {
    nanos_per_beat: u64,
    ticks_per_beat: u64,
}

impl TickLength {
    pub fn new(nanos_per_beat: u64, ticks_per_beat: u64) -> Self {
        Self {
            nanos_per_beat,
            ticks_per_beat: ticks_per_beat.max(1),
        }
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self::new(duration.as_nanos() as u64, 1)
    }

    pub fn numerator(&self) -> u64 {
        self.nanos_per_beat
    }

    pub fn denominator(&self) -> u64 {
        self.ticks_per_beat
    }

    /// Rounded down to the nanosecond.
    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.nanos_per_beat / self.ticks_per_beat)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.nanos_per_beat as f64 / self.ticks_per_beat as f64 / 1e9
    }
}

impl From<Duration> for TickLength {
    fn from(duration: Duration) -> Self {
        Self::from_duration(duration)
    }
}
