/// An event pinned to an absolute tick of its track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub tick: u64,
    pub event: Event,
}

impl TimedEvent {
    pub fn new(tick: u64, event: Event) -> Self {
        Self { tick, event }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Raw device message, transmitted verbatim.
    Performance(Vec<u8>),
    /// Tempo change in microseconds per quarter note.
    Tempo(u32),
    /// Any other meta event. Occupies a slot in its track but produces no output.
    Meta,
}
