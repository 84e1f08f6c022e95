use crate::events::TimedEvent;
use crate::song::Track;

/// Read positions into every track of a song.
///
/// Each cursor only moves forward, so every event is handed out exactly once.
#[derive(Debug)]
pub struct TrackCursors<'s> {
    tracks: &'s [Track],
    positions: Vec<usize>,
}

impl<'s> TrackCursors<'s> {
    pub fn new(tracks: &'s [Track]) -> Self {
        Self {
            tracks,
            positions: vec![0; tracks.len()],
        }
    }

    /// Consumes the next event of `track` if it is due at `tick`.
    pub fn next_due(&mut self, track: usize, tick: u64) -> Option<&'s TimedEvent> {
        let events = self.tracks.get(track)?.events();
        let position = self.positions.get_mut(track)?;
        let event = events.get(*position).filter(|e| e.tick <= tick)?;
        *position += 1;
        Some(event)
    }

    /// All events due at `tick`, ordered by track index, then by track order.
    pub fn due_events(&mut self, tick: u64) -> DueEvents<'_, 's> {
        DueEvents {
            cursors: self,
            tick,
            track: 0,
        }
    }

    pub fn position(&self, track: usize) -> usize {
        self.positions.get(track).copied().unwrap_or(0)
    }

    pub fn is_exhausted(&self, track: usize) -> bool {
        match self.tracks.get(track) {
            Some(t) => self.positions[track] >= t.len(),
            None => true,
        }
    }

    pub fn all_exhausted(&self) -> bool {
        (0..self.tracks.len()).all(|track| self.is_exhausted(track))
    }

    /// `position/len` of every track, for progress logging.
    pub fn progress(&self) -> String {
        self.tracks
            .iter()
            .zip(&self.positions)
            .map(|(track, position)| format!("{}/{}", position, track.len()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct DueEvents<'c, 's> {
    cursors: &'c mut TrackCursors<'s>,
    tick: u64,
    track: usize,
}

impl<'s> Iterator for DueEvents<'_, 's> {
    /// Track index and the event.
    type Item = (usize, &'s TimedEvent);

    fn next(&mut self) -> Option<Self::Item> {
        while self.track < self.cursors.tracks.len() {
            if let Some(event) = self.cursors.next_due(self.track, self.tick) {
                return Some((self.track, event));
            }
            self.track += 1;
        }
        None
    }
}
