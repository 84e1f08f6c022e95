use std::fs;
use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::error::{Error, Result};
use crate::events::{Event, TimedEvent};

/// One track of a song, with delta times already resolved to absolute ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    events: Vec<TimedEvent>,
}

impl Track {
    /// `events` must be sorted by tick.
    pub fn new(events: Vec<TimedEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.events.last().map(|e| e.tick)
    }
}

/// A fully loaded MIDI song. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    ticks_per_beat: u16,
    tracks: Vec<Track>,
}

impl Song {
    pub fn new(ticks_per_beat: u16, tracks: Vec<Track>) -> Result<Self> {
        if ticks_per_beat == 0 {
            return Err(Error::ZeroDivision);
        }
        Ok(Self {
            ticks_per_beat,
            tracks,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data)
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;
        Self::from_smf(&smf)
    }

    pub fn from_smf(smf: &Smf) -> Result<Self> {
        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int(),
            Timing::Timecode(_, _) => return Err(Error::TimecodeDivision),
        };

        let tracks = smf
            .tracks
            .iter()
            .map(|track| {
                let mut tick: u64 = 0;
                let events = track
                    .iter()
                    .map(|event| {
                        tick += event.delta.as_int() as u64;
                        TimedEvent::new(tick, convert_event(&event.kind))
                    })
                    .collect();
                Track::new(events)
            })
            .collect();

        Self::new(ticks_per_beat, tracks)
    }

    pub fn ticks_per_beat(&self) -> u16 {
        self.ticks_per_beat
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }

    /// Tick of the latest event across all tracks.
    pub fn last_tick(&self) -> Option<u64> {
        self.tracks.iter().filter_map(Track::last_tick).max()
    }
}

fn convert_event(kind: &TrackEventKind) -> Event {
    match kind {
        TrackEventKind::Midi { channel, message } => {
            Event::Performance(encode_midi(channel.as_int(), message))
        }
        TrackEventKind::SysEx(data) => {
            let mut bytes = Vec::with_capacity(data.len() + 1);
            bytes.push(0xF0);
            bytes.extend_from_slice(data);
            Event::Performance(bytes)
        }
        TrackEventKind::Escape(data) => Event::Performance(data.to_vec()),
        TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => Event::Tempo(tempo.as_int()),
        TrackEventKind::Meta(_) => Event::Meta,
    }
}

/// Encodes a channel message with its status byte. Running status is never used.
fn encode_midi(channel: u8, message: &MidiMessage) -> Vec<u8> {
    match *message {
        MidiMessage::NoteOff { key, vel } => vec![0x80 | channel, key.as_int(), vel.as_int()],
        MidiMessage::NoteOn { key, vel } => vec![0x90 | channel, key.as_int(), vel.as_int()],
        MidiMessage::Aftertouch { key, vel } => vec![0xA0 | channel, key.as_int(), vel.as_int()],
        MidiMessage::Controller { controller, value } => {
            vec![0xB0 | channel, controller.as_int(), value.as_int()]
        }
        MidiMessage::ProgramChange { program } => vec![0xC0 | channel, program.as_int()],
        MidiMessage::ChannelAftertouch { vel } => vec![0xD0 | channel, vel.as_int()],
        MidiMessage::PitchBend { bend } => {
            let value = bend.0.as_int();
            vec![
                0xE0 | channel,
                (value & 0x7F) as u8,
                ((value >> 7) & 0x7F) as u8,
            ]
        }
    }
}
