//! The sequencer loop.
//!
//! Every iteration handles one tick of the song: it drains the events that
//! are due across all tracks, then waits on the [`TimeBarrier`] for the next
//! tick boundary. Tempo events only change the length of the waits that
//! follow them.

use crossbeam::channel::Receiver;
use tracing::{debug, info, trace};

use crate::error::{Result, TransportError};
use crate::events::Event;
use crate::output::OutputSink;
use crate::song::Song;
use crate::timing::{Clock, Tempo, TimeBarrier, TrackCursors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Before the first wait.
    Priming,
    Running,
    /// Every track is exhausted. Terminal.
    Drained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Finished { iterations: u64 },
    Interrupted { tick: u64 },
}

pub struct Sequencer<'s, C: Clock> {
    ticks_per_beat: u16,
    cursors: TrackCursors<'s>,
    timer: TimeBarrier<C>,
    tempo: Tempo,
    tick: u64,
    state: SequencerState,
    stop_rx: Option<Receiver<()>>,
}

impl<'s, C: Clock> Sequencer<'s, C> {
    pub fn new(song: &'s Song, mut timer: TimeBarrier<C>) -> Self {
        let tempo = Tempo::default();
        timer.set_interval(tempo.tick_length(song.ticks_per_beat()));
        Self {
            ticks_per_beat: song.ticks_per_beat(),
            cursors: TrackCursors::new(song.tracks()),
            timer,
            tempo,
            tick: 0,
            state: SequencerState::Priming,
            stop_rx: None,
        }
    }

    /// Ends playback early once anything arrives on `stop_rx`.
    pub fn with_stop_signal(mut self, stop_rx: Receiver<()>) -> Self {
        self.stop_rx = Some(stop_rx);
        self
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn timer(&self) -> &TimeBarrier<C> {
        &self.timer
    }

    pub fn cursors(&self) -> &TrackCursors<'s> {
        &self.cursors
    }

    /// Runs one iteration of the loop at the current tick.
    ///
    /// Sends every performance event that is due, applies tempo changes, and
    /// unless the song is drained, advances the tick and blocks until its
    /// boundary.
    pub fn step<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> Result<SequencerState> {
        if self.state == SequencerState::Drained {
            return Ok(self.state);
        }
        self.timer.start();
        trace!(tick = self.tick, progress = %self.cursors.progress());

        for (track, timed) in self.cursors.due_events(self.tick) {
            match &timed.event {
                Event::Performance(bytes) => {
                    sink.send(bytes)?;
                    debug!(tick = self.tick, track, "{}", hex(bytes));
                }
                Event::Tempo(micros_per_beat) => {
                    self.tempo = Tempo::from_micros_per_beat(*micros_per_beat);
                    self.timer
                        .set_interval(self.tempo.tick_length(self.ticks_per_beat));
                    info!("Set to {:.2} BPM", self.tempo.bpm());
                }
                Event::Meta => {}
            }
        }

        if self.cursors.all_exhausted() {
            self.state = SequencerState::Drained;
            self.timer.stop();
            return Ok(self.state);
        }

        self.tick += 1;
        self.state = SequencerState::Running;
        self.timer.wait();
        Ok(self.state)
    }

    /// Plays the song to the end, or until a stop is requested.
    pub fn run<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> Result<PlaybackOutcome> {
        let outcome = self.play(sink);
        self.timer.stop();
        outcome
    }

    fn play<S: OutputSink + ?Sized>(&mut self, sink: &mut S) -> Result<PlaybackOutcome> {
        loop {
            if self.stop_requested() {
                info!(tick = self.tick, "stop requested, silencing device");
                all_notes_off(sink)?;
                return Ok(PlaybackOutcome::Interrupted { tick: self.tick });
            }
            if self.step(sink)? == SequencerState::Drained {
                return Ok(PlaybackOutcome::Finished {
                    iterations: self.tick + 1,
                });
            }
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop_rx
            .as_ref()
            .is_some_and(|rx| rx.try_recv().is_ok())
    }
}

/// Sends "All Notes Off" (CC 123) on every channel.
pub fn all_notes_off<S: OutputSink + ?Sized>(sink: &mut S) -> Result<(), TransportError> {
    for channel in 0..16u8 {
        sink.send(&[0xB0 | channel, 123, 0])?;
    }
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
