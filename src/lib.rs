//! Streams Standard MIDI Files to a synthesizer over a serial link.
//!
//! The core is the [`Sequencer`]: it merges all tracks of a [`Song`] into one
//! tick stream, follows tempo changes, and paces itself with a drift-corrected
//! [`TimeBarrier`](timing::TimeBarrier) so that long songs keep their timing.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod output;
pub mod patch;
pub mod song;
pub mod timing;

pub use config::{Config, SerialConfig};
pub use engine::{PlaybackOutcome, Sequencer, SequencerState, all_notes_off};
pub use error::{Error, Result, TransportError};
pub use events::{Event, TimedEvent};
pub use output::{OutputSink, SerialSink, available_ports};
pub use patch::{PATCH_SIZE, Patch};
pub use song::{Song, Track};
