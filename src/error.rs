use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse MIDI file: {0}")]
    Parse(#[from] midly::Error),

    #[error("timecode-based MIDI files are not supported")]
    TimecodeDivision,

    #[error("time division must be a positive number of ticks per beat")]
    ZeroDivision,

    #[error("invalid patch file size: expected {expected:#x} bytes, got {actual:#x}")]
    PatchSize { expected: usize, actual: usize },

    #[error("invalid config: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),
}

/// Failures of the byte sink. Every one of them ends the run.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("write timed out")]
    Timeout,

    #[error("device disconnected")]
    Disconnected,

    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportError::Timeout,
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::WriteZero
            | io::ErrorKind::UnexpectedEof => TransportError::Disconnected,
            _ => TransportError::Io(err),
        }
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
