use std::fs;
use std::path::Path;

use crate::error::{Error, Result, TransportError};
use crate::output::OutputSink;

/// Exact size of a patch bank accepted by the device.
pub const PATCH_SIZE: usize = 0x1800;

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;

/// A validated patch bank, uploaded once before playback starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    data: Vec<u8>,
}

impl Patch {
    pub fn new(data: Vec<u8>) -> Result<Self> {
        if data.len() != PATCH_SIZE {
            return Err(Error::PatchSize {
                expected: PATCH_SIZE,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(data)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Sends the bank framed as a system exclusive message.
    pub fn upload<S: OutputSink + ?Sized>(&self, sink: &mut S) -> Result<(), TransportError> {
        sink.send(&[SYSEX_START])?;
        sink.send(&self.data)?;
        sink.send(&[SYSEX_END])?;
        Ok(())
    }
}
