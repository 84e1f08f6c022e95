use std::io::Write;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::debug;

use crate::config::SerialConfig;
use crate::error::TransportError;

/// Destination for the raw bytes of a performance.
///
/// Writes are blocking and must either complete or fail within a bounded time.
pub trait OutputSink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}

impl OutputSink for Vec<u8> {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).send(bytes)
    }
}

/// A serial device configured for 8N1 without flow control.
pub struct SerialSink {
    port: Box<dyn SerialPort>,
}

impl SerialSink {
    pub fn open(path: &str, config: &SerialConfig) -> Result<Self, TransportError> {
        let port = serialport::new(path, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open()
            .map_err(|source| TransportError::Open {
                port: path.to_string(),
                source,
            })?;
        debug!(
            port = path,
            baud = config.baud_rate,
            timeout_ms = config.timeout_ms,
            "serial port opened"
        );
        Ok(Self { port })
    }

    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl OutputSink for SerialSink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes)?;
        Ok(())
    }
}

impl Drop for SerialSink {
    fn drop(&mut self) {
        // Push out whatever the driver still buffers before the port closes.
        if let Err(err) = self.port.flush() {
            debug!("flush on close failed: {}", err);
        }
    }
}

/// Names of the serial ports the system reports.
pub fn available_ports() -> Result<Vec<String>, TransportError> {
    let ports = serialport::available_ports().map_err(|source| TransportError::Open {
        port: "<enumeration>".to_string(),
        source,
    })?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
