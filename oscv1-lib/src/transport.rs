use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, info};

// Port enumeration types, re-exported for listing tools.
pub use tokio_serial::{SerialPortInfo, SerialPortType, UsbPortInfo};

use crate::error::Error;

/// Byte-level view of the digitizer link.
///
/// The engine needs exactly five primitives; anything providing them (a
/// UART, a scripted peer in tests) can sit behind a
/// [`Session`](crate::session::Session). Opening is the implementor's
/// constructor, closing is `Drop`.
#[allow(async_fn_in_trait)]
pub trait ByteStreamPort {
    /// Write all bytes.
    async fn write(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Read whatever arrives within `timeout` into `buf`, returning the
    /// byte count. 0 means the deadline expired with nothing to read,
    /// which is a normal outcome, not an error.
    async fn read_available(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Error>;

    /// Bytes already queued on the receive side.
    fn bytes_waiting(&mut self) -> Result<usize, Error>;

    /// Discard everything queued on the receive side.
    fn reset_input_buffer(&mut self) -> Result<(), Error>;

    /// Discard anything not yet transmitted.
    fn reset_output_buffer(&mut self) -> Result<(), Error>;
}

/// [`ByteStreamPort`] over a real UART.
pub struct SerialBytePort {
    stream: SerialStream,
    name: String,
}

impl SerialBytePort {
    /// Open `path` at `baud`, 8N1.
    pub fn open(path: &str, baud: u32) -> Result<Self, Error> {
        info!(port = path, baud, "Opening serial port");
        let stream = tokio_serial::new(path, baud).open_native_async()?;
        Ok(Self {
            stream,
            name: path.to_string(),
        })
    }

    /// The path this port was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ByteStreamPort for SerialBytePort {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        debug!(port = %self.name, data = %hex::encode(bytes), "Serial write");
        self.stream.write_all(bytes).await?;
        Ok(())
    }

    async fn read_available(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Error> {
        match tokio::time::timeout(timeout, self.stream.read(buf)).await {
            Ok(read) => Ok(read?),
            Err(_) => Ok(0),
        }
    }

    fn bytes_waiting(&mut self) -> Result<usize, Error> {
        Ok(self.stream.bytes_to_read()? as usize)
    }

    fn reset_input_buffer(&mut self) -> Result<(), Error> {
        self.stream.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn reset_output_buffer(&mut self) -> Result<(), Error> {
        self.stream.clear(ClearBuffer::Output)?;
        Ok(())
    }
}

/// USB descriptor substrings that identify the usual Arduino-class
/// adapters the digitizer shows up as.
const PORT_HINTS: [&str; 3] = ["Arduino", "CH340", "USB Serial"];

/// Every serial port the OS knows about.
pub fn list_ports() -> Result<Vec<SerialPortInfo>, Error> {
    Ok(tokio_serial::available_ports()?)
}

/// True when `info` looks like the digitizer's adapter.
pub fn port_matches(info: &SerialPortInfo) -> bool {
    if let SerialPortType::UsbPort(usb) = &info.port_type {
        let descriptors = [usb.product.as_deref(), usb.manufacturer.as_deref()];
        if descriptors
            .into_iter()
            .flatten()
            .any(|text| PORT_HINTS.iter().any(|hint| text.contains(hint)))
        {
            return true;
        }
    }
    info.port_name.contains("ACM")
}

/// Pick the port the digitizer is most likely on.
pub fn discover_port() -> Result<String, Error> {
    let port = list_ports()?
        .into_iter()
        .find(port_matches)
        .ok_or(Error::DeviceNotFound)?;
    info!(port = %port.port_name, "Auto-detected digitizer port");
    Ok(port.port_name)
}
