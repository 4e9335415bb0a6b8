//! RS-485 serial transport backed by tokio-serial.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::{timeout, Duration, Instant};
use tokio_serial::{ClearBuffer, DataBits, FlowControl, SerialPort, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, warn};

use super::Transport;
use crate::config::{Parity, SerialConfig};
use crate::error::{PcmiError, Result};
use crate::protocol::constants::COM_BUFFER_SIZE;

/// Serial transport for a PCMI controller link.
///
/// Construction does not open the port; `open()` does.
pub struct SerialTransport {
    config: SerialConfig,
    stream: Option<SerialStream>,
}

impl SerialTransport {
    pub fn new(config: SerialConfig) -> Self {
        Self { config, stream: None }
    }

    /// The configured port path.
    pub fn port_name(&self) -> &str {
        &self.config.port
    }

    fn stream_mut(&mut self) -> Result<&mut SerialStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| PcmiError::transport("Serial port is not open"))
    }

    fn map_parity(&self) -> tokio_serial::Parity {
        match self.config.parity {
            Parity::None => tokio_serial::Parity::None,
            Parity::Odd => tokio_serial::Parity::Odd,
            Parity::Even => tokio_serial::Parity::Even,
            Parity::Mark => {
                // The serial driver stack cannot express mark parity;
                // controller responses carry space-parity data bytes, so
                // receiving with no parity is the working substitute.
                warn!(port = %self.config.port, "mark parity unsupported by serial driver, opening with no parity");
                tokio_serial::Parity::None
            }
        }
    }
}

impl Transport for SerialTransport {
    async fn open(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Err(PcmiError::transport(format!(
                "Serial port {} already open",
                self.config.port
            )));
        }

        let parity = self.map_parity();
        let stream = tokio_serial::new(self.config.port.as_str(), self.config.baudrate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(parity)
            .flow_control(FlowControl::None)
            .open_native_async()
            .map_err(|e| PcmiError::transport(format!("Failed to open serial port {}: {e}", self.config.port)))?;

        debug!(port = %self.config.port, baudrate = self.config.baudrate, "serial port open");
        self.stream = Some(stream);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            debug!(port = %self.config.port, "serial port closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream_mut()?;
        stream
            .write_all(data)
            .await
            .map_err(|e| PcmiError::transport(format!("Write failed: {e}")))?;
        stream
            .flush()
            .await
            .map_err(|e| PcmiError::transport(format!("Flush failed: {e}")))?;
        Ok(())
    }

    async fn read(&mut self, size: usize, timeout_secs: f64) -> Result<Vec<u8>> {
        let stream = self.stream_mut()?;
        let mut buf = vec![0u8; size];
        timeout(Duration::from_secs_f64(timeout_secs), stream.read_exact(&mut buf))
            .await
            .map_err(|_| PcmiError::Timeout(timeout_secs))?
            .map_err(|e| PcmiError::transport(format!("Read failed: {e}")))?;
        Ok(buf)
    }

    async fn read_until(&mut self, terminator: u8, timeout_secs: f64) -> Result<Vec<u8>> {
        let deadline = Instant::now() + Duration::from_secs_f64(timeout_secs);
        let stream = self.stream_mut()?;
        let mut out = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(PcmiError::Timeout(timeout_secs));
            }
            match timeout(deadline - now, stream.read_exact(&mut byte)).await {
                Ok(Ok(_)) => {
                    out.push(byte[0]);
                    if byte[0] == terminator {
                        return Ok(out);
                    }
                    if out.len() > COM_BUFFER_SIZE {
                        return Err(PcmiError::protocol(format!(
                            "Frame exceeds {COM_BUFFER_SIZE} bytes without terminator"
                        )));
                    }
                }
                Ok(Err(e)) => return Err(PcmiError::transport(format!("Read failed: {e}"))),
                Err(_) => return Err(PcmiError::Timeout(timeout_secs)),
            }
        }
    }

    fn discard_buffers(&mut self) {
        if let Some(stream) = &self.stream {
            // Port may already be gone; resync is best effort.
            let _ = stream.clear(ClearBuffer::All);
        }
    }
}
