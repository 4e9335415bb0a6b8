//! Mock transport that plays canned responses, for tests without
//! hardware.

use std::collections::VecDeque;

use super::Transport;
use crate::error::{PcmiError, Result};

/// Drop-in transport replacement returning queued responses.
///
/// Reads drain queued responses in FIFO order through an internal
/// buffer; every write is recorded for assertions. With a script
/// installed, each write must match the expected request and pushes the
/// paired response into the read buffer.
#[derive(Debug, Default)]
pub struct MockTransport {
    open: bool,
    responses: VecDeque<Vec<u8>>,
    read_buffer: Vec<u8>,
    written: Vec<Vec<u8>>,
    script: Vec<(Option<Vec<u8>>, Vec<u8>)>,
    script_index: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a future read.
    pub fn add_response(&mut self, response: impl Into<Vec<u8>>) {
        self.responses.push_back(response.into());
    }

    /// Install a scripted request/response step. `request` of `None`
    /// matches any write.
    pub fn expect(&mut self, request: Option<Vec<u8>>, response: impl Into<Vec<u8>>) {
        self.script.push((request, response.into()));
    }

    /// All frames written so far.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// The most recent write, if any.
    pub fn last_written(&self) -> Option<&[u8]> {
        self.written.last().map(Vec::as_slice)
    }

    /// Number of write operations performed.
    pub fn write_count(&self) -> usize {
        self.written.len()
    }

    /// Drop recorded writes and queued responses.
    pub fn clear(&mut self) {
        self.written.clear();
        self.responses.clear();
        self.read_buffer.clear();
    }

    /// Drop only the recorded writes.
    pub fn clear_writes(&mut self) {
        self.written.clear();
    }

    fn require_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(PcmiError::transport("Mock transport not open"))
        }
    }

    fn fill_buffer(&mut self) {
        if let Some(next) = self.responses.pop_front() {
            self.read_buffer.extend_from_slice(&next);
        }
    }
}

impl Transport for MockTransport {
    async fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(PcmiError::transport("Mock transport already open"));
        }
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.require_open()?;
        self.written.push(data.to_vec());

        if self.script_index < self.script.len() {
            let (expected, response) = &self.script[self.script_index];
            if let Some(expected) = expected {
                if expected != data {
                    return Err(PcmiError::transport(format!(
                        "Script mismatch at step {}: expected {expected:02X?}, got {data:02X?}",
                        self.script_index
                    )));
                }
            }
            self.read_buffer.extend_from_slice(response);
            self.script_index += 1;
        }
        Ok(())
    }

    async fn read(&mut self, size: usize, timeout_secs: f64) -> Result<Vec<u8>> {
        self.require_open()?;
        while self.read_buffer.len() < size && !self.responses.is_empty() {
            self.fill_buffer();
        }
        if self.read_buffer.len() < size {
            return Err(PcmiError::Timeout(timeout_secs));
        }
        let rest = self.read_buffer.split_off(size);
        let out = std::mem::replace(&mut self.read_buffer, rest);
        Ok(out)
    }

    async fn read_until(&mut self, terminator: u8, timeout_secs: f64) -> Result<Vec<u8>> {
        self.require_open()?;
        loop {
            if let Some(idx) = self.read_buffer.iter().position(|&b| b == terminator) {
                let rest = self.read_buffer.split_off(idx + 1);
                let out = std::mem::replace(&mut self.read_buffer, rest);
                return Ok(out);
            }
            if self.responses.is_empty() {
                return Err(PcmiError::Timeout(timeout_secs));
            }
            self.fill_buffer();
        }
    }

    fn discard_buffers(&mut self) {
        self.read_buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queued_responses_fifo() {
        let mut mock = MockTransport::new();
        mock.add_response([0x86]);
        mock.add_response([0x88]);
        mock.open().await.unwrap();

        assert_eq!(mock.read_byte(1.0).await.unwrap(), 0x86);
        assert_eq!(mock.read_byte(1.0).await.unwrap(), 0x88);
        assert!(matches!(mock.read_byte(1.0).await, Err(PcmiError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_read_until_spans_responses() {
        let mut mock = MockTransport::new();
        mock.add_response(*b"AB");
        mock.add_response(*b"CD\r");
        mock.open().await.unwrap();

        let frame = mock.read_until(0x0D, 1.0).await.unwrap();
        assert_eq!(frame, b"ABCD\r");
    }

    #[tokio::test]
    async fn test_write_recording() {
        let mut mock = MockTransport::new();
        mock.open().await.unwrap();
        mock.write(b"abc").await.unwrap();
        mock.write(b"def").await.unwrap();

        assert_eq!(mock.write_count(), 2);
        assert_eq!(mock.last_written(), Some(b"def".as_slice()));
    }

    #[tokio::test]
    async fn test_script_match_and_mismatch() {
        let mut mock = MockTransport::new();
        mock.expect(Some(b"ping".to_vec()), *b"pong\r");
        mock.open().await.unwrap();

        mock.write(b"ping").await.unwrap();
        assert_eq!(mock.read_until(b'\r', 1.0).await.unwrap(), b"pong\r");

        let mut mock = MockTransport::new();
        mock.expect(Some(b"ping".to_vec()), *b"pong\r");
        mock.open().await.unwrap();
        assert!(mock.write(b"nope").await.is_err());
    }

    #[tokio::test]
    async fn test_closed_transport_errors() {
        let mut mock = MockTransport::new();
        assert!(mock.write(b"x").await.is_err());
        assert!(mock.read(1, 1.0).await.is_err());
    }

    #[tokio::test]
    async fn test_discard_buffers() {
        let mut mock = MockTransport::new();
        mock.add_response(*b"stale");
        mock.open().await.unwrap();
        let _ = mock.read(2, 1.0).await.unwrap();
        mock.discard_buffers();
        assert!(mock.read(1, 1.0).await.is_err());
    }
}
