//! Transport boundary: an opaque byte stream under the protocol client.
//!
//! The client consumes only this interface, so the serial port can be
//! swapped for the canned-response mock in tests without touching the
//! session machine.

pub mod mock;
pub mod serial;

use crate::error::Result;
use crate::protocol::constants::ETX;

pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Async byte-stream transport to a controller.
///
/// Exactly one session uses a transport at a time; implementations do
/// not need to be shareable across tasks. All read operations take an
/// explicit timeout in seconds and fail with `PcmiError::Timeout` when
/// it expires.
pub trait Transport: Send {
    /// Open the underlying connection. Opening an open transport is an
    /// error.
    fn open(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Close the connection. Idempotent.
    fn close(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// True while the connection is usable.
    fn is_open(&self) -> bool;

    /// Transmit a complete frame.
    fn write(&mut self, data: &[u8]) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read exactly `size` bytes.
    fn read(&mut self, size: usize, timeout_secs: f64) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// Read until `terminator` is seen, inclusive.
    fn read_until(
        &mut self,
        terminator: u8,
        timeout_secs: f64,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// Read a single byte.
    fn read_byte(&mut self, timeout_secs: f64) -> impl std::future::Future<Output = Result<u8>> + Send {
        async move {
            let data = self.read(1, timeout_secs).await?;
            Ok(data[0])
        }
    }

    /// Read until the protocol frame terminator (CR), inclusive.
    fn read_frame(&mut self, timeout_secs: f64) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send {
        self.read_until(ETX, timeout_secs)
    }

    /// Drop any buffered input and output, for resynchronizing after
    /// errors.
    fn discard_buffers(&mut self);
}
