//! Error types and handling.

use thiserror::Error;

/// Errors that can occur while talking to a PCMI controller.
#[derive(Error, Debug)]
pub enum PcmiError {
    /// Transport open/close/read/write failed at the OS level.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A bounded read expired before the controller responded.
    #[error("Timeout after {0:.1}s")]
    Timeout(f64),

    /// A received frame failed checksum validation.
    #[error("Checksum mismatch: expected {expected:#04X}, got {received:#04X}")]
    Checksum { expected: u8, received: u8 },

    /// Frame structure was invalid (unknown command, bad length, bad hex).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A decoded record violated a record-level invariant.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The controller answered with an error code (0xC0..0xDB).
    #[error("Controller error {code:#04X}: {message}")]
    Controller { code: u8, message: &'static str },

    /// connect() did not receive a serial-number acknowledgment.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Configuration value rejected during validation.
    #[error("Config error: {0}")]
    Config(String),

    /// Underlying I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for PCMI operations.
pub type Result<T> = std::result::Result<T, PcmiError>;

impl PcmiError {
    /// Create a protocol error with message.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a parse error with message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a transport error with message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a controller error from a raw error code.
    pub fn controller(code: u8) -> Self {
        Self::Controller {
            code,
            message: controller_error_message(code),
        }
    }

    /// True for errors the session machine may retry (timeouts and
    /// locally detected checksum failures).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Checksum { .. })
    }
}

/// Human-readable message for a controller error code.
pub fn controller_error_message(code: u8) -> &'static str {
    match code {
        0xC1 => "generic error",
        0xC2 => "invalid password",
        0xC3 => "invalid serial number",
        0xC4 => "string/data error",
        0xC8 => "zone not found",
        0xCA => "try again (temporary condition)",
        0xCB => "controller in use (hands off)",
        0xCC => "resend upload record",
        0xCD => "device not found",
        0xCE => "zone not found during upload",
        0xD9 => "checksum error reported by controller",
        0xDA => "controller starting up",
        0xDB => "length mismatch",
        _ => "unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_error_carries_message() {
        let err = PcmiError::controller(0xCB);
        let text = err.to_string();
        assert!(text.contains("0xCB"));
        assert!(text.contains("hands off"));
    }

    #[test]
    fn test_unknown_code_still_maps() {
        assert_eq!(controller_error_message(0xC7), "unknown error");
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(PcmiError::Timeout(5.0).is_retryable());
        assert!(PcmiError::Checksum {
            expected: 0x10,
            received: 0x11
        }
        .is_retryable());
        assert!(!PcmiError::controller(0xCB).is_retryable());
    }
}
