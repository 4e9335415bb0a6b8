//! Controller identity types: serial number and version record.

use serde::{Deserialize, Serialize};

use crate::error::{PcmiError, Result};
use crate::protocol::constants::SERIAL_NUMBER_LENGTH;

/// Controller serial number: exactly 8 ASCII digits.
///
/// Serial numbers address a controller on the RS-485 bus, so they are
/// validated at construction rather than at send time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Parse and validate a serial number string.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.len() != SERIAL_NUMBER_LENGTH || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PcmiError::Connection(format!(
                "Serial number must be exactly {SERIAL_NUMBER_LENGTH} digits, got '{value}'"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The serial number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form, for comparison and display.
    pub fn as_u32(&self) -> u32 {
        // Validated digits, 8 of them, always fit in u32.
        self.0.parse().unwrap_or(0)
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Firmware version information, from the 0xA0 response.
///
/// The payload is raw ASCII: a 14-character version string followed by
/// an 8-character date code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    pub date_code: String,
}

impl std::fmt::Display for VersionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.version, self.date_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_serial() {
        let sn = SerialNumber::parse("00009001").unwrap();
        assert_eq!(sn.as_str(), "00009001");
        assert_eq!(sn.as_u32(), 9001);
    }

    #[test]
    fn test_invalid_serials() {
        assert!(SerialNumber::parse("123").is_err());
        assert!(SerialNumber::parse("ABCD1234").is_err());
        assert!(SerialNumber::parse("123456789").is_err());
    }

    #[test]
    fn test_trims_whitespace() {
        let sn = SerialNumber::parse(" 00009001 ").unwrap();
        assert_eq!(sn.as_str(), "00009001");
    }
}
