//! Configuration management module.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PcmiError, Result};
use crate::protocol::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_RECEIVE_TIMEOUT, MAX_SESSION_RETRIES, MAX_TRANSPORT_RETRIES,
};

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub serial: SerialConfig,
    /// Per-operation read timeout in seconds (default: 5.0).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// Connect retransmit budget at the transport layer (default: 6).
    #[serde(default = "default_transport_retries")]
    pub transport_retries: u32,
    /// Per-record retry budget during a download (default: 3).
    #[serde(default = "default_session_retries")]
    pub session_retries: u32,
}

/// RS-485 serial port settings.
///
/// The PCMI bus runs 19200 baud, 8 data bits, mark parity (used for
/// 9-bit addressing), 1 stop bit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port path, e.g. "/dev/ttyUSB0" or "COM3".
    pub port: String,
    #[serde(default = "default_baudrate")]
    pub baudrate: u32,
    #[serde(default = "default_parity")]
    pub parity: Parity,
}

/// Parity setting for the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Odd,
    Even,
    /// Protocol default; used for 9-bit addressing on the PCMI bus.
    Mark,
}

fn default_timeout_secs() -> f64 {
    DEFAULT_RECEIVE_TIMEOUT
}

fn default_transport_retries() -> u32 {
    MAX_TRANSPORT_RETRIES
}

fn default_session_retries() -> u32 {
    MAX_SESSION_RETRIES
}

fn default_baudrate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_parity() -> Parity {
    Parity::Mark
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            timeout_secs: default_timeout_secs(),
            transport_retries: default_transport_retries(),
            session_retries: default_session_retries(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baudrate: default_baudrate(),
            parity: default_parity(),
        }
    }
}

impl ClientConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| PcmiError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| PcmiError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.trim().is_empty() {
            return Err(PcmiError::Config("Serial port cannot be empty".to_string()));
        }
        if self.serial.baudrate == 0 {
            return Err(PcmiError::Config("Baud rate must be greater than 0".to_string()));
        }
        if !(self.timeout_secs > 0.0) {
            return Err(PcmiError::Config("Timeout must be greater than 0".to_string()));
        }
        if self.timeout_secs > 300.0 {
            return Err(PcmiError::Config("Timeout cannot exceed 300 seconds".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.serial.baudrate, 19200);
        assert_eq!(config.serial.parity, Parity::Mark);
        assert_eq!(config.timeout_secs, 5.0);
        assert_eq!(config.transport_retries, 6);
        assert_eq!(config.session_retries, 3);
    }

    #[test]
    fn test_validation_empty_port() {
        let mut config = ClientConfig::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_timeout_bounds() {
        let mut config = ClientConfig::default();

        config.timeout_secs = 0.0;
        assert!(config.validate().is_err());

        config.timeout_secs = 301.0;
        assert!(config.validate().is_err());

        config.timeout_secs = 5.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_defaults_fill_in() {
        let config: ClientConfig = toml::from_str(
            r#"
            [serial]
            port = "/dev/ttyS1"
            "#,
        )
        .unwrap();
        assert_eq!(config.serial.port, "/dev/ttyS1");
        assert_eq!(config.serial.baudrate, 19200);
        assert_eq!(config.session_retries, 3);
    }

    #[test]
    fn test_parity_serde_names() {
        let config: ClientConfig = toml::from_str(
            r#"
            [serial]
            port = "COM3"
            parity = "none"
            "#,
        )
        .unwrap();
        assert_eq!(config.serial.parity, Parity::None);
    }
}
