//! Async client for the PCMI serial protocol spoken by VP, VPII, and
//! XT agricultural zone controllers over RS-485.
//!
//! The controller is the master of its configuration and measurements;
//! this client pulls structured records (zone configuration and state,
//! per-device records, history, alarms, firmware version) by driving a
//! request/acknowledge dialogue over a half-duplex serial line.
//!
//! # Example
//!
//! ```ignore
//! use pcmi::{ClientConfig, ControllerClient};
//!
//! let config = ClientConfig::default();
//! let mut client = ControllerClient::from_config(&config)?;
//!
//! client.connect("00009001").await?;
//! let mut zones = client.download_zone_parameters().await?;
//! while let Some(zone) = zones.next().await {
//!     let zone = zone?;
//!     println!("zone {}: {}", zone.zone_number, zone.temp_setpoint);
//! }
//! client.disconnect().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod parsers;
pub mod protocol;
pub mod transport;

pub use client::{ClientState, ControllerClient, DownloadStream};
pub use config::{ClientConfig, Parity, SerialConfig};
pub use error::{PcmiError, Result};
pub use models::{
    AlarmList, AlarmRecord, DeviceRecordHeader, DeviceType, HistoryRecord, SerialNumber, Temperature, VersionRecord,
    ZoneParameters, ZoneVariables,
};
pub use parsers::{DeviceParameterRecord, DeviceRegistry, DeviceVariableRecord};
pub use transport::{MockTransport, SerialTransport, Transport};
