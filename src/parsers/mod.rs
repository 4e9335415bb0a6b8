//! Record decoders for controller payloads.

pub mod alarm;
pub mod devices;
pub mod hex_reader;
pub mod history;
pub mod registry;
pub mod zone;

use crate::error::{PcmiError, Result};
use crate::models::version::VersionRecord;

pub use alarm::parse_alarm_list;
pub use hex_reader::HexReader;
pub use history::parse_history_record;
pub use registry::{
    parse_device_parameters, parse_device_variables, DeviceParameterRecord, DeviceRegistry, DeviceVariableRecord,
};
pub use zone::{parse_zone_parameters, parse_zone_variables};

/// Version payload layout: 14 ASCII characters of version text followed
/// by an 8-character date code.
const VERSION_FIELD_LEN: usize = 14;
const DATE_CODE_LEN: usize = 8;

/// Decode a version record from the raw ASCII payload of an 0xA0 frame.
pub fn parse_version_record(payload: &[u8]) -> Result<VersionRecord> {
    if payload.len() < VERSION_FIELD_LEN {
        return Err(PcmiError::parse(format!(
            "Version payload too short: {} bytes, need at least {VERSION_FIELD_LEN}",
            payload.len()
        )));
    }
    let version = String::from_utf8_lossy(&payload[..VERSION_FIELD_LEN]).trim().to_string();
    let date_end = payload.len().min(VERSION_FIELD_LEN + DATE_CODE_LEN);
    let date_code = String::from_utf8_lossy(&payload[VERSION_FIELD_LEN..date_end])
        .trim()
        .to_string();
    Ok(VersionRecord { version, date_code })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_record() {
        let record = parse_version_record(b"VPII 2.31     20210604").unwrap();
        assert_eq!(record.version, "VPII 2.31");
        assert_eq!(record.date_code, "20210604");
        assert_eq!(record.to_string(), "VPII 2.31 (20210604)");
    }

    #[test]
    fn test_short_date_code_tolerated() {
        let record = parse_version_record(b"XT 1.04       2019").unwrap();
        assert_eq!(record.version, "XT 1.04");
        assert_eq!(record.date_code, "2019");
    }

    #[test]
    fn test_too_short_rejected() {
        assert!(parse_version_record(b"XT").is_err());
    }
}
