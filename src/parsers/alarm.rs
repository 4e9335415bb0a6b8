//! Alarm list decoder.
//!
//! Like history, alarm payloads carry no format byte; byte order follows
//! the response command (0xB3 is the little-endian variant).

use chrono::Duration;

use crate::error::Result;
use crate::models::alarm::{AlarmList, AlarmRecord};
use crate::parsers::hex_reader::HexReader;
use crate::parsers::history::base_date;
use crate::protocol::endian::Endian;

/// Size of one alarm entry in hex characters (20 bytes).
const ALARM_ENTRY_CHARS: usize = 40;

/// Decode an alarm list from its hex payload.
///
/// Layout: zone u8, reserved u8, total count u16, then 20-byte entries
/// (id u16, type u8, zone u8, device index u16, state u8, reserved u8,
/// triggered u32, cleared u32, value i16, threshold i16). Timestamps
/// are minutes since 1980-01-01; a cleared value of 0 means the alarm
/// is still open.
pub fn parse_alarm_list(hex: &str, endian: Endian) -> Result<AlarmList> {
    let mut reader = HexReader::new(hex, endian)?;

    let zone_number = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    let total_count = reader.read_u16()?;

    let mut alarms = Vec::new();
    while reader.remaining() >= ALARM_ENTRY_CHARS {
        let alarm_id = reader.read_u16()?;
        let alarm_type_code = reader.read_byte()?;
        let alarm_zone = reader.read_byte()?;
        let device_index = reader.read_u16()?;
        let state_code = reader.read_byte()?;
        reader.skip_bytes(1)?; // reserved

        let triggered_minutes = reader.read_u32()?;
        let cleared_minutes = reader.read_u32()?;
        let value = reader.read_i16()?;
        let threshold = reader.read_i16()?;

        alarms.push(AlarmRecord {
            alarm_id,
            alarm_type_code,
            zone_number: alarm_zone,
            device_index,
            state_code,
            triggered_at: base_date() + Duration::minutes(i64::from(triggered_minutes)),
            cleared_at: (cleared_minutes > 0)
                .then(|| base_date() + Duration::minutes(i64::from(cleared_minutes))),
            value,
            threshold,
        });
    }

    Ok(AlarmList {
        zone_number,
        total_count,
        alarms,
        raw_hex: hex.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::alarm::{AlarmState, AlarmType};
    use crate::protocol::codec::bytes_to_hex;

    fn alarm_entry_be(id: u16, alarm_type: u8, state: u8, cleared_minutes: u32) -> Vec<u8> {
        let mut entry = Vec::with_capacity(20);
        entry.extend_from_slice(&id.to_be_bytes());
        entry.push(alarm_type);
        entry.push(1); // zone
        entry.extend_from_slice(&3u16.to_be_bytes()); // device index
        entry.push(state);
        entry.push(0); // reserved
        entry.extend_from_slice(&1440u32.to_be_bytes()); // triggered
        entry.extend_from_slice(&cleared_minutes.to_be_bytes());
        entry.extend_from_slice(&850i16.to_be_bytes()); // value 85.0F
        entry.extend_from_slice(&800i16.to_be_bytes()); // threshold
        entry
    }

    #[test]
    fn test_parse_alarm_list() {
        let mut data = vec![1u8, 0, 0, 2]; // zone 1, total 2
        data.extend_from_slice(&alarm_entry_be(7, 1, 1, 0));
        data.extend_from_slice(&alarm_entry_be(8, 2, 3, 2880));

        let list = parse_alarm_list(&bytes_to_hex(&data), Endian::Swap).unwrap();
        assert_eq!(list.zone_number, 1);
        assert_eq!(list.total_count, 2);
        assert_eq!(list.alarms.len(), 2);

        let first = &list.alarms[0];
        assert_eq!(first.alarm_id, 7);
        assert_eq!(first.alarm_type(), AlarmType::HighTemp);
        assert_eq!(first.state(), AlarmState::Active);
        assert!(first.is_active());
        assert_eq!(first.cleared_at, None);
        assert_eq!(first.triggered_at, base_date() + Duration::days(1));
        assert_eq!(first.temperature_value().unwrap().fahrenheit(), Some(85.0));

        let second = &list.alarms[1];
        assert_eq!(second.state(), AlarmState::Cleared);
        assert_eq!(second.cleared_at, Some(base_date() + Duration::days(2)));
    }

    #[test]
    fn test_active_alarm_filter() {
        let mut data = vec![0u8, 0, 0, 2];
        data.extend_from_slice(&alarm_entry_be(1, 1, 1, 0));
        data.extend_from_slice(&alarm_entry_be(2, 2, 0, 100));
        let list = parse_alarm_list(&bytes_to_hex(&data), Endian::Swap).unwrap();
        assert_eq!(list.active_alarms().count(), 1);
    }

    #[test]
    fn test_partial_trailing_entry_ignored() {
        let mut data = vec![1u8, 0, 0, 1];
        data.extend_from_slice(&alarm_entry_be(1, 1, 1, 0));
        data.extend_from_slice(&[0xAA, 0xBB]); // trailing fragment
        let list = parse_alarm_list(&bytes_to_hex(&data), Endian::Swap).unwrap();
        assert_eq!(list.alarms.len(), 1);
    }
}
