//! History record decoder.
//!
//! History payloads do not carry a format byte; the byte order follows
//! the response command (0xB5 is the little-endian variant). Timestamps
//! are minutes since 1980-01-01.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::models::history::{HistoryGroup, HistoryRecord, HistorySample};
use crate::parsers::hex_reader::HexReader;
use crate::protocol::constants::BASE_YEAR_FOR_DATES;
use crate::protocol::endian::Endian;

/// Base instant for minutes-counter timestamps.
pub(crate) fn base_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(BASE_YEAR_FOR_DATES, 1, 1)
        .expect("base date is valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is valid")
}

/// Decode a history record from its hex payload.
///
/// Layout: zone u8, group u8, interval u16, sample count u16, start u32
/// (minutes since 1980), then i16 samples. A truncated sample tail is
/// tolerated; `sample_count` still reports the declared count.
pub fn parse_history_record(hex: &str, endian: Endian) -> Result<HistoryRecord> {
    let mut reader = HexReader::new(hex, endian)?;

    let zone_number = reader.read_byte()?;
    let group_code = reader.read_byte()?;
    let interval_minutes = reader.read_u16()?;
    let sample_count = reader.read_u16()?;
    let start_minutes = reader.read_u32()?;

    let start_timestamp = base_date() + Duration::minutes(i64::from(start_minutes));
    let group = HistoryGroup::from_code(group_code);

    let mut samples = Vec::with_capacity(usize::from(sample_count));
    for i in 0..sample_count {
        if reader.remaining_bytes() < 2 {
            break;
        }
        let raw_value = reader.read_i16()?;
        samples.push(HistorySample {
            timestamp: start_timestamp + Duration::minutes(i64::from(i) * i64::from(interval_minutes)),
            value: group.scale(raw_value),
            raw_value,
        });
    }

    Ok(HistoryRecord {
        zone_number,
        group_code,
        interval_minutes,
        sample_count,
        start_timestamp,
        samples,
        raw_hex: hex.to_string(),
    })
}
