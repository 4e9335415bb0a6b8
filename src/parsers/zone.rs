//! Zone parameter and zone variable record decoders.
//!
//! Both records carry the format version in the high nibble of header
//! byte 4; the byte-order strategy is resolved from it before any
//! multi-byte field is read. Zone parameter records grow 32-bit head
//! counts at format 3 and later.

use crate::error::{PcmiError, Result};
use crate::models::temperature::Temperature;
use crate::models::zone::{LongHeadCounts, ZoneParameters, ZoneVariables};
use crate::parsers::hex_reader::HexReader;
use crate::protocol::codec::decode_byte;
use crate::protocol::constants::MAX_ZONES;
use crate::protocol::endian::Endian;

/// Minimum zone parameter record size in bytes (without long counts).
const ZONE_PARM_MIN_BYTES: usize = 42;
/// Minimum zone variable record size in bytes.
const ZONE_VAR_MIN_BYTES: usize = 24;
/// Offset of the format/aux byte in the record header.
const FORMAT_BYTE_OFFSET: usize = 4;

/// Decode a zone parameter record from its hex payload.
pub fn parse_zone_parameters(hex: &str) -> Result<ZoneParameters> {
    require_len(hex, ZONE_PARM_MIN_BYTES, "zone parameter")?;
    let (record_format, temp_control) = format_nibbles(hex)?;
    let mut reader = HexReader::new(hex, Endian::for_record_format(record_format))?;

    let record_size_words = reader.read_u16()?;
    let zone_number = reader.read_byte()?;
    let record_type = reader.read_byte()?;
    reader.skip_bytes(1)?; // format/aux byte, already decoded
    reader.skip_bytes(1)?; // reserved

    let temp_setpoint = Temperature::from_raw(reader.read_i16()?);
    let high_temp_alarm_offset = Temperature::from_raw(reader.read_i16()?);
    let low_temp_alarm_offset = Temperature::from_raw(reader.read_i16()?);
    let high_temp_inhibit_offset = Temperature::from_raw(reader.read_i16()?);
    let low_temp_inhibit_offset = Temperature::from_raw(reader.read_i16()?);
    let fixed_high_temp_alarm = Temperature::from_raw(reader.read_i16()?);
    let fixed_low_temp_alarm = Temperature::from_raw(reader.read_i16()?);

    let interlock_bits = reader.read_u16()?;
    let zone_bits = reader.read_u16()?;

    let humidity_setpoint = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    let humidity_off_time = reader.read_u16()?;
    let humidity_purge_time = reader.read_u16()?;

    let animal_age = reader.read_u16()?;
    let projected_age = reader.read_u16()?;
    let weight = reader.read_u16()?;
    let begin_head_count = reader.read_u16()?;
    let mortality_count = reader.read_u16()?;
    let sold_count = reader.read_u16()?;

    let long_head_counts = if record_format >= 3 && reader.remaining_bytes() >= 12 {
        Some(LongHeadCounts {
            begin_head_count: reader.read_u32()?,
            mortality_count: reader.read_u32()?,
            sold_count: reader.read_u32()?,
        })
    } else {
        None
    };

    let record = ZoneParameters {
        record_size_words,
        zone_number,
        record_type,
        record_format,
        temperature_control: temp_control,
        temp_setpoint,
        high_temp_alarm_offset,
        low_temp_alarm_offset,
        high_temp_inhibit_offset,
        low_temp_inhibit_offset,
        fixed_high_temp_alarm,
        fixed_low_temp_alarm,
        interlock_bits,
        zone_bits,
        humidity_setpoint,
        humidity_off_time,
        humidity_purge_time,
        animal_age,
        projected_age,
        weight,
        begin_head_count,
        mortality_count,
        sold_count,
        long_head_counts,
        raw_hex: hex.to_string(),
    };
    validate_header(record.zone_number, record.record_size_words, hex, "zone parameter")?;
    Ok(record)
}

/// Decode a zone variable record from its hex payload.
pub fn parse_zone_variables(hex: &str) -> Result<ZoneVariables> {
    require_len(hex, ZONE_VAR_MIN_BYTES, "zone variable")?;
    let (record_format, _) = format_nibbles(hex)?;
    let mut reader = HexReader::new(hex, Endian::for_record_format(record_format))?;

    let record_size_words = reader.read_u16()?;
    let zone_number = reader.read_byte()?;
    let record_type = reader.read_byte()?;
    reader.skip_bytes(2)?; // format byte + reserved

    let actual_temperature = Temperature::from_raw(reader.read_i16()?);
    let setpoint_temperature = Temperature::from_raw(reader.read_i16()?);
    let outside_temperature = Temperature::from_raw(reader.read_i16()?);

    let actual_humidity = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved

    let current_age_days = reader.read_u16()?;
    let lights_on_minutes = reader.read_u16()?;
    let lights_off_minutes = reader.read_u16()?;

    let alarm_status = reader.read_u16()?;
    let zone_status = reader.read_u16()?;

    let record = ZoneVariables {
        record_size_words,
        zone_number,
        record_type,
        record_format,
        actual_temperature,
        setpoint_temperature,
        outside_temperature,
        actual_humidity,
        current_age_days,
        lights_on_minutes,
        lights_off_minutes,
        alarm_status,
        zone_status,
        raw_hex: hex.to_string(),
    };
    validate_header(record.zone_number, record.record_size_words, hex, "zone variable")?;
    Ok(record)
}

/// Split header byte 4 into (record format, auxiliary nibble).
pub(crate) fn format_nibbles(hex: &str) -> Result<(u8, u8)> {
    let at = FORMAT_BYTE_OFFSET * 2;
    let chars = hex
        .as_bytes()
        .get(at..at + 2)
        .ok_or_else(|| PcmiError::parse("Record too short to carry a format byte"))?;
    let byte = decode_byte(chars)?;
    Ok((byte >> 4, byte & 0x0F))
}

fn require_len(hex: &str, min_bytes: usize, what: &str) -> Result<()> {
    if hex.len() < min_bytes * 2 {
        return Err(PcmiError::parse(format!(
            "{what} record too short: {} chars, need at least {}",
            hex.len(),
            min_bytes * 2
        )));
    }
    Ok(())
}

fn validate_header(zone_number: u8, record_size_words: u16, hex: &str, what: &str) -> Result<()> {
    if zone_number == 0 || zone_number > MAX_ZONES {
        return Err(PcmiError::parse(format!(
            "{what} record has zone number {zone_number}, expected 1..={MAX_ZONES}"
        )));
    }
    let declared = usize::from(record_size_words) * 2;
    let actual = hex.len() / 2;
    if declared != actual {
        return Err(PcmiError::parse(format!(
            "{what} record declares {declared} bytes but payload carries {actual}"
        )));
    }
    Ok(())
}
