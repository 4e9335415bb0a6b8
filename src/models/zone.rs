//! Zone-level records: configuration parameters and runtime variables.

use serde::{Deserialize, Serialize};

use super::temperature::Temperature;

/// Zone configuration record, from 0x96 / 0xB8 responses.
///
/// Temperature offsets are relative to the setpoint; the fixed alarms
/// are absolute. Head counts exist twice: the legacy 16-bit words, and
/// the 32-bit counts appended by record format 3 and later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneParameters {
    // Header
    pub record_size_words: u16,
    /// Zone number, 1..=9.
    pub zone_number: u8,
    pub record_type: u8,
    /// Format version, high nibble of header byte 4.
    pub record_format: u8,
    /// Temperature control mode, low nibble of header byte 4.
    pub temperature_control: u8,

    // Temperature settings
    pub temp_setpoint: Temperature,
    pub high_temp_alarm_offset: Temperature,
    pub low_temp_alarm_offset: Temperature,
    pub high_temp_inhibit_offset: Temperature,
    pub low_temp_inhibit_offset: Temperature,
    pub fixed_high_temp_alarm: Temperature,
    pub fixed_low_temp_alarm: Temperature,

    // Control settings
    pub interlock_bits: u16,
    pub zone_bits: u16,

    // Humidity settings
    pub humidity_setpoint: u8,
    pub humidity_off_time: u16,
    pub humidity_purge_time: u16,

    // Animal / production information
    pub animal_age: u16,
    pub projected_age: u16,
    pub weight: u16,
    pub begin_head_count: u16,
    pub mortality_count: u16,
    pub sold_count: u16,

    /// 32-bit head counts, present when `record_format >= 3` and the
    /// record is long enough to carry them.
    pub long_head_counts: Option<LongHeadCounts>,

    /// Original hex payload, kept for diagnostics.
    pub raw_hex: String,
}

/// Extended 32-bit head counts (record format 3+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongHeadCounts {
    pub begin_head_count: u32,
    pub mortality_count: u32,
    pub sold_count: u32,
}

/// Zone runtime record, from 0x98 / 0xBA responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneVariables {
    // Header
    pub record_size_words: u16,
    /// Zone number, 1..=9.
    pub zone_number: u8,
    pub record_type: u8,
    pub record_format: u8,

    // Readings
    pub actual_temperature: Temperature,
    pub setpoint_temperature: Temperature,
    pub outside_temperature: Temperature,
    pub actual_humidity: u8,

    // Timer states
    pub current_age_days: u16,
    pub lights_on_minutes: u16,
    pub lights_off_minutes: u16,

    // Status flags
    pub alarm_status: u16,
    pub zone_status: u16,

    /// Original hex payload, kept for diagnostics.
    pub raw_hex: String,
}
