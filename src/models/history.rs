//! History records: interval-logged environmental data.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::protocol::constants::NAN_TEMP;

/// History data groups, 1..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryGroup {
    Temperature,
    Humidity,
    Setpoint,
    OutsideTemp,
    StaticPressure,
    WaterUsage,
    FeedUsage,
    Mortality,
    Weight,
}

impl HistoryGroup {
    /// Map a wire group code; unknown codes fall back to temperature.
    pub fn from_code(code: u8) -> Self {
        match code {
            2 => Self::Humidity,
            3 => Self::Setpoint,
            4 => Self::OutsideTemp,
            5 => Self::StaticPressure,
            6 => Self::WaterUsage,
            7 => Self::FeedUsage,
            8 => Self::Mortality,
            9 => Self::Weight,
            _ => Self::Temperature,
        }
    }

    /// Scale a raw sample to its engineering value.
    ///
    /// Temperature groups are tenths of a degree, static pressure is
    /// hundredths of an inch WC; the rest are used raw.
    pub fn scale(self, raw: i16) -> f64 {
        match self {
            Self::Temperature | Self::Setpoint | Self::OutsideTemp => f64::from(raw) / 10.0,
            Self::StaticPressure => f64::from(raw) / 100.0,
            _ => f64::from(raw),
        }
    }
}

/// One logged sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub timestamp: NaiveDateTime,
    /// Scaled engineering value.
    pub value: f64,
    /// Raw wire value; 0x7FFF marks an invalid sample.
    pub raw_value: i16,
}

impl HistorySample {
    pub fn is_valid(&self) -> bool {
        self.raw_value != NAN_TEMP
    }
}

/// A history record: one zone, one group, evenly spaced samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub zone_number: u8,
    pub group_code: u8,
    pub interval_minutes: u16,
    /// Sample count declared by the controller; the samples vector may
    /// be shorter if the record was truncated.
    pub sample_count: u16,
    pub start_timestamp: NaiveDateTime,
    pub samples: Vec<HistorySample>,
    /// Original hex payload, kept for diagnostics.
    pub raw_hex: String,
}

impl HistoryRecord {
    pub fn group(&self) -> HistoryGroup {
        HistoryGroup::from_code(self.group_code)
    }
}
