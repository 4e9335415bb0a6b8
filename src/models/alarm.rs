//! Alarm records from the controller's alarm log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::temperature::Temperature;

/// Alarm type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmType {
    None,
    HighTemp,
    LowTemp,
    FixedHighTemp,
    FixedLowTemp,
    HighHumidity,
    LowHumidity,
    PowerFailure,
    PowerRestored,
    SensorFailure,
    DeviceFault,
    HighStatic,
    LowStatic,
    HighGas,
    WaterFlow,
    FeedLevel,
    DoorOpen,
    General,
}

impl AlarmType {
    /// Map a wire code; unrecognized codes become `General`.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::None,
            1 => Self::HighTemp,
            2 => Self::LowTemp,
            3 => Self::FixedHighTemp,
            4 => Self::FixedLowTemp,
            5 => Self::HighHumidity,
            6 => Self::LowHumidity,
            7 => Self::PowerFailure,
            8 => Self::PowerRestored,
            9 => Self::SensorFailure,
            10 => Self::DeviceFault,
            11 => Self::HighStatic,
            12 => Self::LowStatic,
            13 => Self::HighGas,
            14 => Self::WaterFlow,
            15 => Self::FeedLevel,
            16 => Self::DoorOpen,
            _ => Self::General,
        }
    }

    /// True for the four temperature alarm kinds.
    pub fn is_temperature(self) -> bool {
        matches!(
            self,
            Self::HighTemp | Self::LowTemp | Self::FixedHighTemp | Self::FixedLowTemp
        )
    }
}

/// Alarm lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmState {
    Inactive,
    Active,
    Acknowledged,
    Cleared,
}

impl AlarmState {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Active,
            2 => Self::Acknowledged,
            3 => Self::Cleared,
            _ => Self::Inactive,
        }
    }
}

/// One alarm log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRecord {
    pub alarm_id: u16,
    pub alarm_type_code: u8,
    /// Zone the alarm occurred in; 0 means controller-wide.
    pub zone_number: u8,
    pub device_index: u16,
    pub state_code: u8,
    /// When the alarm was triggered.
    pub triggered_at: NaiveDateTime,
    /// When the alarm cleared; `None` while still open.
    pub cleared_at: Option<NaiveDateTime>,
    /// Raw value that tripped the alarm (sentinel-preserving).
    pub value: i16,
    /// Threshold that was exceeded.
    pub threshold: i16,
}

impl AlarmRecord {
    pub fn alarm_type(&self) -> AlarmType {
        AlarmType::from_code(self.alarm_type_code)
    }

    pub fn state(&self) -> AlarmState {
        AlarmState::from_code(self.state_code)
    }

    pub fn is_active(&self) -> bool {
        self.state() == AlarmState::Active
    }

    /// The trip value as a temperature, for temperature alarm kinds.
    pub fn temperature_value(&self) -> Option<Temperature> {
        self.alarm_type().is_temperature().then(|| Temperature::from_raw(self.value))
    }
}

/// An alarm list response for one zone (0 = all zones).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmList {
    pub zone_number: u8,
    /// Total alarms the controller holds, which can exceed the number
    /// carried in this record.
    pub total_count: u16,
    pub alarms: Vec<AlarmRecord>,
    /// Original hex payload, kept for diagnostics.
    pub raw_hex: String,
}

impl AlarmList {
    /// Only the alarms currently active.
    pub fn active_alarms(&self) -> impl Iterator<Item = &AlarmRecord> {
        self.alarms.iter().filter(|a| a.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alarm_type_mapping() {
        assert_eq!(AlarmType::from_code(1), AlarmType::HighTemp);
        assert_eq!(AlarmType::from_code(42), AlarmType::General);
        assert!(AlarmType::from_code(3).is_temperature());
        assert!(!AlarmType::from_code(7).is_temperature());
    }

    #[test]
    fn test_state_mapping() {
        assert_eq!(AlarmState::from_code(1), AlarmState::Active);
        assert_eq!(AlarmState::from_code(99), AlarmState::Inactive);
    }
}
