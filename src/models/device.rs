//! Device identity: type codes and the common device record header.

use serde::{Deserialize, Serialize};

/// Device types a PCMI controller can report.
///
/// Codes 17..=24 are reserved in current firmware. Codes outside the
/// known set map to [`DeviceType::Unknown`]; their records are still
/// delivered with their raw payload attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    Unknown,
    AirSensor,
    HumiditySensor,
    Inlet,
    Curtain,
    RidgeVent,
    Heater,
    CoolPad,
    Fan,
    Timed,
    FeedSensor,
    WaterSensor,
    StaticSensor,
    DigitalSensor,
    PositionSensor,
    Chimney,
    Switch,
    VariableHeater,
    VfdFan,
    V10Lights,
    GasSensor,
}

impl DeviceType {
    /// Map a wire type code to a device type.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::AirSensor,
            2 => Self::HumiditySensor,
            3 => Self::Inlet,
            4 => Self::Curtain,
            5 => Self::RidgeVent,
            6 => Self::Heater,
            7 => Self::CoolPad,
            8 => Self::Fan,
            9 => Self::Timed,
            10 => Self::FeedSensor,
            11 => Self::WaterSensor,
            12 => Self::StaticSensor,
            13 => Self::DigitalSensor,
            14 => Self::PositionSensor,
            15 => Self::Chimney,
            16 => Self::Switch,
            25 => Self::VariableHeater,
            26 => Self::VfdFan,
            27 => Self::V10Lights,
            28 => Self::GasSensor,
            _ => Self::Unknown,
        }
    }

    /// The wire type code for this device type.
    pub fn code(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::AirSensor => 1,
            Self::HumiditySensor => 2,
            Self::Inlet => 3,
            Self::Curtain => 4,
            Self::RidgeVent => 5,
            Self::Heater => 6,
            Self::CoolPad => 7,
            Self::Fan => 8,
            Self::Timed => 9,
            Self::FeedSensor => 10,
            Self::WaterSensor => 11,
            Self::StaticSensor => 12,
            Self::DigitalSensor => 13,
            Self::PositionSensor => 14,
            Self::Chimney => 15,
            Self::Switch => 16,
            Self::VariableHeater => 25,
            Self::VfdFan => 26,
            Self::V10Lights => 27,
            Self::GasSensor => 28,
        }
    }

    /// All types with built-in decoders, in code order.
    pub fn known_types() -> [DeviceType; 20] {
        [
            Self::AirSensor,
            Self::HumiditySensor,
            Self::Inlet,
            Self::Curtain,
            Self::RidgeVent,
            Self::Heater,
            Self::CoolPad,
            Self::Fan,
            Self::Timed,
            Self::FeedSensor,
            Self::WaterSensor,
            Self::StaticSensor,
            Self::DigitalSensor,
            Self::PositionSensor,
            Self::Chimney,
            Self::Switch,
            Self::VariableHeater,
            Self::VfdFan,
            Self::V10Lights,
            Self::GasSensor,
        ]
    }
}

/// Common header on every device parameter/variable record.
///
/// Header byte 4 packs the record format in the high nibble and the
/// device subtype in the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecordHeader {
    pub record_size_words: u16,
    /// Zone the device belongs to, 1..=9.
    pub zone_number: u8,
    pub record_type: u8,
    pub record_format: u8,
    pub device_subtype: u8,
    pub device_type: DeviceType,
    /// Raw device type byte, kept for unknown types.
    pub device_type_code: u8,
    /// Module address on the RS-485 device bus.
    pub module_address: u8,
    /// Channel number on the module.
    pub channel_number: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for ty in DeviceType::known_types() {
            assert_eq!(DeviceType::from_code(ty.code()), ty);
        }
    }

    #[test]
    fn test_reserved_codes_are_unknown() {
        for code in 17..=24 {
            assert_eq!(DeviceType::from_code(code), DeviceType::Unknown);
        }
        assert_eq!(DeviceType::from_code(0), DeviceType::Unknown);
        assert_eq!(DeviceType::from_code(200), DeviceType::Unknown);
    }
}
