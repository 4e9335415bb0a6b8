//! Device record decoding: common header, strategy registry, dispatch.
//!
//! The registry maps device type codes to their parameter and variable
//! decoders. It is built once at startup and only read afterwards;
//! lookups are pure. An unregistered type never fails the record: the
//! raw sub-payload is delivered as an `Unknown` variant so the other
//! devices in the same download still arrive.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PcmiError, Result};
use crate::models::device::{DeviceRecordHeader, DeviceType};
use crate::parsers::devices::{climate, misc, positional, sensors, DeviceParameters, DeviceVariables};
use crate::parsers::hex_reader::HexReader;
use crate::parsers::zone::format_nibbles;
use crate::protocol::constants::MAX_ZONES;
use crate::protocol::endian::Endian;

/// A decoded device parameter record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceParameterRecord {
    pub header: DeviceRecordHeader,
    pub data: DeviceParameters,
    /// Original hex payload, kept for diagnostics.
    pub raw_hex: String,
}

/// A decoded device variable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceVariableRecord {
    pub header: DeviceRecordHeader,
    pub data: DeviceVariables,
    /// Original hex payload, kept for diagnostics.
    pub raw_hex: String,
}

type ParamDecoder = fn(&mut HexReader<'_>) -> Result<DeviceParameters>;
type VarDecoder = fn(&mut HexReader<'_>) -> Result<DeviceVariables>;

/// Registry of per-device-type decoders.
pub struct DeviceRegistry {
    parameters: HashMap<DeviceType, ParamDecoder>,
    variables: HashMap<DeviceType, VarDecoder>,
}

impl DeviceRegistry {
    /// An empty registry. Registration is not concurrent-safe and is
    /// expected to happen at startup only.
    pub fn new() -> Self {
        Self {
            parameters: HashMap::new(),
            variables: HashMap::new(),
        }
    }

    /// A registry with decoders for all 20 built-in device types.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();

        registry.register(
            DeviceType::AirSensor,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::AirSensor(sensors::air_sensor_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::AirSensor(sensors::air_sensor_variables(r)?)),
        );
        registry.register(
            DeviceType::HumiditySensor,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::HumiditySensor(sensors::humidity_sensor_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::HumiditySensor(sensors::humidity_sensor_variables(r)?)),
        );
        registry.register(
            DeviceType::Inlet,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::Inlet(positional::inlet_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::Inlet(positional::inlet_variables(r)?)),
        );
        registry.register(
            DeviceType::Curtain,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::Curtain(positional::curtain_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::Curtain(positional::curtain_variables(r)?)),
        );
        registry.register(
            DeviceType::RidgeVent,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::RidgeVent(positional::ridge_vent_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::RidgeVent(positional::ridge_vent_variables(r)?)),
        );
        registry.register(
            DeviceType::Heater,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::Heater(climate::heater_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::Heater(climate::heater_variables(r)?)),
        );
        registry.register(
            DeviceType::CoolPad,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::CoolPad(climate::coolpad_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::CoolPad(climate::coolpad_variables(r)?)),
        );
        registry.register(
            DeviceType::Fan,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::Fan(climate::fan_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::Fan(climate::fan_variables(r)?)),
        );
        registry.register(
            DeviceType::Timed,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::Timed(misc::timed_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::Timed(misc::timed_variables(r)?)),
        );
        registry.register(
            DeviceType::FeedSensor,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::FeedSensor(sensors::feed_sensor_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::FeedSensor(sensors::feed_sensor_variables(r)?)),
        );
        registry.register(
            DeviceType::WaterSensor,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::WaterSensor(sensors::water_sensor_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::WaterSensor(sensors::water_sensor_variables(r)?)),
        );
        registry.register(
            DeviceType::StaticSensor,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::StaticSensor(sensors::static_sensor_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::StaticSensor(sensors::static_sensor_variables(r)?)),
        );
        registry.register(
            DeviceType::DigitalSensor,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::DigitalSensor(sensors::digital_sensor_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::DigitalSensor(sensors::digital_sensor_variables(r)?)),
        );
        registry.register(
            DeviceType::PositionSensor,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::PositionSensor(sensors::position_sensor_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::PositionSensor(sensors::position_sensor_variables(r)?)),
        );
        registry.register(
            DeviceType::Chimney,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::Chimney(positional::chimney_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::Chimney(positional::chimney_variables(r)?)),
        );
        registry.register(
            DeviceType::Switch,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::Switch(misc::switch_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::Switch(misc::switch_variables(r)?)),
        );
        registry.register(
            DeviceType::VariableHeater,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::VariableHeater(climate::variable_heater_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::VariableHeater(climate::variable_heater_variables(r)?)),
        );
        registry.register(
            DeviceType::VfdFan,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::VfdFan(climate::vfd_fan_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::VfdFan(climate::vfd_fan_variables(r)?)),
        );
        registry.register(
            DeviceType::V10Lights,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::V10Lights(misc::v10_lights_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::V10Lights(misc::v10_lights_variables(r)?)),
        );
        registry.register(
            DeviceType::GasSensor,
            |r: &mut HexReader<'_>| Ok(DeviceParameters::GasSensor(sensors::gas_sensor_parameters(r)?)),
            |r: &mut HexReader<'_>| Ok(DeviceVariables::GasSensor(sensors::gas_sensor_variables(r)?)),
        );

        registry
    }

    /// Register both decoders for a device type, replacing any existing
    /// registration.
    pub fn register(&mut self, device_type: DeviceType, parameters: ParamDecoder, variables: VarDecoder) {
        self.parameters.insert(device_type, parameters);
        self.variables.insert(device_type, variables);
    }

    pub fn parameter_decoder(&self, device_type: DeviceType) -> Option<ParamDecoder> {
        self.parameters.get(&device_type).copied()
    }

    pub fn variable_decoder(&self, device_type: DeviceType) -> Option<VarDecoder> {
        self.variables.get(&device_type).copied()
    }

    pub fn registered_types(&self) -> usize {
        self.parameters.len()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// Parse the common 8-byte device record header.
///
/// Layout: size u16, zone u8, record type u8, format/subtype nibbles,
/// device type u8, module address u8, channel u8. The reader is left
/// positioned at the device-specific data.
pub fn parse_device_header(reader: &mut HexReader<'_>) -> Result<DeviceRecordHeader> {
    let record_size_words = reader.read_u16()?;
    let zone_number = reader.read_byte()?;
    let record_type = reader.read_byte()?;

    let format_subtype = reader.read_byte()?;
    let record_format = format_subtype >> 4;
    let device_subtype = format_subtype & 0x0F;

    let device_type_code = reader.read_byte()?;
    let module_address = reader.read_byte()?;
    let channel_number = reader.read_byte()?;

    Ok(DeviceRecordHeader {
        record_size_words,
        zone_number,
        record_type,
        record_format,
        device_subtype,
        device_type: DeviceType::from_code(device_type_code),
        device_type_code,
        module_address,
        channel_number,
    })
}

/// Decode a device parameter record from its hex payload.
pub fn parse_device_parameters(hex: &str, registry: &DeviceRegistry) -> Result<DeviceParameterRecord> {
    let (record_format, _) = format_nibbles(hex)?;
    let mut reader = HexReader::new(hex, Endian::for_record_format(record_format))?;
    let header = parse_device_header(&mut reader)?;
    validate_device_header(&header, hex)?;

    let data = match registry.parameter_decoder(header.device_type) {
        Some(decode) => decode(&mut reader)?,
        None => DeviceParameters::Unknown {
            raw_hex: reader.read_remaining_hex().to_string(),
        },
    };

    Ok(DeviceParameterRecord {
        header,
        data,
        raw_hex: hex.to_string(),
    })
}

/// Decode a device variable record from its hex payload.
pub fn parse_device_variables(hex: &str, registry: &DeviceRegistry) -> Result<DeviceVariableRecord> {
    let (record_format, _) = format_nibbles(hex)?;
    let mut reader = HexReader::new(hex, Endian::for_record_format(record_format))?;
    let header = parse_device_header(&mut reader)?;
    validate_device_header(&header, hex)?;

    let data = match registry.variable_decoder(header.device_type) {
        Some(decode) => decode(&mut reader)?,
        None => DeviceVariables::Unknown {
            raw_hex: reader.read_remaining_hex().to_string(),
        },
    };

    Ok(DeviceVariableRecord {
        header,
        data,
        raw_hex: hex.to_string(),
    })
}

fn validate_device_header(header: &DeviceRecordHeader, hex: &str) -> Result<()> {
    if header.zone_number == 0 || header.zone_number > MAX_ZONES {
        return Err(PcmiError::parse(format!(
            "Device record has zone number {}, expected 1..={MAX_ZONES}",
            header.zone_number
        )));
    }
    let declared = usize::from(header.record_size_words) * 2;
    let actual = hex.len() / 2;
    if declared != actual {
        return Err(PcmiError::parse(format!(
            "Device record declares {declared} bytes but payload carries {actual}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::bytes_to_hex;

    /// Device record: 8-byte header + tail, big-endian (format nibble 2).
    fn device_payload(device_type_code: u8, tail: &[u8]) -> String {
        let total = 8 + tail.len();
        let mut data = Vec::with_capacity(total);
        data.extend_from_slice(&((total / 2) as u16).to_be_bytes());
        data.push(1); // zone
        data.push(0x05); // record type
        data.push(0x23); // format 2, subtype 3
        data.push(device_type_code);
        data.push(0x10); // module address
        data.push(0x02); // channel
        data.extend_from_slice(tail);
        bytes_to_hex(&data)
    }

    #[test]
    fn test_header_nibbles() {
        let hex = device_payload(8, &[0u8; 16]);
        let mut reader = HexReader::new(&hex, Endian::Swap).unwrap();
        let header = parse_device_header(&mut reader).unwrap();
        assert_eq!(header.record_format, 2);
        assert_eq!(header.device_subtype, 3);
        assert_eq!(header.device_type, DeviceType::Fan);
        assert_eq!(header.module_address, 0x10);
        assert_eq!(header.channel_number, 2);
        assert_eq!(reader.byte_position(), 8);
    }

    #[test]
    fn test_fan_parameter_dispatch() {
        // Fan tail: name u16, stage u8, rsvd, on/off i16, min on/off u16,
        // staging u16, mode u8, rsvd, cfm u16, bits u16 = 20 bytes.
        let tail = [
            0x00, 0x07, // name index 7
            0x02, 0x00, // stage 2
            0x00, 0x14, // on offset 2.0F
            0xFF, 0xEC, // off offset -2.0F
            0x00, 0x3C, // min on 60
            0x00, 0x1E, // min off 30
            0x00, 0x0A, // staging delay 10
            0x01, 0x00, // mode auto
            0x4E, 0x20, // cfm 20000
            0x00, 0x03, // control bits
        ];
        let hex = device_payload(8, &tail);
        let registry = DeviceRegistry::with_builtin();
        let record = parse_device_parameters(&hex, &registry).unwrap();

        let DeviceParameters::Fan(fan) = record.data else {
            panic!("expected fan parameters");
        };
        assert_eq!(fan.name_index, 7);
        assert_eq!(fan.stage_number, 2);
        assert_eq!(fan.on_temp_offset.fahrenheit(), Some(2.0));
        assert_eq!(fan.off_temp_offset.fahrenheit(), Some(-2.0));
        assert_eq!(fan.cfm_rating, 20000);
    }

    #[test]
    fn test_unknown_type_preserves_raw_tail() {
        let tail = [0xDE, 0xAD, 0xBE, 0xEF];
        let hex = device_payload(19, &tail); // reserved code
        let registry = DeviceRegistry::with_builtin();
        let record = parse_device_parameters(&hex, &registry).unwrap();

        assert_eq!(record.header.device_type, DeviceType::Unknown);
        assert_eq!(record.header.device_type_code, 19);
        let DeviceParameters::Unknown { raw_hex } = record.data else {
            panic!("expected unknown variant");
        };
        assert_eq!(raw_hex, "DEADBEEF");
    }

    #[test]
    fn test_variable_dispatch() {
        // Air sensor vars: temp i16 + status u16.
        let tail = [0x02, 0xD5, 0x00, 0x01];
        let hex = device_payload(1, &tail);
        let registry = DeviceRegistry::with_builtin();
        let record = parse_device_variables(&hex, &registry).unwrap();

        let DeviceVariables::AirSensor(vars) = record.data else {
            panic!("expected air sensor variables");
        };
        assert_eq!(vars.current_temperature.fahrenheit(), Some(72.5));
        assert_eq!(vars.sensor_status, 1);
    }

    #[test]
    fn test_builtin_registry_covers_known_types() {
        let registry = DeviceRegistry::with_builtin();
        assert_eq!(registry.registered_types(), 20);
        for ty in DeviceType::known_types() {
            assert!(registry.parameter_decoder(ty).is_some(), "{ty:?}");
            assert!(registry.variable_decoder(ty).is_some(), "{ty:?}");
        }
        assert!(registry.parameter_decoder(DeviceType::Unknown).is_none());
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let mut hex = device_payload(1, &[0u8; 4]);
        hex.push_str("0000"); // extra bytes not counted by the header
        let registry = DeviceRegistry::with_builtin();
        assert!(parse_device_parameters(&hex, &registry).is_err());
    }
}
