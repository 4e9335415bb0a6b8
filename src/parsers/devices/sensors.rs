//! Sensor device decoders: air, humidity, static pressure, digital,
//! position, feed, water, and gas sensors.
//!
//! Each decoder starts where the common device header ends. Parameter
//! records lead with a name-table index; variable records lead with the
//! live reading.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::temperature::Temperature;
use crate::parsers::hex_reader::HexReader;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirSensorParameters {
    pub name_index: u16,
    pub calibration_offset: Temperature,
    pub sensor_type: u8,
}

pub(crate) fn air_sensor_parameters(reader: &mut HexReader<'_>) -> Result<AirSensorParameters> {
    Ok(AirSensorParameters {
        name_index: reader.read_u16()?,
        calibration_offset: Temperature::from_raw(reader.read_i16()?),
        sensor_type: reader.read_byte()?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirSensorVariables {
    pub current_temperature: Temperature,
    pub sensor_status: u16,
}

pub(crate) fn air_sensor_variables(reader: &mut HexReader<'_>) -> Result<AirSensorVariables> {
    Ok(AirSensorVariables {
        current_temperature: Temperature::from_raw(reader.read_i16()?),
        sensor_status: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumiditySensorParameters {
    pub name_index: u16,
    pub temp_calibration_offset: Temperature,
    /// Humidity calibration in percent.
    pub humidity_calibration_offset: u8,
    pub sensor_type: u8,
}

pub(crate) fn humidity_sensor_parameters(reader: &mut HexReader<'_>) -> Result<HumiditySensorParameters> {
    Ok(HumiditySensorParameters {
        name_index: reader.read_u16()?,
        temp_calibration_offset: Temperature::from_raw(reader.read_i16()?),
        humidity_calibration_offset: reader.read_byte()?,
        sensor_type: reader.read_byte()?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumiditySensorVariables {
    pub current_temperature: Temperature,
    /// Relative humidity percent.
    pub current_humidity: u8,
    pub sensor_status: u16,
}

pub(crate) fn humidity_sensor_variables(reader: &mut HexReader<'_>) -> Result<HumiditySensorVariables> {
    let current_temperature = Temperature::from_raw(reader.read_i16()?);
    let current_humidity = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(HumiditySensorVariables {
        current_temperature,
        current_humidity,
        sensor_status: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSensorParameters {
    pub name_index: u16,
    /// Calibration offset in hundredths of an inch WC.
    pub calibration_offset: i16,
    pub high_alarm_setpoint: u16,
    pub low_alarm_setpoint: u16,
    pub sensor_type: u8,
}

pub(crate) fn static_sensor_parameters(reader: &mut HexReader<'_>) -> Result<StaticSensorParameters> {
    let name_index = reader.read_u16()?;
    let calibration_offset = reader.read_i16()?;
    let high_alarm_setpoint = reader.read_u16()?;
    let low_alarm_setpoint = reader.read_u16()?;
    let sensor_type = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(StaticSensorParameters {
        name_index,
        calibration_offset,
        high_alarm_setpoint,
        low_alarm_setpoint,
        sensor_type,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSensorVariables {
    /// Current reading in hundredths of an inch WC.
    pub current_reading: i16,
    pub sensor_status: u16,
}

pub(crate) fn static_sensor_variables(reader: &mut HexReader<'_>) -> Result<StaticSensorVariables> {
    Ok(StaticSensorVariables {
        current_reading: reader.read_i16()?,
        sensor_status: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalSensorParameters {
    pub name_index: u16,
    pub sensor_type: u8,
    pub invert_logic: bool,
    pub alarm_on_active: bool,
    pub alarm_delay: u16,
}

pub(crate) fn digital_sensor_parameters(reader: &mut HexReader<'_>) -> Result<DigitalSensorParameters> {
    let name_index = reader.read_u16()?;
    let sensor_type = reader.read_byte()?;
    let flags = reader.read_byte()?;
    Ok(DigitalSensorParameters {
        name_index,
        sensor_type,
        invert_logic: flags & 0x01 != 0,
        alarm_on_active: flags & 0x02 != 0,
        alarm_delay: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalSensorVariables {
    pub current_state: u8,
    pub on_count_today: u16,
    pub total_on_time: u16,
}

pub(crate) fn digital_sensor_variables(reader: &mut HexReader<'_>) -> Result<DigitalSensorVariables> {
    let current_state = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(DigitalSensorVariables {
        current_state,
        on_count_today: reader.read_u16()?,
        total_on_time: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSensorParameters {
    pub name_index: u16,
    pub min_raw_value: u16,
    pub max_raw_value: u16,
    /// Index of the device this sensor gives feedback for.
    pub linked_device: u16,
    pub sensor_type: u8,
}

pub(crate) fn position_sensor_parameters(reader: &mut HexReader<'_>) -> Result<PositionSensorParameters> {
    let name_index = reader.read_u16()?;
    let min_raw_value = reader.read_u16()?;
    let max_raw_value = reader.read_u16()?;
    let linked_device = reader.read_u16()?;
    let sensor_type = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(PositionSensorParameters {
        name_index,
        min_raw_value,
        max_raw_value,
        linked_device,
        sensor_type,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSensorVariables {
    pub raw_value: u16,
    /// Position as percent open.
    pub calculated_position: u8,
    pub sensor_status: u16,
}

pub(crate) fn position_sensor_variables(reader: &mut HexReader<'_>) -> Result<PositionSensorVariables> {
    let raw_value = reader.read_u16()?;
    let calculated_position = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(PositionSensorVariables {
        raw_value,
        calculated_position,
        sensor_status: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSensorParameters {
    pub name_index: u16,
    pub bin_capacity: u32,
    /// Low level alarm threshold in percent.
    pub low_level_alarm: u8,
    pub sensor_type: u8,
    pub calibration_factor: u16,
}

pub(crate) fn feed_sensor_parameters(reader: &mut HexReader<'_>) -> Result<FeedSensorParameters> {
    Ok(FeedSensorParameters {
        name_index: reader.read_u16()?,
        bin_capacity: reader.read_u32()?,
        low_level_alarm: reader.read_byte()?,
        sensor_type: reader.read_byte()?,
        calibration_factor: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSensorVariables {
    /// Current bin level in percent.
    pub current_level: u8,
    pub consumption_today: u32,
    pub consumption_total: u32,
    pub sensor_status: u16,
}

pub(crate) fn feed_sensor_variables(reader: &mut HexReader<'_>) -> Result<FeedSensorVariables> {
    let current_level = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(FeedSensorVariables {
        current_level,
        consumption_today: reader.read_u32()?,
        consumption_total: reader.read_u32()?,
        sensor_status: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterSensorParameters {
    pub name_index: u16,
    pub pulses_per_gallon: u16,
    pub high_flow_alarm: u16,
    /// Minutes of no flow before alarming.
    pub no_flow_alarm_time: u16,
    pub sensor_type: u8,
}

pub(crate) fn water_sensor_parameters(reader: &mut HexReader<'_>) -> Result<WaterSensorParameters> {
    let name_index = reader.read_u16()?;
    let pulses_per_gallon = reader.read_u16()?;
    let high_flow_alarm = reader.read_u16()?;
    let no_flow_alarm_time = reader.read_u16()?;
    let sensor_type = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(WaterSensorParameters {
        name_index,
        pulses_per_gallon,
        high_flow_alarm,
        no_flow_alarm_time,
        sensor_type,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterSensorVariables {
    pub flow_rate: u16,
    pub consumption_today: u32,
    pub consumption_total: u32,
    pub sensor_status: u16,
}

pub(crate) fn water_sensor_variables(reader: &mut HexReader<'_>) -> Result<WaterSensorVariables> {
    Ok(WaterSensorVariables {
        flow_rate: reader.read_u16()?,
        consumption_today: reader.read_u32()?,
        consumption_total: reader.read_u32()?,
        sensor_status: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasSensorParameters {
    pub name_index: u16,
    /// Which gas: CO2, NH3, and so on, per controller firmware.
    pub gas_type: u8,
    pub high_alarm_level: u16,
    pub ventilation_trigger: u16,
    pub calibration_offset: i16,
    pub sensor_type: u8,
}

pub(crate) fn gas_sensor_parameters(reader: &mut HexReader<'_>) -> Result<GasSensorParameters> {
    let name_index = reader.read_u16()?;
    let gas_type = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    let high_alarm_level = reader.read_u16()?;
    let ventilation_trigger = reader.read_u16()?;
    let calibration_offset = reader.read_i16()?;
    let sensor_type = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(GasSensorParameters {
        name_index,
        gas_type,
        high_alarm_level,
        ventilation_trigger,
        calibration_offset,
        sensor_type,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasSensorVariables {
    pub current_level: u16,
    pub peak_level_today: u16,
    pub sensor_status: u16,
}

pub(crate) fn gas_sensor_variables(reader: &mut HexReader<'_>) -> Result<GasSensorVariables> {
    Ok(GasSensorVariables {
        current_level: reader.read_u16()?,
        peak_level_today: reader.read_u16()?,
        sensor_status: reader.read_u16()?,
    })
}
