//! Climate control device decoders: heaters, cool pads, fans, variable
//! heaters, and VFD fans.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::temperature::Temperature;
use crate::parsers::hex_reader::HexReader;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaterParameters {
    pub name_index: u16,
    pub on_temp_offset: Temperature,
    pub off_temp_offset: Temperature,
    pub min_on_time: u16,
    pub min_off_time: u16,
    pub mode: u8,
    pub btu_rating: u32,
    pub control_bits: u16,
    pub interlock_bits: u16,
}

pub(crate) fn heater_parameters(reader: &mut HexReader<'_>) -> Result<HeaterParameters> {
    let name_index = reader.read_u16()?;
    let on_temp_offset = Temperature::from_raw(reader.read_i16()?);
    let off_temp_offset = Temperature::from_raw(reader.read_i16()?);
    let min_on_time = reader.read_u16()?;
    let min_off_time = reader.read_u16()?;
    let mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(HeaterParameters {
        name_index,
        on_temp_offset,
        off_temp_offset,
        min_on_time,
        min_off_time,
        mode,
        btu_rating: reader.read_u32()?,
        control_bits: reader.read_u16()?,
        interlock_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaterVariables {
    pub status: u16,
    pub runtime_today: u16,
    pub runtime_total: u16,
    pub cycles_today: u16,
    pub fuel_usage_today: u16,
}

pub(crate) fn heater_variables(reader: &mut HexReader<'_>) -> Result<HeaterVariables> {
    Ok(HeaterVariables {
        status: reader.read_u16()?,
        runtime_today: reader.read_u16()?,
        runtime_total: reader.read_u16()?,
        cycles_today: reader.read_u16()?,
        fuel_usage_today: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoolPadParameters {
    pub name_index: u16,
    pub on_temp_offset: Temperature,
    pub off_temp_offset: Temperature,
    pub min_on_time: u16,
    pub min_off_time: u16,
    pub purge_time: u16,
    pub purge_interval: u16,
    pub mode: u8,
    /// Humidity percent above which the pad stays off.
    pub humidity_lockout: u8,
    pub control_bits: u16,
}

pub(crate) fn coolpad_parameters(reader: &mut HexReader<'_>) -> Result<CoolPadParameters> {
    Ok(CoolPadParameters {
        name_index: reader.read_u16()?,
        on_temp_offset: Temperature::from_raw(reader.read_i16()?),
        off_temp_offset: Temperature::from_raw(reader.read_i16()?),
        min_on_time: reader.read_u16()?,
        min_off_time: reader.read_u16()?,
        purge_time: reader.read_u16()?,
        purge_interval: reader.read_u16()?,
        mode: reader.read_byte()?,
        humidity_lockout: reader.read_byte()?,
        control_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoolPadVariables {
    pub status: u16,
    pub runtime_today: u16,
    pub cycles_today: u16,
    pub water_usage_today: u16,
}

pub(crate) fn coolpad_variables(reader: &mut HexReader<'_>) -> Result<CoolPadVariables> {
    Ok(CoolPadVariables {
        status: reader.read_u16()?,
        runtime_today: reader.read_u16()?,
        cycles_today: reader.read_u16()?,
        water_usage_today: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanParameters {
    pub name_index: u16,
    /// Staging order, 1-based.
    pub stage_number: u8,
    pub on_temp_offset: Temperature,
    pub off_temp_offset: Temperature,
    pub min_on_time: u16,
    pub min_off_time: u16,
    pub staging_delay: u16,
    pub mode: u8,
    pub cfm_rating: u16,
    pub control_bits: u16,
}

pub(crate) fn fan_parameters(reader: &mut HexReader<'_>) -> Result<FanParameters> {
    let name_index = reader.read_u16()?;
    let stage_number = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    let on_temp_offset = Temperature::from_raw(reader.read_i16()?);
    let off_temp_offset = Temperature::from_raw(reader.read_i16()?);
    let min_on_time = reader.read_u16()?;
    let min_off_time = reader.read_u16()?;
    let staging_delay = reader.read_u16()?;
    let mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(FanParameters {
        name_index,
        stage_number,
        on_temp_offset,
        off_temp_offset,
        min_on_time,
        min_off_time,
        staging_delay,
        mode,
        cfm_rating: reader.read_u16()?,
        control_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanVariables {
    pub status: u16,
    pub runtime_today: u16,
    pub runtime_total: u16,
    pub cycles_today: u16,
    pub current_stage: u8,
    pub remaining_delay: u16,
}

pub(crate) fn fan_variables(reader: &mut HexReader<'_>) -> Result<FanVariables> {
    let status = reader.read_u16()?;
    let runtime_today = reader.read_u16()?;
    let runtime_total = reader.read_u16()?;
    let cycles_today = reader.read_u16()?;
    let current_stage = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(FanVariables {
        status,
        runtime_today,
        runtime_total,
        cycles_today,
        current_stage,
        remaining_delay: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableHeaterParameters {
    pub name_index: u16,
    pub on_temp_offset: Temperature,
    pub off_temp_offset: Temperature,
    /// Fire rate limits in percent.
    pub min_fire_rate: u8,
    pub max_fire_rate: u8,
    pub degrees_per_percent: u8,
    pub min_on_time: u16,
    pub min_off_time: u16,
    pub mode: u8,
    pub btu_rating: u32,
    pub control_bits: u16,
    pub interlock_bits: u16,
}

pub(crate) fn variable_heater_parameters(reader: &mut HexReader<'_>) -> Result<VariableHeaterParameters> {
    let name_index = reader.read_u16()?;
    let on_temp_offset = Temperature::from_raw(reader.read_i16()?);
    let off_temp_offset = Temperature::from_raw(reader.read_i16()?);
    let min_fire_rate = reader.read_byte()?;
    let max_fire_rate = reader.read_byte()?;
    let degrees_per_percent = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    let min_on_time = reader.read_u16()?;
    let min_off_time = reader.read_u16()?;
    let mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(VariableHeaterParameters {
        name_index,
        on_temp_offset,
        off_temp_offset,
        min_fire_rate,
        max_fire_rate,
        degrees_per_percent,
        min_on_time,
        min_off_time,
        mode,
        btu_rating: reader.read_u32()?,
        control_bits: reader.read_u16()?,
        interlock_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableHeaterVariables {
    pub status: u16,
    /// Output levels in percent.
    pub current_output: u8,
    pub target_output: u8,
    pub runtime_today: u16,
    pub fuel_usage_today: u16,
}

pub(crate) fn variable_heater_variables(reader: &mut HexReader<'_>) -> Result<VariableHeaterVariables> {
    Ok(VariableHeaterVariables {
        status: reader.read_u16()?,
        current_output: reader.read_byte()?,
        target_output: reader.read_byte()?,
        runtime_today: reader.read_u16()?,
        fuel_usage_today: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VfdFanParameters {
    pub name_index: u16,
    pub on_temp_offset: Temperature,
    /// Speed limits in percent.
    pub min_speed: u8,
    pub max_speed: u8,
    pub speed_per_degree: u8,
    pub ramp_time: u16,
    pub min_on_time: u16,
    pub min_off_time: u16,
    pub mode: u8,
    pub cfm_at_100: u16,
    pub control_bits: u16,
}

pub(crate) fn vfd_fan_parameters(reader: &mut HexReader<'_>) -> Result<VfdFanParameters> {
    let name_index = reader.read_u16()?;
    let on_temp_offset = Temperature::from_raw(reader.read_i16()?);
    let min_speed = reader.read_byte()?;
    let max_speed = reader.read_byte()?;
    let speed_per_degree = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    let ramp_time = reader.read_u16()?;
    let min_on_time = reader.read_u16()?;
    let min_off_time = reader.read_u16()?;
    let mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(VfdFanParameters {
        name_index,
        on_temp_offset,
        min_speed,
        max_speed,
        speed_per_degree,
        ramp_time,
        min_on_time,
        min_off_time,
        mode,
        cfm_at_100: reader.read_u16()?,
        control_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VfdFanVariables {
    pub status: u16,
    /// Speeds in percent.
    pub current_speed: u8,
    pub target_speed: u8,
    pub runtime_today: u16,
    pub runtime_total: u16,
}

pub(crate) fn vfd_fan_variables(reader: &mut HexReader<'_>) -> Result<VfdFanVariables> {
    Ok(VfdFanVariables {
        status: reader.read_u16()?,
        current_speed: reader.read_byte()?,
        target_speed: reader.read_byte()?,
        runtime_today: reader.read_u16()?,
        runtime_total: reader.read_u16()?,
    })
}
