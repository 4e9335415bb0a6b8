//! Positional device decoders: inlets, curtains, ridge vents, chimneys.
//!
//! These share a common shape: position limits, travel times, a control
//! mode, and a temperature/static control law. Variable records report
//! current and target position.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::temperature::Temperature;
use crate::parsers::hex_reader::HexReader;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InletParameters {
    pub name_index: u16,
    pub min_position: u8,
    pub max_position: u8,
    /// Full-travel open time in seconds.
    pub open_time: u16,
    pub close_time: u16,
    pub control_mode: u8,
    /// Static pressure target in hundredths of an inch WC.
    pub static_setpoint: u16,
    pub temp_offset: Temperature,
    pub position_per_degree: u8,
    pub control_bits: u16,
}

pub(crate) fn inlet_parameters(reader: &mut HexReader<'_>) -> Result<InletParameters> {
    let name_index = reader.read_u16()?;
    let min_position = reader.read_byte()?;
    let max_position = reader.read_byte()?;
    let open_time = reader.read_u16()?;
    let close_time = reader.read_u16()?;
    let control_mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    let static_setpoint = reader.read_u16()?;
    let temp_offset = Temperature::from_raw(reader.read_i16()?);
    let position_per_degree = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(InletParameters {
        name_index,
        min_position,
        max_position,
        open_time,
        close_time,
        control_mode,
        static_setpoint,
        temp_offset,
        position_per_degree,
        control_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InletVariables {
    pub status: u16,
    pub current_position: u8,
    pub target_position: u8,
    pub static_reading: u16,
    pub runtime_today: u16,
}

pub(crate) fn inlet_variables(reader: &mut HexReader<'_>) -> Result<InletVariables> {
    Ok(InletVariables {
        status: reader.read_u16()?,
        current_position: reader.read_byte()?,
        target_position: reader.read_byte()?,
        static_reading: reader.read_u16()?,
        runtime_today: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurtainParameters {
    pub name_index: u16,
    pub min_position: u8,
    pub max_position: u8,
    pub open_time: u16,
    pub close_time: u16,
    pub control_mode: u8,
    pub static_setpoint: u16,
    pub temp_offset: Temperature,
    pub position_per_degree: u8,
    /// Wind speed that forces the curtain closed.
    pub wind_close_speed: u8,
    pub control_bits: u16,
}

pub(crate) fn curtain_parameters(reader: &mut HexReader<'_>) -> Result<CurtainParameters> {
    let name_index = reader.read_u16()?;
    let min_position = reader.read_byte()?;
    let max_position = reader.read_byte()?;
    let open_time = reader.read_u16()?;
    let close_time = reader.read_u16()?;
    let control_mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    let static_setpoint = reader.read_u16()?;
    let temp_offset = Temperature::from_raw(reader.read_i16()?);
    let position_per_degree = reader.read_byte()?;
    let wind_close_speed = reader.read_byte()?;
    Ok(CurtainParameters {
        name_index,
        min_position,
        max_position,
        open_time,
        close_time,
        control_mode,
        static_setpoint,
        temp_offset,
        position_per_degree,
        wind_close_speed,
        control_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurtainVariables {
    pub status: u16,
    pub current_position: u8,
    pub target_position: u8,
    pub runtime_today: u16,
}

pub(crate) fn curtain_variables(reader: &mut HexReader<'_>) -> Result<CurtainVariables> {
    Ok(CurtainVariables {
        status: reader.read_u16()?,
        current_position: reader.read_byte()?,
        target_position: reader.read_byte()?,
        runtime_today: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeVentParameters {
    pub name_index: u16,
    pub min_position: u8,
    pub max_position: u8,
    pub open_time: u16,
    pub close_time: u16,
    pub control_mode: u8,
    pub temp_offset: Temperature,
    pub position_per_degree: u8,
    pub control_bits: u16,
}

pub(crate) fn ridge_vent_parameters(reader: &mut HexReader<'_>) -> Result<RidgeVentParameters> {
    let name_index = reader.read_u16()?;
    let min_position = reader.read_byte()?;
    let max_position = reader.read_byte()?;
    let open_time = reader.read_u16()?;
    let close_time = reader.read_u16()?;
    let control_mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    let temp_offset = Temperature::from_raw(reader.read_i16()?);
    let position_per_degree = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(RidgeVentParameters {
        name_index,
        min_position,
        max_position,
        open_time,
        close_time,
        control_mode,
        temp_offset,
        position_per_degree,
        control_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RidgeVentVariables {
    pub status: u16,
    pub current_position: u8,
    pub target_position: u8,
    pub runtime_today: u16,
}

pub(crate) fn ridge_vent_variables(reader: &mut HexReader<'_>) -> Result<RidgeVentVariables> {
    Ok(RidgeVentVariables {
        status: reader.read_u16()?,
        current_position: reader.read_byte()?,
        target_position: reader.read_byte()?,
        runtime_today: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChimneyParameters {
    pub name_index: u16,
    pub min_position: u8,
    pub max_position: u8,
    pub open_time: u16,
    pub close_time: u16,
    pub control_mode: u8,
    pub temp_offset: Temperature,
    pub position_per_degree: u8,
    /// Minimum ventilation position in percent.
    pub min_vent_position: u8,
    pub control_bits: u16,
}

pub(crate) fn chimney_parameters(reader: &mut HexReader<'_>) -> Result<ChimneyParameters> {
    let name_index = reader.read_u16()?;
    let min_position = reader.read_byte()?;
    let max_position = reader.read_byte()?;
    let open_time = reader.read_u16()?;
    let close_time = reader.read_u16()?;
    let control_mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    let temp_offset = Temperature::from_raw(reader.read_i16()?);
    let position_per_degree = reader.read_byte()?;
    let min_vent_position = reader.read_byte()?;
    Ok(ChimneyParameters {
        name_index,
        min_position,
        max_position,
        open_time,
        close_time,
        control_mode,
        temp_offset,
        position_per_degree,
        min_vent_position,
        control_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChimneyVariables {
    pub status: u16,
    pub current_position: u8,
    pub target_position: u8,
    pub runtime_today: u16,
}

pub(crate) fn chimney_variables(reader: &mut HexReader<'_>) -> Result<ChimneyVariables> {
    Ok(ChimneyVariables {
        status: reader.read_u16()?,
        current_position: reader.read_byte()?,
        target_position: reader.read_byte()?,
        runtime_today: reader.read_u16()?,
    })
}
