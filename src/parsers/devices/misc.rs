//! Remaining device decoders: timed devices, switches, and V10 lights.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parsers::hex_reader::HexReader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedParameters {
    pub name_index: u16,
    /// Clock schedules in minutes past midnight.
    pub on_time_1: u16,
    pub off_time_1: u16,
    pub on_time_2: u16,
    pub off_time_2: u16,
    /// Cycle times in seconds.
    pub cycle_on_time: u16,
    pub cycle_off_time: u16,
    pub mode: u8,
    pub control_bits: u16,
}

pub(crate) fn timed_parameters(reader: &mut HexReader<'_>) -> Result<TimedParameters> {
    let name_index = reader.read_u16()?;
    let on_time_1 = reader.read_u16()?;
    let off_time_1 = reader.read_u16()?;
    let on_time_2 = reader.read_u16()?;
    let off_time_2 = reader.read_u16()?;
    let cycle_on_time = reader.read_u16()?;
    let cycle_off_time = reader.read_u16()?;
    let mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(TimedParameters {
        name_index,
        on_time_1,
        off_time_1,
        on_time_2,
        off_time_2,
        cycle_on_time,
        cycle_off_time,
        mode,
        control_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedVariables {
    pub status: u16,
    pub runtime_today: u16,
    pub cycles_today: u16,
    /// Seconds until the next scheduled transition.
    pub time_until_next: u16,
}

pub(crate) fn timed_variables(reader: &mut HexReader<'_>) -> Result<TimedVariables> {
    Ok(TimedVariables {
        status: reader.read_u16()?,
        runtime_today: reader.read_u16()?,
        cycles_today: reader.read_u16()?,
        time_until_next: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchParameters {
    pub name_index: u16,
    pub mode: u8,
    pub min_on_time: u16,
    pub min_off_time: u16,
    pub control_bits: u16,
    pub interlock_bits: u16,
}

pub(crate) fn switch_parameters(reader: &mut HexReader<'_>) -> Result<SwitchParameters> {
    let name_index = reader.read_u16()?;
    let mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(SwitchParameters {
        name_index,
        mode,
        min_on_time: reader.read_u16()?,
        min_off_time: reader.read_u16()?,
        control_bits: reader.read_u16()?,
        interlock_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchVariables {
    pub status: u16,
    pub runtime_today: u16,
    pub cycles_today: u16,
}

pub(crate) fn switch_variables(reader: &mut HexReader<'_>) -> Result<SwitchVariables> {
    Ok(SwitchVariables {
        status: reader.read_u16()?,
        runtime_today: reader.read_u16()?,
        cycles_today: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V10LightsParameters {
    pub name_index: u16,
    /// Schedule in minutes past midnight.
    pub on_time: u16,
    pub off_time: u16,
    /// Intensities in percent.
    pub on_intensity: u8,
    pub off_intensity: u8,
    /// Dimming ramp durations in minutes.
    pub sunrise_duration: u16,
    pub sunset_duration: u16,
    pub mode: u8,
    pub control_bits: u16,
}

pub(crate) fn v10_lights_parameters(reader: &mut HexReader<'_>) -> Result<V10LightsParameters> {
    let name_index = reader.read_u16()?;
    let on_time = reader.read_u16()?;
    let off_time = reader.read_u16()?;
    let on_intensity = reader.read_byte()?;
    let off_intensity = reader.read_byte()?;
    let sunrise_duration = reader.read_u16()?;
    let sunset_duration = reader.read_u16()?;
    let mode = reader.read_byte()?;
    reader.skip_bytes(1)?; // reserved
    Ok(V10LightsParameters {
        name_index,
        on_time,
        off_time,
        on_intensity,
        off_intensity,
        sunrise_duration,
        sunset_duration,
        mode,
        control_bits: reader.read_u16()?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V10LightsVariables {
    pub status: u16,
    pub current_intensity: u8,
    pub target_intensity: u8,
    pub runtime_today: u16,
}

pub(crate) fn v10_lights_variables(reader: &mut HexReader<'_>) -> Result<V10LightsVariables> {
    Ok(V10LightsVariables {
        status: reader.read_u16()?,
        current_intensity: reader.read_byte()?,
        target_intensity: reader.read_byte()?,
        runtime_today: reader.read_u16()?,
    })
}
