//! Per-device-type record payloads.
//!
//! Each known device type has a parameter decoder and a variable
//! decoder, reading the type-specific tail that follows the common
//! device header. The decoded data is carried as one tagged variant per
//! type; devices the registry does not know arrive as `Unknown` with
//! their raw sub-payload preserved.

pub mod climate;
pub mod misc;
pub mod positional;
pub mod sensors;

use serde::{Deserialize, Serialize};

pub use climate::{
    CoolPadParameters, CoolPadVariables, FanParameters, FanVariables, HeaterParameters, HeaterVariables,
    VariableHeaterParameters, VariableHeaterVariables, VfdFanParameters, VfdFanVariables,
};
pub use misc::{
    SwitchParameters, SwitchVariables, TimedParameters, TimedVariables, V10LightsParameters, V10LightsVariables,
};
pub use positional::{
    ChimneyParameters, ChimneyVariables, CurtainParameters, CurtainVariables, InletParameters, InletVariables,
    RidgeVentParameters, RidgeVentVariables,
};
pub use sensors::{
    AirSensorParameters, AirSensorVariables, DigitalSensorParameters, DigitalSensorVariables, FeedSensorParameters,
    FeedSensorVariables, GasSensorParameters, GasSensorVariables, HumiditySensorParameters, HumiditySensorVariables,
    PositionSensorParameters, PositionSensorVariables, StaticSensorParameters, StaticSensorVariables,
    WaterSensorParameters, WaterSensorVariables,
};

/// Device-specific configuration data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceParameters {
    AirSensor(AirSensorParameters),
    HumiditySensor(HumiditySensorParameters),
    Inlet(InletParameters),
    Curtain(CurtainParameters),
    RidgeVent(RidgeVentParameters),
    Heater(HeaterParameters),
    CoolPad(CoolPadParameters),
    Fan(FanParameters),
    Timed(TimedParameters),
    FeedSensor(FeedSensorParameters),
    WaterSensor(WaterSensorParameters),
    StaticSensor(StaticSensorParameters),
    DigitalSensor(DigitalSensorParameters),
    PositionSensor(PositionSensorParameters),
    Chimney(ChimneyParameters),
    Switch(SwitchParameters),
    VariableHeater(VariableHeaterParameters),
    VfdFan(VfdFanParameters),
    V10Lights(V10LightsParameters),
    GasSensor(GasSensorParameters),
    /// No decoder registered for the type; raw sub-payload preserved.
    Unknown { raw_hex: String },
}

/// Device-specific runtime data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceVariables {
    AirSensor(AirSensorVariables),
    HumiditySensor(HumiditySensorVariables),
    Inlet(InletVariables),
    Curtain(CurtainVariables),
    RidgeVent(RidgeVentVariables),
    Heater(HeaterVariables),
    CoolPad(CoolPadVariables),
    Fan(FanVariables),
    Timed(TimedVariables),
    FeedSensor(FeedSensorVariables),
    WaterSensor(WaterSensorVariables),
    StaticSensor(StaticSensorVariables),
    DigitalSensor(DigitalSensorVariables),
    PositionSensor(PositionSensorVariables),
    Chimney(ChimneyVariables),
    Switch(SwitchVariables),
    VariableHeater(VariableHeaterVariables),
    VfdFan(VfdFanVariables),
    V10Lights(V10LightsVariables),
    GasSensor(GasSensorVariables),
    /// No decoder registered for the type; raw sub-payload preserved.
    Unknown { raw_hex: String },
}
