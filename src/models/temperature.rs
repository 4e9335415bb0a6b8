//! Temperature value type.

use serde::{Deserialize, Serialize};

use crate::error::{PcmiError, Result};
use crate::protocol::constants::NAN_TEMP;

/// Temperature with 0.1 degree precision.
///
/// The wire format is a signed 16-bit value in tenths of a degree
/// Fahrenheit. The value 0x7FFF marks a sensor error ("NaN") and is
/// preserved verbatim rather than clamped; conversions return `None`
/// for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temperature {
    /// Raw value in tenths of a degree Fahrenheit.
    pub raw: i16,
}

impl Temperature {
    /// The sensor-error sentinel.
    pub const NAN_VALUE: i16 = NAN_TEMP;

    /// Wrap a raw wire value.
    pub fn from_raw(raw: i16) -> Self {
        Self { raw }
    }

    /// The NaN (sensor error) temperature.
    pub fn nan() -> Self {
        Self { raw: Self::NAN_VALUE }
    }

    /// True if this value is the sensor-error sentinel.
    pub fn is_nan(&self) -> bool {
        self.raw == Self::NAN_VALUE
    }

    /// Degrees Fahrenheit, or `None` for a sensor error.
    pub fn fahrenheit(&self) -> Option<f64> {
        if self.is_nan() {
            None
        } else {
            Some(f64::from(self.raw) / 10.0)
        }
    }

    /// Degrees Celsius, or `None` for a sensor error.
    pub fn celsius(&self) -> Option<f64> {
        self.fahrenheit().map(|f| (f - 32.0) * 5.0 / 9.0)
    }

    /// Build from a Fahrenheit value, rejecting the one value that
    /// would collide with the NaN sentinel (3276.7).
    pub fn from_fahrenheit(value: f64) -> Result<Self> {
        let raw = (value * 10.0).round();
        if !(f64::from(i16::MIN)..=f64::from(i16::MAX)).contains(&raw) {
            return Err(PcmiError::parse(format!("Temperature {value}°F out of range")));
        }
        let raw = raw as i16;
        if raw == Self::NAN_VALUE {
            return Err(PcmiError::parse(format!(
                "Temperature {value}°F collides with the sensor-error sentinel"
            )));
        }
        Ok(Self { raw })
    }

    /// Build from a Celsius value.
    pub fn from_celsius(value: f64) -> Result<Self> {
        Self::from_fahrenheit(value * 9.0 / 5.0 + 32.0)
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.fahrenheit() {
            Some(deg) => write!(f, "{deg:.1}°F"),
            None => write!(f, "NaN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let t = Temperature::from_raw(725);
        assert_eq!(t.fahrenheit(), Some(72.5));
        assert!((t.celsius().unwrap() - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_nan_sentinel_preserved() {
        let t = Temperature::from_raw(0x7FFF);
        assert!(t.is_nan());
        assert_eq!(t.fahrenheit(), None);
        assert_eq!(t.celsius(), None);
        assert_eq!(t.to_string(), "NaN");
        assert_eq!(t.raw, 0x7FFF);
    }

    #[test]
    fn test_from_fahrenheit_round_trip() {
        let mut x: f64 = -3276.7;
        while x <= 3276.7 {
            if (x * 10.0).round() as i32 != i32::from(Temperature::NAN_VALUE) {
                let t = Temperature::from_fahrenheit(x).unwrap();
                assert!((t.fahrenheit().unwrap() - x).abs() < 0.05, "x = {x}");
            }
            x += 123.4;
        }
    }

    #[test]
    fn test_sentinel_collision_rejected() {
        assert!(Temperature::from_fahrenheit(3276.7).is_err());
        assert!(Temperature::from_fahrenheit(3276.6).is_ok());
    }

    #[test]
    fn test_negative_values() {
        let t = Temperature::from_raw(-327);
        assert_eq!(t.fahrenheit(), Some(-32.7));
    }
}
