//! Data models for controller records.

pub mod alarm;
pub mod device;
pub mod history;
pub mod temperature;
pub mod version;
pub mod zone;

pub use alarm::{AlarmList, AlarmRecord, AlarmState, AlarmType};
pub use device::{DeviceRecordHeader, DeviceType};
pub use history::{HistoryGroup, HistoryRecord, HistorySample};
pub use temperature::Temperature;
pub use version::{SerialNumber, VersionRecord};
pub use zone::{LongHeadCounts, ZoneParameters, ZoneVariables};
