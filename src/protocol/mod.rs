//! PCMI wire protocol: command codes, codecs, length indicators,
//! byte-order strategies, and frame parsing.

pub mod codec;
pub mod constants;
pub mod endian;
pub mod frame;
pub mod length;
