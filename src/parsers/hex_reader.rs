//! Position-tracked reader over ASCII-hex record payloads.
//!
//! Record decoders never touch payload text directly; every field read
//! goes through this cursor, which pairs bounds checking with the
//! record's byte-order strategy so endian-sensitive reads cannot bypass
//! it.

use crate::error::{PcmiError, Result};
use crate::protocol::codec::decode_byte;
use crate::protocol::endian::Endian;

/// Cursor over a hex payload; each logical byte is two hex characters.
#[derive(Debug)]
pub struct HexReader<'a> {
    data: &'a [u8],
    endian: Endian,
    position: usize,
}

impl<'a> HexReader<'a> {
    /// Create a reader bound to a byte-order strategy.
    ///
    /// The payload length must be even (whole bytes).
    pub fn new(hex: &'a str, endian: Endian) -> Result<Self> {
        if hex.len() % 2 != 0 {
            return Err(PcmiError::parse(format!(
                "Hex payload length must be even, got {}",
                hex.len()
            )));
        }
        Ok(Self {
            data: hex.as_bytes(),
            endian,
            position: 0,
        })
    }

    /// Current position in hex characters.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Current position in bytes.
    pub fn byte_position(&self) -> usize {
        self.position / 2
    }

    /// Hex characters left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Bytes left to read.
    pub fn remaining_bytes(&self) -> usize {
        self.remaining() / 2
    }

    /// The strategy this reader decodes multi-byte fields with.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// True once all characters are consumed.
    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Skip forward by `char_count` hex characters.
    pub fn skip(&mut self, char_count: usize) -> Result<()> {
        self.check(char_count, "skip")?;
        self.position += char_count;
        Ok(())
    }

    /// Skip forward by whole bytes.
    pub fn skip_bytes(&mut self, byte_count: usize) -> Result<()> {
        self.skip(byte_count * 2)
    }

    /// Move to an absolute position in hex characters.
    pub fn seek(&mut self, char_position: usize) -> Result<()> {
        if char_position > self.data.len() {
            return Err(PcmiError::parse(format!(
                "Seek to {char_position} beyond payload of {} chars",
                self.data.len()
            )));
        }
        self.position = char_position;
        Ok(())
    }

    /// Read one unsigned byte and advance.
    pub fn read_byte(&mut self) -> Result<u8> {
        self.check(2, "read byte")?;
        let value = decode_byte(&self.data[self.position..self.position + 2])?;
        self.position += 2;
        Ok(value)
    }

    /// Read one signed byte and advance.
    pub fn read_sbyte(&mut self) -> Result<i8> {
        Ok(self.read_byte()? as i8)
    }

    /// Read `count` bytes and advance.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.check(count * 2, "read bytes")?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_byte()?);
        }
        Ok(out)
    }

    /// Read an unsigned 16-bit field using the bound strategy.
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        self.endian.read_u16(&bytes, 0)
    }

    /// Read a signed 16-bit field using the bound strategy.
    pub fn read_i16(&mut self) -> Result<i16> {
        let bytes = self.read_bytes(2)?;
        self.endian.read_i16(&bytes, 0)
    }

    /// Read an unsigned 32-bit field using the bound strategy.
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        self.endian.read_u32(&bytes, 0)
    }

    /// Read a signed 32-bit field using the bound strategy.
    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_bytes(4)?;
        self.endian.read_i32(&bytes, 0)
    }

    /// Peek a byte at `byte_offset` from the current position without
    /// advancing.
    pub fn peek_byte(&self, byte_offset: usize) -> Result<u8> {
        let at = self.position + byte_offset * 2;
        if at + 2 > self.data.len() {
            return Err(PcmiError::parse(format!("Peek offset {byte_offset} out of bounds")));
        }
        decode_byte(&self.data[at..at + 2])
    }

    /// Read the rest of the payload as raw hex text and advance to end.
    pub fn read_remaining_hex(&mut self) -> &'a str {
        let rest = &self.data[self.position..];
        self.position = self.data.len();
        // Constructed from a &str in new(), so this cannot fail.
        std::str::from_utf8(rest).unwrap_or("")
    }

    fn check(&self, char_count: usize, operation: &str) -> Result<()> {
        if self.position + char_count > self.data.len() {
            return Err(PcmiError::parse(format!(
                "Cannot {operation}: need {char_count} chars, have {} at position {}",
                self.remaining(),
                self.position
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads_nonswap() {
        let mut reader = HexReader::new("001234FF", Endian::NonSwap).unwrap();
        assert_eq!(reader.read_byte().unwrap(), 0x00);
        assert_eq!(reader.read_u16().unwrap(), 0x3412);
        assert_eq!(reader.read_byte().unwrap(), 0xFF);
        assert!(reader.is_at_end());
    }

    #[test]
    fn test_sequential_reads_swap() {
        let mut reader = HexReader::new("12345678", Endian::Swap).unwrap();
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u16().unwrap(), 0x5678);
    }

    #[test]
    fn test_u32_reads() {
        let mut reader = HexReader::new("12345678", Endian::Swap).unwrap();
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
        let mut reader = HexReader::new("78563412", Endian::NonSwap).unwrap();
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_signed_byte() {
        let mut reader = HexReader::new("FF7F", Endian::Swap).unwrap();
        assert_eq!(reader.read_sbyte().unwrap(), -1);
        assert_eq!(reader.read_sbyte().unwrap(), 127);
    }

    #[test]
    fn test_skip_and_seek() {
        let mut reader = HexReader::new("AABBCCDD", Endian::Swap).unwrap();
        reader.skip_bytes(1).unwrap();
        assert_eq!(reader.read_byte().unwrap(), 0xBB);
        reader.seek(0).unwrap();
        assert_eq!(reader.read_byte().unwrap(), 0xAA);
        assert!(reader.seek(9).is_err());
    }

    #[test]
    fn test_bounded_reads() {
        let mut reader = HexReader::new("AA", Endian::Swap).unwrap();
        assert!(reader.read_u16().is_err());
        assert_eq!(reader.read_byte().unwrap(), 0xAA);
        assert!(reader.read_byte().is_err());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let reader = HexReader::new("AABB", Endian::Swap).unwrap();
        assert_eq!(reader.peek_byte(1).unwrap(), 0xBB);
        assert_eq!(reader.position(), 0);
        assert!(reader.peek_byte(2).is_err());
    }

    #[test]
    fn test_odd_length_rejected() {
        assert!(HexReader::new("ABC", Endian::Swap).is_err());
    }

    #[test]
    fn test_read_remaining_hex() {
        let mut reader = HexReader::new("AABBCC", Endian::Swap).unwrap();
        reader.skip_bytes(1).unwrap();
        assert_eq!(reader.read_remaining_hex(), "BBCC");
        assert!(reader.is_at_end());
    }
}
