//! Incoming frame classification and parsing.
//!
//! Frames arrive in four shapes, selected by the command byte:
//!
//! 1. Bare acknowledgments: a single command byte, no checksum, no CR.
//! 2. RLI records: `[CMD][RLI][DATA][CS][CR]` with a 1- or 2-byte RLI
//!    counting payload words.
//! 3. VLI records (history, alarm, info): `[CMD][VLI][DATA][CS][CR]`
//!    where the VLI counts payload bytes and its width follows the
//!    command byte.
//! 4. CR-delimited (version): `[CMD][DATA][CS][CR]` with no length.
//!
//! The parser never retries; it reports a discriminated outcome and the
//! session machine decides what to do with each.

use crate::protocol::codec::{bytes_to_hex, calculate_checksum, decode_byte, hex_to_bytes};
use crate::protocol::constants::{self, ETX, STX};
use crate::protocol::length::{decode_1byte_rli, decode_2byte_rli, decode_vli, vli_size};

/// A successfully parsed protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    /// The command/response code.
    pub command: u8,
    /// Decoded binary payload (empty for acknowledgments).
    pub payload: Vec<u8>,
    /// Payload as the hex-ASCII text it arrived in; record decoders
    /// consume this form.
    pub payload_hex: String,
    /// Decoded length indicator in bytes, when the frame carried one.
    pub length_indicator: Option<usize>,
    /// Bytes consumed from the input buffer.
    pub consumed: usize,
}

impl ParsedFrame {
    /// True if this frame is a controller error response.
    pub fn is_error(&self) -> bool {
        constants::is_error_code(self.command)
    }

    /// True if this frame ends a multi-record sequence.
    pub fn is_end_of_record(&self) -> bool {
        self.command == constants::PCMI_END_OF_RECORD
    }
}

/// Outcome of attempting to parse one frame from a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Frame parsed and checksum verified.
    Frame(ParsedFrame),
    /// Buffer holds a partial frame; more bytes are needed.
    Incomplete,
    /// Frame structure was intact but the checksum did not match.
    BadChecksum { expected: u8, received: u8 },
    /// Frame structure was invalid.
    Malformed(String),
}

/// Parse a single frame from `buffer`.
///
/// An optional leading STX is skipped; controllers do not normally echo
/// it but line turnaround noise can.
pub fn parse_frame(buffer: &[u8]) -> FrameOutcome {
    if buffer.is_empty() {
        return FrameOutcome::Incomplete;
    }

    let offset = usize::from(buffer[0] == STX);
    if buffer.len() <= offset {
        return FrameOutcome::Incomplete;
    }
    let command = buffer[offset];

    if constants::is_acknowledgment(command) {
        return FrameOutcome::Frame(ParsedFrame {
            command,
            payload: Vec::new(),
            payload_hex: String::new(),
            length_indicator: None,
            consumed: offset + 1,
        });
    }

    if constants::is_one_byte_rli(command) {
        return parse_length_prefixed(buffer, offset, LengthKind::Rli(2));
    }
    if constants::is_two_byte_rli(command) {
        return parse_length_prefixed(buffer, offset, LengthKind::Rli(4));
    }
    if constants::is_vli_command(command) {
        return parse_length_prefixed(buffer, offset, LengthKind::Vli(vli_size(command)));
    }

    parse_cr_delimited(buffer, offset)
}

enum LengthKind {
    /// RLI of the given width in hex chars; value counts words.
    Rli(usize),
    /// VLI of the given width; value counts bytes.
    Vli(usize),
}

fn parse_length_prefixed(buffer: &[u8], offset: usize, kind: LengthKind) -> FrameOutcome {
    let command = buffer[offset];
    let len_chars = match kind {
        LengthKind::Rli(n) | LengthKind::Vli(n) => n,
    };

    // Minimum frame: CMD + length + CS + CR.
    if buffer.len() < offset + 1 + len_chars + 2 + 1 {
        return FrameOutcome::Incomplete;
    }

    let len_start = offset + 1;
    let len_field = &buffer[len_start..len_start + len_chars];
    let byte_count = match kind {
        LengthKind::Rli(2) => decode_1byte_rli(len_field),
        LengthKind::Rli(_) => decode_2byte_rli(len_field),
        LengthKind::Vli(width) => decode_vli(len_field, width),
    };
    let byte_count = match byte_count {
        Ok(n) => n,
        Err(e) => return FrameOutcome::Malformed(format!("Invalid length indicator: {e}")),
    };

    let data_chars = byte_count * 2;
    let expected_size = offset + 1 + len_chars + data_chars + 2 + 1;
    if buffer.len() < expected_size {
        return FrameOutcome::Incomplete;
    }

    let data_start = len_start + len_chars;
    let data_end = data_start + data_chars;
    let cs_start = data_end;
    let cr_pos = cs_start + 2;

    if buffer[cr_pos] != ETX {
        return FrameOutcome::Malformed(format!(
            "Missing CR terminator at position {cr_pos}, found {:#04X}",
            buffer[cr_pos]
        ));
    }

    // Checksum covers command + length field + payload text.
    let expected = calculate_checksum(&buffer[offset..cs_start]);
    let received = match decode_byte(&buffer[cs_start..cs_start + 2]) {
        Ok(v) => v,
        Err(_) => return FrameOutcome::Malformed("Invalid checksum characters".into()),
    };
    if expected != received {
        return FrameOutcome::BadChecksum { expected, received };
    }

    let payload_hex = match std::str::from_utf8(&buffer[data_start..data_end]) {
        Ok(s) => s.to_string(),
        Err(_) => return FrameOutcome::Malformed("Payload is not ASCII hex".into()),
    };
    let payload = match hex_to_bytes(&payload_hex) {
        Ok(p) => p,
        Err(e) => return FrameOutcome::Malformed(format!("Invalid hex payload: {e}")),
    };

    FrameOutcome::Frame(ParsedFrame {
        command,
        payload,
        payload_hex,
        length_indicator: Some(byte_count),
        consumed: expected_size,
    })
}

fn parse_cr_delimited(buffer: &[u8], offset: usize) -> FrameOutcome {
    let Some(cr_pos) = buffer[offset..].iter().position(|&b| b == ETX).map(|p| p + offset) else {
        return FrameOutcome::Incomplete;
    };

    // Minimum: CMD + CS + CR.
    if cr_pos - offset < 3 {
        return FrameOutcome::Malformed("Frame too short for CR-delimited format".into());
    }

    let command = buffer[offset];
    let cs_start = cr_pos - 2;
    let data = &buffer[offset + 1..cs_start];

    let expected = calculate_checksum(&buffer[offset..cs_start]);
    let received = match decode_byte(&buffer[cs_start..cr_pos]) {
        Ok(v) => v,
        Err(_) => return FrameOutcome::Malformed("Invalid checksum characters".into()),
    };
    if expected != received {
        return FrameOutcome::BadChecksum { expected, received };
    }

    // Version payloads are raw ASCII rather than hex-encoded; keep the
    // bytes as-is when they do not form a hex string.
    let (payload, payload_hex) = match std::str::from_utf8(data) {
        Ok(text)
            if !text.is_empty() && text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit()) =>
        {
            match hex_to_bytes(text) {
                Ok(bytes) => (bytes, text.to_string()),
                Err(_) => (data.to_vec(), bytes_to_hex(data)),
            }
        }
        _ => (data.to_vec(), bytes_to_hex(data)),
    };

    FrameOutcome::Frame(ParsedFrame {
        command,
        payload,
        payload_hex,
        length_indicator: None,
        consumed: cr_pos + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::encode_byte;
    use crate::protocol::constants::{PCMI_SN_ACK, PCMI_SV_STRING, PCMI_ZP_STRING_1, PCMI_ZP_STRING_2};

    fn record_frame(command: u8, rli: &[u8], payload_hex: &[u8]) -> Vec<u8> {
        let mut frame = vec![command];
        frame.extend_from_slice(rli);
        frame.extend_from_slice(payload_hex);
        let cs = calculate_checksum(&frame);
        frame.extend_from_slice(&encode_byte(cs));
        frame.push(ETX);
        frame
    }

    #[test]
    fn test_bare_ack() {
        let FrameOutcome::Frame(frame) = parse_frame(&[PCMI_SN_ACK]) else {
            panic!("expected frame");
        };
        assert_eq!(frame.command, PCMI_SN_ACK);
        assert!(frame.payload.is_empty());
        assert_eq!(frame.consumed, 1);
    }

    #[test]
    fn test_one_byte_rli_record() {
        // 2 words = 4 bytes = 8 hex chars.
        let frame = record_frame(PCMI_ZP_STRING_1, b"02", b"12345678");
        let FrameOutcome::Frame(parsed) = parse_frame(&frame) else {
            panic!("expected frame");
        };
        assert_eq!(parsed.command, PCMI_ZP_STRING_1);
        assert_eq!(parsed.length_indicator, Some(4));
        assert_eq!(parsed.payload, vec![0x12, 0x34, 0x56, 0x78]);
        assert_eq!(parsed.payload_hex, "12345678");
        assert_eq!(parsed.consumed, frame.len());
    }

    #[test]
    fn test_two_byte_rli_low_byte_first() {
        // "0200" = 2 words.
        let frame = record_frame(PCMI_ZP_STRING_2, b"0200", b"AABBCCDD");
        let FrameOutcome::Frame(parsed) = parse_frame(&frame) else {
            panic!("expected frame");
        };
        assert_eq!(parsed.length_indicator, Some(4));
        assert_eq!(parsed.payload, vec![0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn test_incomplete_record() {
        let frame = record_frame(PCMI_ZP_STRING_1, b"02", b"12345678");
        assert_eq!(parse_frame(&frame[..frame.len() - 3]), FrameOutcome::Incomplete);
        assert_eq!(parse_frame(&frame[..2]), FrameOutcome::Incomplete);
    }

    #[test]
    fn test_bad_checksum() {
        let mut frame = record_frame(PCMI_ZP_STRING_1, b"02", b"12345678");
        let cs_pos = frame.len() - 3;
        frame[cs_pos] = if frame[cs_pos] == b'0' { b'1' } else { b'0' };
        assert!(matches!(parse_frame(&frame), FrameOutcome::BadChecksum { .. }));
    }

    #[test]
    fn test_missing_cr_is_malformed() {
        let mut frame = record_frame(PCMI_ZP_STRING_1, b"02", b"12345678");
        let last = frame.len() - 1;
        frame[last] = 0x00;
        assert!(matches!(parse_frame(&frame), FrameOutcome::Malformed(_)));
    }

    #[test]
    fn test_vli_frame() {
        // History response, 1-byte VLI counting 3 payload bytes.
        let frame = record_frame(constants::PCMI_HA_STRING, b"03", b"010203");
        let FrameOutcome::Frame(parsed) = parse_frame(&frame) else {
            panic!("expected frame");
        };
        assert_eq!(parsed.length_indicator, Some(3));
        assert_eq!(parsed.payload, vec![1, 2, 3]);
    }

    #[test]
    fn test_cr_delimited_ascii_version() {
        // Version payload is raw ASCII, odd length here so it cannot be hex.
        let mut frame = vec![PCMI_SV_STRING];
        frame.extend_from_slice(b"VPII 2.31     2021060");
        let cs = calculate_checksum(&frame);
        frame.extend_from_slice(&encode_byte(cs));
        frame.push(ETX);

        let FrameOutcome::Frame(parsed) = parse_frame(&frame) else {
            panic!("expected frame");
        };
        assert_eq!(parsed.command, PCMI_SV_STRING);
        assert_eq!(parsed.payload, b"VPII 2.31     2021060");
    }

    #[test]
    fn test_leading_stx_skipped() {
        let mut frame = vec![STX];
        frame.extend_from_slice(&record_frame(PCMI_ZP_STRING_1, b"01", b"ABCD"));
        let FrameOutcome::Frame(parsed) = parse_frame(&frame) else {
            panic!("expected frame");
        };
        assert_eq!(parsed.payload, vec![0xAB, 0xCD]);
        assert_eq!(parsed.consumed, frame.len());
    }
}
