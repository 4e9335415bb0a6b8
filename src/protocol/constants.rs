//! PCMI command codes and protocol constants.

/// Start-of-frame delimiter on outgoing master frames (space).
pub const STX: u8 = 0x20;
/// End-of-frame delimiter (carriage return).
pub const ETX: u8 = 0x0D;

/// Default response timeout in seconds.
pub const DEFAULT_RECEIVE_TIMEOUT: f64 = 5.0;
/// Transport-level retry budget (connect retransmits).
pub const MAX_TRANSPORT_RETRIES: u32 = 6;
/// Session-level retry budget (per-record retries during a download).
pub const MAX_SESSION_RETRIES: u32 = 3;

/// Maximum protocol message size in bytes.
pub const COM_BUFFER_SIZE: usize = 2048;
/// Serial numbers are exactly this many ASCII digits.
pub const SERIAL_NUMBER_LENGTH: usize = 8;
/// Highest zone number a controller supports.
pub const MAX_ZONES: u8 = 9;
/// Base year for minutes-counter timestamps in alarm/history records.
pub const BASE_YEAR_FOR_DATES: i32 = 1980;

/// Sensor-error sentinel for 16-bit temperature fields (32767).
pub const NAN_TEMP: i16 = 0x7FFF;

/// Default RS-485 baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 19200;

// ===== Connection management =====

pub const PCMI_ATTENTION: u8 = 0x81;
pub const PCMI_AT_ACK: u8 = 0x82;
/// Select controller by serial number.
pub const PCMI_SERIAL_NUMBER: u8 = 0x85;
/// Serial number acknowledged, controller selected.
pub const PCMI_SN_ACK: u8 = 0x86;
/// Disconnect from controller.
pub const PCMI_BREAK: u8 = 0x87;
pub const PCMI_BR_ACK: u8 = 0x88;

// ===== Data requests (downloads) =====

/// Request device parameters for all devices.
pub const PCMI_SEND_PARMDATA: u8 = 0x8F;
/// Device parameters response, 1-byte RLI.
pub const PCMI_PD_STRING_1: u8 = 0x90;
/// Device parameters response, 2-byte RLI.
pub const PCMI_PD_STRING_2: u8 = 0xB7;
/// Request device variable data (runtime values).
pub const PCMI_SEND_VARDATA: u8 = 0x91;
pub const PCMI_VD_STRING_1: u8 = 0x92;
pub const PCMI_VD_STRING_2: u8 = 0xB9;
/// Request history records.
pub const PCMI_SEND_HISTORY: u8 = 0x93;
pub const PCMI_HA_STRING: u8 = 0x94;
/// History response in native byte order (no swap).
pub const PCMI_HA_NONSWAP_STRING: u8 = 0xB5;
/// Request zone parameters.
pub const PCMI_SEND_ZONE_PARM: u8 = 0x95;
pub const PCMI_ZP_STRING_1: u8 = 0x96;
pub const PCMI_ZP_STRING_2: u8 = 0xB8;
/// Request zone variable data (runtime values).
pub const PCMI_SEND_ZONE_VAR: u8 = 0x97;
pub const PCMI_ZV_STRING_1: u8 = 0x98;
pub const PCMI_ZV_STRING_2: u8 = 0xBA;
/// Request version and system information.
pub const PCMI_SEND_VERSION: u8 = 0x9F;
pub const PCMI_SV_STRING: u8 = 0xA0;
/// Request alarm list.
pub const PCMI_SEND_ALARM: u8 = 0xA4;
pub const PCMI_SA_STRING: u8 = 0xA5;
/// Alarm response in native byte order (no swap).
pub const PCMI_SA_NONSWAP_STRING: u8 = 0xB3;
/// Request password records.
pub const PCMI_SEND_PASSWORD: u8 = 0xA6;
pub const PCMI_PW_STRING: u8 = 0xA7;
/// Request detailed alarm information.
pub const PCMI_SEND_DETAIL_ALARM: u8 = 0xAA;
pub const PCMI_DA_STRING: u8 = 0xAB;
pub const PCMI_DA_NONSWAP_STRING: u8 = 0xB4;
/// Request GetInfo record.
pub const PCMI_GET_INFO_RECORD: u8 = 0xAC;
pub const PCMI_SEND_INFO_RECORD: u8 = 0xAD;
pub const PCMI_SEND_INFO1_RECORD: u8 = 0xB2;
pub const PCMI_SEND_INFO1_NONSWAP_RECORD: u8 = 0xB6;
/// Request scale global data.
pub const PCMI_SEND_SCALE_GLOBAL: u8 = 0xAE;
pub const PCMI_SG_STRING: u8 = 0xAF;
/// Request bird house data.
pub const PCMI_SEND_BIRD_HOUSE: u8 = 0xB0;
pub const PCMI_BH_STRING: u8 = 0xB1;

// ===== Uploads (enumerated so frames classify; writing is out of scope) =====

pub const PCMI_PD_CC_STRING_1: u8 = 0xA1;
pub const PCMI_ZP_CC_STRING_1: u8 = 0xA2;
pub const PCMI_PW_CC_PASSWORD: u8 = 0xA8;
pub const PCMI_PW_CC_ACK: u8 = 0xA9;

// ===== Flow control =====

/// Master ready for the next record of a multi-record download.
pub const PCMI_OK_SEND_NEXT: u8 = 0x99;
/// Upload flow: next record accepted.
pub const PCMI_OK_CC_NEXT: u8 = 0xA3;
/// No more records available.
pub const PCMI_END_OF_RECORD: u8 = 0x9B;

// ===== Error responses =====

pub const PCMI_ERROR: u8 = 0xC1;
pub const PCMI_ER_PASSWORD: u8 = 0xC2;
pub const PCMI_ER_SERIAL_NUM: u8 = 0xC3;
pub const PCMI_ER_STRING: u8 = 0xC4;
pub const PCMI_ER_NO_ZONE: u8 = 0xC8;
/// Retry last request.
pub const PCMI_ER_TRY_AGAIN: u8 = 0xCA;
/// Controller in use by a local operator.
pub const PCMI_ER_HANDS_OFF: u8 = 0xCB;
pub const PCMI_ER_CC_AGAIN: u8 = 0xCC;
pub const PCMI_ER_CC_DEVICE: u8 = 0xCD;
pub const PCMI_ER_CC_ZONE: u8 = 0xCE;
/// Checksum error detected by the controller.
pub const PCMI_ER_SUM_CHECK: u8 = 0xD9;
/// Controller starting up (indexing history).
pub const PCMI_ER_START_UP: u8 = 0xDA;
pub const PCMI_ER_COM_LENGTH: u8 = 0xDB;

/// Commands at or above this value carry 2-byte length indicators.
pub const EXTENDED_COMMAND_THRESHOLD: u8 = 0xB0;

/// True for error response codes (0xC0..=0xDB).
pub fn is_error_code(command: u8) -> bool {
    (0xC0..=0xDB).contains(&command)
}

/// True for single-byte acknowledgment frames (no payload, no checksum).
pub fn is_acknowledgment(command: u8) -> bool {
    matches!(
        command,
        PCMI_AT_ACK | PCMI_SN_ACK | PCMI_BR_ACK | PCMI_END_OF_RECORD | PCMI_OK_CC_NEXT | PCMI_PW_CC_ACK
    ) || is_error_code(command)
}

/// True for record responses carrying a 1-byte RLI.
pub fn is_one_byte_rli(command: u8) -> bool {
    matches!(
        command,
        PCMI_PD_STRING_1 | PCMI_VD_STRING_1 | PCMI_ZP_STRING_1 | PCMI_ZV_STRING_1
    )
}

/// True for record responses carrying a 2-byte RLI (always little-endian).
pub fn is_two_byte_rli(command: u8) -> bool {
    matches!(
        command,
        PCMI_PD_STRING_2 | PCMI_VD_STRING_2 | PCMI_ZP_STRING_2 | PCMI_ZV_STRING_2
    )
}

/// True for responses whose payload begins with a VLI (history, alarm, info).
pub fn is_vli_command(command: u8) -> bool {
    matches!(
        command,
        PCMI_HA_STRING
            | PCMI_HA_NONSWAP_STRING
            | PCMI_SA_STRING
            | PCMI_SA_NONSWAP_STRING
            | PCMI_DA_STRING
            | PCMI_DA_NONSWAP_STRING
            | PCMI_SEND_INFO_RECORD
            | PCMI_SEND_INFO1_RECORD
            | PCMI_SEND_INFO1_NONSWAP_RECORD
    )
}

/// True for response variants transmitted in native (little-endian) order.
pub fn is_nonswap_response(command: u8) -> bool {
    matches!(
        command,
        PCMI_HA_NONSWAP_STRING | PCMI_SA_NONSWAP_STRING | PCMI_DA_NONSWAP_STRING | PCMI_SEND_INFO1_NONSWAP_RECORD
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_range() {
        assert!(is_error_code(0xC1));
        assert!(is_error_code(0xDB));
        assert!(!is_error_code(0xBF));
        assert!(!is_error_code(0xDC));
    }

    #[test]
    fn test_ack_set_includes_errors() {
        assert!(is_acknowledgment(PCMI_SN_ACK));
        assert!(is_acknowledgment(PCMI_END_OF_RECORD));
        assert!(is_acknowledgment(PCMI_ER_TRY_AGAIN));
        assert!(!is_acknowledgment(PCMI_ZP_STRING_1));
    }

    #[test]
    fn test_rli_pairs_are_disjoint() {
        for cmd in [PCMI_PD_STRING_1, PCMI_VD_STRING_1, PCMI_ZP_STRING_1, PCMI_ZV_STRING_1] {
            assert!(is_one_byte_rli(cmd));
            assert!(!is_two_byte_rli(cmd));
        }
        for cmd in [PCMI_PD_STRING_2, PCMI_VD_STRING_2, PCMI_ZP_STRING_2, PCMI_ZV_STRING_2] {
            assert!(is_two_byte_rli(cmd));
            assert!(cmd >= EXTENDED_COMMAND_THRESHOLD);
        }
    }
}
