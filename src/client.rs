//! Controller client: session state machine and download dialogues.
//!
//! The dialogue is strictly alternating: the client writes one frame,
//! the controller answers one frame. Multi-record downloads are pull
//! driven: each record is acknowledged with OK_SEND_NEXT before the
//! controller sends the next, and END_OF_RECORD closes the sequence.
//! Only this layer retries; the frame reader and record decoders report
//! errors and nothing else.

use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::{PcmiError, Result};
use crate::models::alarm::AlarmList;
use crate::models::history::HistoryRecord;
use crate::models::version::{SerialNumber, VersionRecord};
use crate::models::zone::{ZoneParameters, ZoneVariables};
use crate::parsers::registry::{DeviceParameterRecord, DeviceRegistry, DeviceVariableRecord};
use crate::parsers::{
    parse_alarm_list, parse_device_parameters, parse_device_variables, parse_history_record, parse_version_record,
    parse_zone_parameters, parse_zone_variables,
};
use crate::protocol::codec::build_frame;
use crate::protocol::constants::{self, DEFAULT_RECEIVE_TIMEOUT, MAX_SESSION_RETRIES, MAX_TRANSPORT_RETRIES};
use crate::protocol::endian::Endian;
use crate::protocol::frame::{parse_frame, FrameOutcome, ParsedFrame};
use crate::transport::{SerialTransport, Transport};

/// Session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Disconnected,
    Connecting,
    Connected,
    Downloading,
    Error,
}

/// Timeout used for the best-effort break acknowledgment read.
const BREAK_ACK_TIMEOUT: f64 = 1.0;

/// Client for one PCMI controller session over an owned transport.
///
/// Construction does not open the transport; `connect()` does. Every
/// exit path (normal disconnect, fatal error, abandonment recovery)
/// either returns the session to `Connected` or closes the transport
/// and lands in `Disconnected`.
pub struct ControllerClient<T: Transport> {
    transport: T,
    timeout_secs: f64,
    transport_retries: u32,
    session_retries: u32,
    registry: DeviceRegistry,
    state: ClientState,
    serial_number: Option<SerialNumber>,
    /// Last frame written, kept for try-again retransmits.
    last_frame: Vec<u8>,
}

impl ControllerClient<SerialTransport> {
    /// Build a serial-backed client from configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(SerialTransport::new(config.serial.clone()))
            .with_timeout(config.timeout_secs)
            .with_retries(config.transport_retries, config.session_retries))
    }
}

impl<T: Transport> ControllerClient<T> {
    /// Create a client with default timing over any transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout_secs: DEFAULT_RECEIVE_TIMEOUT,
            transport_retries: MAX_TRANSPORT_RETRIES,
            session_retries: MAX_SESSION_RETRIES,
            registry: DeviceRegistry::with_builtin(),
            state: ClientState::Disconnected,
            serial_number: None,
            last_frame: Vec::new(),
        }
    }

    /// Override the per-operation read timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: f64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Override the transport (connect) and session (download) retry
    /// budgets.
    pub fn with_retries(mut self, transport_retries: u32, session_retries: u32) -> Self {
        self.transport_retries = transport_retries;
        self.session_retries = session_retries;
        self
    }

    /// Replace the device decoder registry.
    pub fn with_registry(mut self, registry: DeviceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ClientState::Connected
    }

    /// Serial number of the connected controller.
    pub fn serial_number(&self) -> Option<&SerialNumber> {
        self.serial_number.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ===== Session lifecycle =====

    /// Connect to a controller by serial number.
    ///
    /// Sends PCMI_SERIAL_NUMBER and expects PCMI_SN_ACK. Timeouts are
    /// retried up to the transport retry budget with stale buffers
    /// discarded between attempts; any other response surfaces and the
    /// client returns to `Disconnected`.
    pub async fn connect(&mut self, serial: &str) -> Result<()> {
        if self.state != ClientState::Disconnected {
            return Err(PcmiError::Connection(format!(
                "Cannot connect: client is in {:?} state",
                self.state
            )));
        }

        let serial_number = SerialNumber::parse(serial)?;
        if !self.transport.is_open() {
            self.transport.open().await?;
        }

        self.state = ClientState::Connecting;
        info!(serial = %serial_number, "connecting to controller");

        let mut data = format!("{:02X}", serial_number.as_str().len()).into_bytes();
        data.extend_from_slice(serial_number.as_str().as_bytes());
        let frame = build_frame(constants::PCMI_SERIAL_NUMBER, &data);

        let mut last_error = PcmiError::Timeout(self.timeout_secs);
        for attempt in 0..=self.transport_retries {
            if attempt > 0 {
                debug!(attempt, "connect retry");
                self.transport.discard_buffers();
            }

            self.send_tracked(&frame).await?;

            match self.read_response_frame(self.timeout_secs).await {
                Ok(response) if response.command == constants::PCMI_SN_ACK => {
                    self.state = ClientState::Connected;
                    self.serial_number = Some(serial_number);
                    info!("controller connected");
                    return Ok(());
                }
                Ok(response) if response.is_error() => {
                    self.state = ClientState::Disconnected;
                    error!(code = response.command, "controller refused connection");
                    return Err(PcmiError::controller(response.command));
                }
                Ok(response) => {
                    self.state = ClientState::Disconnected;
                    return Err(PcmiError::protocol(format!(
                        "Unexpected connect response {:#04X}",
                        response.command
                    )));
                }
                Err(e @ PcmiError::Timeout(_)) => {
                    warn!(attempt, "connect timed out");
                    last_error = e;
                }
                Err(e) => {
                    self.state = ClientState::Disconnected;
                    return Err(e);
                }
            }
        }

        self.state = ClientState::Disconnected;
        error!("connect failed after {} attempts", self.transport_retries + 1);
        Err(last_error)
    }

    /// Disconnect from the controller.
    ///
    /// Sends PCMI_BREAK and waits briefly for the acknowledgment; a
    /// timeout there is swallowed because closing the transport is
    /// sufficient. Idempotent.
    pub async fn disconnect(&mut self) -> Result<()> {
        if self.state == ClientState::Disconnected {
            return Ok(());
        }

        debug!("disconnecting");
        if self.transport.is_open() {
            let frame = build_frame(constants::PCMI_BREAK, &[]);
            if let Err(e) = self.transport.write(&frame).await {
                warn!("break write failed during disconnect: {e}");
            } else {
                match self.read_response_frame(BREAK_ACK_TIMEOUT).await {
                    Ok(response) if response.command == constants::PCMI_BR_ACK => {}
                    Ok(response) => debug!(code = response.command, "unexpected break response"),
                    Err(_) => debug!("break acknowledgment timed out"),
                }
            }
            self.transport.close().await?;
        }

        self.state = ClientState::Disconnected;
        self.serial_number = None;
        info!("disconnected");
        Ok(())
    }

    // ===== Downloads =====

    /// Download zone configuration for all zones, one record per pull.
    pub async fn download_zone_parameters(&mut self) -> Result<DownloadStream<'_, T, ZoneParameters>> {
        self.start_download(constants::PCMI_SEND_ZONE_PARM, &[]).await?;
        Ok(DownloadStream::new(
            self,
            |cmd| cmd == constants::PCMI_ZP_STRING_1 || cmd == constants::PCMI_ZP_STRING_2,
            |frame: &ParsedFrame, _: &DeviceRegistry| parse_zone_parameters(&frame.payload_hex),
        ))
    }

    /// Download zone runtime state for all zones.
    pub async fn download_zone_variables(&mut self) -> Result<DownloadStream<'_, T, ZoneVariables>> {
        self.start_download(constants::PCMI_SEND_ZONE_VAR, &[]).await?;
        Ok(DownloadStream::new(
            self,
            |cmd| cmd == constants::PCMI_ZV_STRING_1 || cmd == constants::PCMI_ZV_STRING_2,
            |frame: &ParsedFrame, _: &DeviceRegistry| parse_zone_variables(&frame.payload_hex),
        ))
    }

    /// Download device configuration records. Zone 0 selects all zones.
    pub async fn download_device_parameters(
        &mut self,
        zone: u8,
    ) -> Result<DownloadStream<'_, T, DeviceParameterRecord>> {
        self.start_download(constants::PCMI_SEND_PARMDATA, &[zone]).await?;
        Ok(DownloadStream::new(
            self,
            |cmd| cmd == constants::PCMI_PD_STRING_1 || cmd == constants::PCMI_PD_STRING_2,
            |frame: &ParsedFrame, registry: &DeviceRegistry| parse_device_parameters(&frame.payload_hex, registry),
        ))
    }

    /// Download device runtime records. Zone 0 selects all zones.
    pub async fn download_device_variables(&mut self, zone: u8) -> Result<DownloadStream<'_, T, DeviceVariableRecord>> {
        self.start_download(constants::PCMI_SEND_VARDATA, &[zone]).await?;
        Ok(DownloadStream::new(
            self,
            |cmd| cmd == constants::PCMI_VD_STRING_1 || cmd == constants::PCMI_VD_STRING_2,
            |frame: &ParsedFrame, registry: &DeviceRegistry| parse_device_variables(&frame.payload_hex, registry),
        ))
    }

    /// Download history records for a zone and group. Zone 0 selects
    /// all zones.
    pub async fn download_history(&mut self, zone: u8, group: u8) -> Result<DownloadStream<'_, T, HistoryRecord>> {
        self.start_download(constants::PCMI_SEND_HISTORY, &[zone, group]).await?;
        Ok(DownloadStream::new(
            self,
            |cmd| cmd == constants::PCMI_HA_STRING || cmd == constants::PCMI_HA_NONSWAP_STRING,
            |frame: &ParsedFrame, _: &DeviceRegistry| parse_history_record(&frame.payload_hex, endian_for_response(frame.command)),
        ))
    }

    /// Download the alarm list. Zone 0 selects all zones.
    pub async fn download_alarms(&mut self, zone: u8) -> Result<DownloadStream<'_, T, AlarmList>> {
        self.start_download(constants::PCMI_SEND_ALARM, &[zone]).await?;
        Ok(DownloadStream::new(
            self,
            |cmd| cmd == constants::PCMI_SA_STRING || cmd == constants::PCMI_SA_NONSWAP_STRING,
            |frame: &ParsedFrame, _: &DeviceRegistry| parse_alarm_list(&frame.payload_hex, endian_for_response(frame.command)),
        ))
    }

    /// Download the firmware version record.
    pub async fn download_version(&mut self) -> Result<VersionRecord> {
        self.ensure_connected()?;
        self.recover_if_downloading().await;
        self.state = ClientState::Downloading;
        debug!("downloading version");

        let result = self.version_dialogue().await;
        self.state = ClientState::Connected;
        result
    }

    async fn version_dialogue(&mut self) -> Result<VersionRecord> {
        let frame = build_frame(constants::PCMI_SEND_VERSION, &[]);
        self.send_tracked(&frame).await?;
        let response = self.read_response_frame(self.timeout_secs).await?;

        if response.command == constants::PCMI_SV_STRING {
            return parse_version_record(&response.payload);
        }
        if response.is_error() {
            return Err(PcmiError::controller(response.command));
        }
        Err(PcmiError::protocol(format!(
            "Unexpected version response {:#04X}",
            response.command
        )))
    }

    // ===== Dialogue internals =====

    async fn start_download(&mut self, request: u8, data: &[u8]) -> Result<()> {
        self.ensure_connected()?;
        self.recover_if_downloading().await;
        self.state = ClientState::Downloading;
        debug!(request, "starting download");
        let frame = build_frame(request, data);
        self.send_tracked(&frame).await?;
        Ok(())
    }

    fn ensure_connected(&self) -> Result<()> {
        match self.state {
            ClientState::Connected | ClientState::Downloading => Ok(()),
            state => Err(PcmiError::Connection(format!("Not connected (state: {state:?})"))),
        }
    }

    /// If an earlier download stream was dropped mid-sequence, break
    /// out of it so the controller does not stay in record-serving
    /// mode.
    async fn recover_if_downloading(&mut self) {
        if self.state != ClientState::Downloading {
            return;
        }
        warn!("previous download abandoned, sending break");
        let _ = self.send_break_and_drain().await;
        self.state = ClientState::Connected;
    }

    async fn send_break_and_drain(&mut self) -> Result<()> {
        let frame = build_frame(constants::PCMI_BREAK, &[]);
        self.transport.write(&frame).await?;
        // Drain whatever the controller was about to send; timeouts
        // here are expected.
        let _ = self.read_response_frame(BREAK_ACK_TIMEOUT).await;
        Ok(())
    }

    async fn send_tracked(&mut self, frame: &[u8]) -> Result<()> {
        self.transport.write(frame).await?;
        self.last_frame = frame.to_vec();
        Ok(())
    }

    async fn retransmit_last(&mut self) -> Result<()> {
        self.transport.discard_buffers();
        let frame = self.last_frame.clone();
        self.transport.write(&frame).await
    }

    /// Read one response frame.
    ///
    /// Acknowledgments are a single byte with no terminator, so the
    /// first byte decides whether more needs to be read.
    async fn read_response_frame(&mut self, timeout_secs: f64) -> Result<ParsedFrame> {
        let first = self.transport.read_byte(timeout_secs).await?;
        if constants::is_acknowledgment(first) {
            return Ok(ParsedFrame {
                command: first,
                payload: Vec::new(),
                payload_hex: String::new(),
                length_indicator: None,
                consumed: 1,
            });
        }

        let mut buffer = vec![first];
        buffer.extend(self.transport.read_frame(timeout_secs).await?);

        match parse_frame(&buffer) {
            FrameOutcome::Frame(frame) => Ok(frame),
            FrameOutcome::BadChecksum { expected, received } => Err(PcmiError::Checksum { expected, received }),
            FrameOutcome::Incomplete => Err(PcmiError::protocol("Truncated frame")),
            FrameOutcome::Malformed(msg) => Err(PcmiError::protocol(msg)),
        }
    }

    /// Drop the session after retry exhaustion: Error, then transport
    /// closed and Disconnected.
    async fn fail_session(&mut self, context: &str) {
        error!("{context}: session failed");
        self.state = ClientState::Error;
        let _ = self.transport.close().await;
        self.state = ClientState::Disconnected;
        self.serial_number = None;
    }
}

fn endian_for_response(command: u8) -> Endian {
    if constants::is_nonswap_response(command) {
        Endian::NonSwap
    } else {
        Endian::Swap
    }
}

/// One step of a pull-pattern download.
enum DialogueStep {
    Record(ParsedFrame),
    End,
}

/// Lazy pull-style download sequence.
///
/// Each `next()` acknowledges the previously yielded record and reads
/// one more frame; the session machine never buffers ahead. Dropping
/// the stream mid-sequence is recovered on the next client operation;
/// calling [`DownloadStream::abort`] breaks out immediately.
pub struct DownloadStream<'a, T: Transport, R> {
    client: &'a mut ControllerClient<T>,
    accept: fn(u8) -> bool,
    decode: fn(&ParsedFrame, &DeviceRegistry) -> Result<R>,
    pending_ack: bool,
    finished: bool,
}

impl<'a, T: Transport, R> DownloadStream<'a, T, R> {
    fn new(
        client: &'a mut ControllerClient<T>,
        accept: fn(u8) -> bool,
        decode: fn(&ParsedFrame, &DeviceRegistry) -> Result<R>,
    ) -> Self {
        Self {
            client,
            accept,
            decode,
            pending_ack: false,
            finished: false,
        }
    }

    /// Pull the next record.
    ///
    /// Returns `None` once the controller signals end of records. A
    /// `Parse` error is fatal only to that record; the sequence
    /// continues on the next call. Protocol and controller errors end
    /// the sequence.
    pub async fn next(&mut self) -> Option<Result<R>> {
        if self.finished {
            return None;
        }

        match self.step().await {
            Ok(DialogueStep::Record(frame)) => {
                self.pending_ack = true;
                Some((self.decode)(&frame, &self.client.registry))
            }
            Ok(DialogueStep::End) => {
                self.finish();
                None
            }
            Err(e) => {
                match &e {
                    // Record-level failure: the session continues.
                    PcmiError::Parse(_) => {}
                    PcmiError::Timeout(_) | PcmiError::Checksum { .. } => {
                        self.finished = true;
                        self.client.fail_session("download retries exhausted").await;
                    }
                    PcmiError::Transport(_) | PcmiError::Io(_) => {
                        self.finished = true;
                        self.client.fail_session("transport failure").await;
                    }
                    _ => self.finish(),
                }
                Some(Err(e))
            }
        }
    }

    /// Collect every remaining record, stopping at the first fatal
    /// error.
    pub async fn collect(mut self) -> Result<Vec<R>> {
        let mut records = Vec::new();
        while let Some(item) = self.next().await {
            records.push(item?);
        }
        Ok(records)
    }

    /// True once the sequence has terminated.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Abandon the download: send PCMI_BREAK, drain the response, and
    /// return the session to `Connected`.
    pub async fn abort(self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        debug!("aborting download");
        let result = self.client.send_break_and_drain().await;
        self.client.state = ClientState::Connected;
        result
    }

    async fn step(&mut self) -> Result<DialogueStep> {
        if self.pending_ack {
            self.pending_ack = false;
            let ack = build_frame(constants::PCMI_OK_SEND_NEXT, &[]);
            self.client.send_tracked(&ack).await?;
        }

        let mut attempts = 0u32;
        loop {
            let outcome = self.client.read_response_frame(self.client.timeout_secs).await;

            let frame = match outcome {
                Ok(frame) => frame,
                Err(e) if e.is_retryable() => {
                    attempts += 1;
                    if attempts > self.client.session_retries {
                        return Err(e);
                    }
                    warn!(attempt = attempts, "retrying after {e}");
                    self.client.retransmit_last().await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if frame.is_end_of_record() {
                debug!("end of record sequence");
                return Ok(DialogueStep::End);
            }

            if (self.accept)(frame.command) {
                return Ok(DialogueStep::Record(frame));
            }

            match frame.command {
                constants::PCMI_ER_TRY_AGAIN => {
                    attempts += 1;
                    if attempts > self.client.session_retries {
                        return Err(PcmiError::controller(constants::PCMI_ER_TRY_AGAIN));
                    }
                    warn!(attempt = attempts, "controller requested retry");
                    self.client.retransmit_last().await?;
                }
                // No more zones: the controller's way of ending some
                // sequences early.
                constants::PCMI_ER_NO_ZONE => {
                    debug!("no more zones");
                    return Ok(DialogueStep::End);
                }
                cmd if constants::is_error_code(cmd) => {
                    return Err(PcmiError::controller(cmd));
                }
                cmd => {
                    return Err(PcmiError::protocol(format!(
                        "Unexpected response {cmd:#04X} during download"
                    )));
                }
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.client.state = ClientState::Connected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::{bytes_to_hex, calculate_checksum, encode_byte};
    use crate::protocol::constants::{
        ETX, PCMI_END_OF_RECORD, PCMI_ER_HANDS_OFF, PCMI_ER_NO_ZONE, PCMI_ER_TRY_AGAIN, PCMI_SN_ACK, PCMI_SV_STRING,
        PCMI_ZP_STRING_1, STX,
    };
    use crate::transport::MockTransport;

    fn client(mock: MockTransport) -> ControllerClient<MockTransport> {
        ControllerClient::new(mock).with_timeout(0.05).with_retries(2, 2)
    }

    async fn connected_client() -> ControllerClient<MockTransport> {
        let mut mock = MockTransport::new();
        mock.add_response([PCMI_SN_ACK]);
        let mut c = client(mock);
        c.connect("99999999").await.unwrap();
        c.transport.clear();
        c
    }

    /// Record frame bytes: command + RLI + payload hex + checksum + CR.
    fn record_frame(command: u8, rli: &str, payload_hex: &str) -> Vec<u8> {
        let mut frame = vec![command];
        frame.extend_from_slice(rli.as_bytes());
        frame.extend_from_slice(payload_hex.as_bytes());
        let cs = calculate_checksum(&frame);
        frame.extend_from_slice(&encode_byte(cs));
        frame.push(ETX);
        frame
    }

    /// A valid 42-byte zone parameter payload for the given zone.
    fn zone_parm_hex(zone: u8) -> String {
        let mut data = vec![0u8; 42];
        data[1] = 21; // 21 words big-endian
        data[2] = zone;
        data[3] = 0x01;
        data[4] = 0x22; // format 2, control 2
        data[6] = 0x02;
        data[7] = 0xD5; // setpoint 72.5F
        bytes_to_hex(&data)
    }

    fn zone_parm_frame(zone: u8) -> Vec<u8> {
        record_frame(PCMI_ZP_STRING_1, "15", &zone_parm_hex(zone))
    }

    #[test]
    fn test_initial_state() {
        let c = client(MockTransport::new());
        assert_eq!(c.state(), ClientState::Disconnected);
        assert!(!c.is_connected());
        assert!(c.serial_number().is_none());
    }

    #[tokio::test]
    async fn test_connect_success() {
        let mut mock = MockTransport::new();
        mock.add_response([PCMI_SN_ACK]);
        let mut c = client(mock);

        c.connect("99999999").await.unwrap();
        assert_eq!(c.state(), ClientState::Connected);
        assert!(c.is_connected());
        assert_eq!(c.serial_number().unwrap().as_str(), "99999999");

        // STX + 0x85 + "08" + serial + checksum "B5" + CR.
        let mut expected = vec![STX, 0x85];
        expected.extend_from_slice(b"0899999999B5");
        expected.push(ETX);
        assert_eq!(c.transport().written()[0], expected);
    }

    #[tokio::test]
    async fn test_connect_timeout_retries_then_fails() {
        let mut c = client(MockTransport::new());
        let err = c.connect("99999999").await.unwrap_err();
        assert!(matches!(err, PcmiError::Timeout(_)));
        assert_eq!(c.state(), ClientState::Disconnected);
        // Initial attempt + 2 transport retries.
        assert_eq!(c.transport().write_count(), 3);
    }

    #[tokio::test]
    async fn test_connect_controller_error() {
        let mut mock = MockTransport::new();
        mock.add_response([0xC3]); // invalid serial number
        let mut c = client(mock);

        let err = c.connect("99999999").await.unwrap_err();
        assert!(matches!(err, PcmiError::Controller { code: 0xC3, .. }));
        assert_eq!(c.state(), ClientState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_serial() {
        let mut c = client(MockTransport::new());
        assert!(c.connect("123").await.is_err());
        assert!(c.connect("ABCD1234").await.is_err());
        assert_eq!(c.transport().write_count(), 0);
    }

    #[tokio::test]
    async fn test_connect_while_connected_errors() {
        let mut c = connected_client().await;
        let err = c.connect("00009002").await.unwrap_err();
        assert!(err.to_string().contains("Connected"));
    }

    #[tokio::test]
    async fn test_disconnect_idempotent() {
        let mut c = client(MockTransport::new());
        c.disconnect().await.unwrap();
        c.disconnect().await.unwrap();
        assert_eq!(c.state(), ClientState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_sends_break() {
        let mut c = connected_client().await;
        c.transport.add_response([constants::PCMI_BR_ACK]);
        c.disconnect().await.unwrap();

        assert_eq!(c.state(), ClientState::Disconnected);
        assert!(c.serial_number().is_none());
        assert!(!c.transport().is_open());
        let last = c.transport().last_written().unwrap();
        assert_eq!(last[1], constants::PCMI_BREAK);
    }

    #[tokio::test]
    async fn test_zone_download_termination() {
        let mut c = connected_client().await;
        c.transport.add_response(zone_parm_frame(1));
        c.transport.add_response(zone_parm_frame(2));
        c.transport.add_response([PCMI_END_OF_RECORD]);

        let mut zones = Vec::new();
        let mut stream = c.download_zone_parameters().await.unwrap();
        while let Some(record) = stream.next().await {
            zones.push(record.unwrap());
        }

        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].zone_number, 1);
        assert_eq!(zones[1].zone_number, 2);
        assert_eq!(zones[0].temp_setpoint.fahrenheit(), Some(72.5));
        assert_eq!(c.state(), ClientState::Connected);

        // Exactly one request frame plus two OK_SEND_NEXT acks.
        let written = c.transport().written();
        assert_eq!(written.len(), 3);
        assert_eq!(written[0][1], constants::PCMI_SEND_ZONE_PARM);
        assert_eq!(written[1][1], constants::PCMI_OK_SEND_NEXT);
        assert_eq!(written[2][1], constants::PCMI_OK_SEND_NEXT);
    }

    #[tokio::test]
    async fn test_download_state_restored_after_completion() {
        let mut c = connected_client().await;
        c.transport.add_response([PCMI_END_OF_RECORD]);

        let records = c.download_zone_parameters().await.unwrap().collect().await.unwrap();
        assert!(records.is_empty());
        assert_eq!(c.state(), ClientState::Connected);
    }

    #[tokio::test]
    async fn test_try_again_retransmits_request() {
        let mut c = connected_client().await;
        c.transport.add_response([PCMI_ER_TRY_AGAIN]);
        c.transport.add_response(zone_parm_frame(1));
        c.transport.add_response([PCMI_END_OF_RECORD]);

        let records = c.download_zone_parameters().await.unwrap().collect().await.unwrap();
        assert_eq!(records.len(), 1);

        // Request, retransmitted request, one ack.
        let written = c.transport().written();
        assert_eq!(written.len(), 3);
        assert_eq!(written[0], written[1]);
        assert_eq!(written[2][1], constants::PCMI_OK_SEND_NEXT);
    }

    #[tokio::test]
    async fn test_bad_checksum_retries() {
        let mut c = connected_client().await;
        let mut corrupted = zone_parm_frame(1);
        let cs_pos = corrupted.len() - 3;
        corrupted[cs_pos] = if corrupted[cs_pos] == b'0' { b'1' } else { b'0' };
        c.transport.add_response(corrupted);
        c.transport.add_response(zone_parm_frame(1));
        c.transport.add_response([PCMI_END_OF_RECORD]);

        let records = c.download_zone_parameters().await.unwrap().collect().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(c.state(), ClientState::Connected);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_drops_session() {
        let mut c = connected_client().await;
        // Nothing queued: every read times out.
        let mut stream = c.download_zone_parameters().await.unwrap();
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, PcmiError::Timeout(_)));
        assert!(stream.next().await.is_none());
        assert_eq!(c.state(), ClientState::Disconnected);
        assert!(!c.transport().is_open());
    }

    #[tokio::test]
    async fn test_hands_off_surfaces() {
        let mut c = connected_client().await;
        c.transport.add_response([PCMI_ER_HANDS_OFF]);

        let mut stream = c.download_zone_parameters().await.unwrap();
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, PcmiError::Controller { code: 0xCB, .. }));
        assert!(stream.next().await.is_none());
        assert_eq!(c.state(), ClientState::Connected);
    }

    #[tokio::test]
    async fn test_no_zone_ends_quietly() {
        let mut c = connected_client().await;
        c.transport.add_response(zone_parm_frame(1));
        c.transport.add_response([PCMI_ER_NO_ZONE]);

        let records = c.download_zone_parameters().await.unwrap().collect().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(c.state(), ClientState::Connected);
    }

    #[tokio::test]
    async fn test_parse_error_continues_sequence() {
        let mut c = connected_client().await;
        c.transport.add_response(zone_parm_frame(0)); // invalid zone number
        c.transport.add_response(zone_parm_frame(3));
        c.transport.add_response([PCMI_END_OF_RECORD]);

        let mut stream = c.download_zone_parameters().await.unwrap();
        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(PcmiError::Parse(_))));
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.zone_number, 3);
        assert!(stream.next().await.is_none());
        assert_eq!(c.state(), ClientState::Connected);
    }

    #[tokio::test]
    async fn test_abort_sends_break() {
        let mut c = connected_client().await;
        c.transport.add_response(zone_parm_frame(1));

        let mut stream = c.download_zone_parameters().await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.zone_number, 1);
        stream.abort().await.unwrap();

        assert_eq!(c.state(), ClientState::Connected);
        let last = c.transport().last_written().unwrap();
        assert_eq!(last[1], constants::PCMI_BREAK);
    }

    #[tokio::test]
    async fn test_abandoned_stream_recovered_on_next_download() {
        let mut c = connected_client().await;
        c.transport.add_response(zone_parm_frame(1));

        {
            let mut stream = c.download_zone_parameters().await.unwrap();
            let _ = stream.next().await.unwrap().unwrap();
            // Dropped mid-sequence without abort.
        }
        assert_eq!(c.state(), ClientState::Downloading);

        // First response answers the recovery break, the second ends
        // the new download.
        c.transport.add_response([constants::PCMI_BR_ACK]);
        c.transport.add_response([PCMI_END_OF_RECORD]);
        c.transport.clear_writes();
        let records = c.download_zone_variables().await.unwrap().collect().await.unwrap();
        assert!(records.is_empty());

        // Break for the abandoned stream, then the new request.
        let written = c.transport().written();
        assert_eq!(written[0][1], constants::PCMI_BREAK);
        assert_eq!(written[1][1], constants::PCMI_SEND_ZONE_VAR);
    }

    #[tokio::test]
    async fn test_download_version() {
        let mut c = connected_client().await;
        let mut frame = vec![PCMI_SV_STRING];
        frame.extend_from_slice(b"VPII 2.31     20210604");
        let cs = calculate_checksum(&frame);
        frame.extend_from_slice(&encode_byte(cs));
        frame.push(ETX);
        c.transport.add_response(frame);

        let version = c.download_version().await.unwrap();
        assert_eq!(version.version, "VPII 2.31");
        assert_eq!(version.date_code, "20210604");
        assert_eq!(c.state(), ClientState::Connected);
    }

    #[tokio::test]
    async fn test_download_requires_connection() {
        let mut c = client(MockTransport::new());
        assert!(c.download_zone_parameters().await.is_err());
        assert!(c.download_version().await.is_err());
    }

    #[tokio::test]
    async fn test_device_download_unknown_type_preserved() {
        let mut c = connected_client().await;

        // 12-byte device record, type code 19 (reserved).
        let mut payload = vec![0u8, 6, 1, 0x05, 0x20, 19, 0x10, 0x01];
        payload.extend_from_slice(&[0xCA, 0xFE, 0xBA, 0xBE]);
        let frame = record_frame(constants::PCMI_PD_STRING_1, "06", &bytes_to_hex(&payload));
        c.transport.add_response(frame);
        c.transport.add_response([PCMI_END_OF_RECORD]);

        let records = c.download_device_parameters(0).await.unwrap().collect().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].header.device_type_code, 19);
        assert!(matches!(
            records[0].data,
            crate::parsers::devices::DeviceParameters::Unknown { .. }
        ));
    }

    #[tokio::test]
    async fn test_history_download_nonswap_by_command() {
        let mut c = connected_client().await;

        // History payload, little-endian variant (0xB5 carries a
        // 2-byte VLI, big-endian hex).
        let mut payload = vec![1u8, 1];
        payload.extend_from_slice(&[0x0F, 0x00]); // interval 15 LE
        payload.extend_from_slice(&[0x01, 0x00]); // count 1 LE
        payload.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        payload.extend_from_slice(&[0xD5, 0x02]); // 72.5 LE
        let frame = record_frame(constants::PCMI_HA_NONSWAP_STRING, "000C", &bytes_to_hex(&payload));
        c.transport.add_response(frame);
        c.transport.add_response([PCMI_END_OF_RECORD]);

        let records = c.download_history(1, 1).await.unwrap().collect().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].samples[0].value, 72.5);
        assert_eq!(c.transport().written()[0][1..4], [constants::PCMI_SEND_HISTORY, 1, 1]);
    }
}
