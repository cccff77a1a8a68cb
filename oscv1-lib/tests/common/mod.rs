//! Shared test support: a scripted digitizer implementing
//! [`ByteStreamPort`] the way the firmware behaves on the wire.

use std::collections::VecDeque;
use std::time::Duration;

#[allow(unused_imports)]
pub use oscv1_lib::command::{Command, RateMode};
#[allow(unused_imports)]
pub use oscv1_lib::constants::{CMD_RATE_10KHZ, CMD_START, CMD_STOP, HANDSHAKE_REPLY_SIZE, IDENT};
#[allow(unused_imports)]
pub use oscv1_lib::error::Error;
#[allow(unused_imports)]
pub use oscv1_lib::frame::{FrameDecoder, Sample};
#[allow(unused_imports)]
pub use oscv1_lib::session::{Session, SessionConfig, SessionState};
#[allow(unused_imports)]
pub use oscv1_lib::transport::ByteStreamPort;

use oscv1_lib::handshake::xor_checksum;
use tokio::time::Instant;

/// Encode a run of raw values as their wire frames.
#[allow(dead_code)]
pub fn frame_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|&v| Sample::new(v).to_wire()).collect()
}

/// Decode a hex fixture string into bytes.
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("Failed to decode hex")
}

/// A [`SessionConfig`] with bench timings scaled for paused-clock tests.
/// Virtual time makes the absolute values irrelevant; these just keep the
/// arithmetic easy to eyeball in failures.
#[allow(dead_code)]
pub fn test_config() -> SessionConfig {
    SessionConfig {
        command_settle: Duration::from_millis(50),
        drain_settle: Duration::from_millis(100),
        handshake_timeout: Duration::from_millis(500),
        idle_poll: Duration::from_millis(1),
        ..SessionConfig::default()
    }
}

/// Ways the mock can corrupt its handshake reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum HandshakeFault {
    /// Reply with only the first `n` bytes
    Truncate(usize),
    /// Corrupt a byte inside the identity
    MangleIdent,
    /// Send a wrong checksum byte
    MangleChecksum,
}

/// In-memory stand-in for the firmware.
///
/// Consumes command bytes the way the firmware's serial loop does
/// (unknown bytes ignored), answers the handshake, and while running
/// emits ramp-valued sample frames at the selected rate against the
/// tokio clock. Under `start_paused` tests this makes byte arrival a
/// pure function of virtual elapsed time.
#[allow(dead_code)]
pub struct MockDigitizer {
    rate: RateMode,
    running: bool,
    started: Option<Instant>,
    emitted: u64,
    next_value: u16,
    rx: VecDeque<u8>,
    writes: Vec<u8>,
    handshake_fault: Option<HandshakeFault>,
}

#[allow(dead_code)]
impl MockDigitizer {
    pub fn new() -> Self {
        Self {
            rate: RateMode::Khz1,
            running: false,
            started: None,
            emitted: 0,
            next_value: 0,
            rx: VecDeque::new(),
            writes: Vec::new(),
            handshake_fault: None,
        }
    }

    pub fn with_handshake_fault(fault: HandshakeFault) -> Self {
        let mut mock = Self::new();
        mock.handshake_fault = Some(fault);
        mock
    }

    /// Every byte the host has written, in order.
    pub fn written(&self) -> &[u8] {
        &self.writes
    }

    /// Queue raw bytes as if the device had sent them unprompted.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn selected_rate(&self) -> RateMode {
        self.rate
    }

    fn handshake_reply(&self) -> Vec<u8> {
        let mut reply = IDENT.to_vec();
        reply.push(xor_checksum(IDENT));
        match self.handshake_fault {
            Some(HandshakeFault::Truncate(n)) => reply.truncate(n),
            Some(HandshakeFault::MangleIdent) => reply[0] = b'X',
            Some(HandshakeFault::MangleChecksum) => reply[7] ^= 0xFF,
            None => {}
        }
        reply
    }

    fn apply(&mut self, byte: u8) {
        // Unknown bytes fall through, like the firmware's command loop.
        let Some(command) = Command::from_wire(byte) else {
            return;
        };
        match command {
            Command::Start => {
                self.running = true;
                self.started = Some(Instant::now());
                self.emitted = 0;
            }
            Command::Stop => {
                // Emit what was due up to this instant; those bytes are
                // the "in flight at stop" traffic a drain throws away.
                self.synthesize();
                self.running = false;
                self.started = None;
            }
            Command::SelectRate(mode) => {
                self.rate = mode;
            }
            Command::Handshake => {
                let reply = self.handshake_reply();
                self.rx.extend(reply);
            }
        }
    }

    /// Bring the receive queue up to date with the clock: while running,
    /// one frame per sample period since start.
    fn synthesize(&mut self) {
        let Some(started) = self.started else {
            return;
        };
        if !self.running {
            return;
        }
        let elapsed = started.elapsed().as_secs_f64();
        let due_bytes = (elapsed * self.rate.as_hz() as f64) as u64 * 2;
        while self.emitted + 2 <= due_bytes {
            let frame = Sample::new(self.next_value).to_wire();
            self.next_value = (self.next_value + 1) & 0x3FF;
            self.rx.extend(frame);
            self.emitted += 2;
        }
    }
}

impl Default for MockDigitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStreamPort for MockDigitizer {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        for &byte in bytes {
            self.writes.push(byte);
            self.apply(byte);
        }
        Ok(())
    }

    async fn read_available(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Error> {
        self.synthesize();
        if self.rx.is_empty() && !timeout.is_zero() {
            tokio::time::sleep(timeout).await;
            self.synthesize();
        }
        let n = buf.len().min(self.rx.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.rx.pop_front().expect("length checked above");
        }
        Ok(n)
    }

    fn bytes_waiting(&mut self) -> Result<usize, Error> {
        self.synthesize();
        Ok(self.rx.len())
    }

    fn reset_input_buffer(&mut self) -> Result<(), Error> {
        self.synthesize();
        self.rx.clear();
        Ok(())
    }

    fn reset_output_buffer(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
