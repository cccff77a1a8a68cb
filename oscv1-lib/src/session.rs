use std::cmp;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::command::{Command, RateMode};
use crate::constants::{
    BAUD_RATE, COMMAND_SETTLE, DRAIN_SETTLE, HANDSHAKE_REPLY_SIZE, HANDSHAKE_TIMEOUT, IDLE_POLL, READ_CHUNK,
    RESET_SETTLE,
};
use crate::error::Error;
use crate::frame::{DecodeStats, FrameDecoder, Sample};
use crate::handshake;
use crate::transport::{ByteStreamPort, SerialBytePort, discover_port};

/// Lifecycle state of the digitizer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub enum SessionState {
    /// No samples flowing; commands are accepted
    #[default]
    #[strum(to_string = "idle")]
    Idle,
    /// Sample frames are streaming
    #[strum(to_string = "running")]
    Running,
}

/// Timing and transport parameters for a [`Session`].
///
/// The defaults are the values the firmware is operated with on a bench;
/// every one of them can be overridden per session, there are no globals.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// UART baud rate used by [`Session::open`]
    pub baud: u32,
    /// Wait after opening the port for the board's auto-reset to finish
    pub reset_settle: Duration,
    /// Wait after a state-changing command byte before relying on it
    pub command_settle: Duration,
    /// Wait for in-flight bytes to land inside [`Session::drain`]
    pub drain_settle: Duration,
    /// Deadline for the complete handshake reply
    pub handshake_timeout: Duration,
    /// Poll interval while waiting for bytes
    pub idle_poll: Duration,
    /// Per-read buffer size for acquisition loops
    pub read_chunk: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            baud: BAUD_RATE,
            reset_settle: RESET_SETTLE,
            command_settle: COMMAND_SETTLE,
            drain_settle: DRAIN_SETTLE,
            handshake_timeout: HANDSHAKE_TIMEOUT,
            idle_poll: IDLE_POLL,
            read_chunk: READ_CHUNK,
        }
    }
}

/// One digitizer link: the port, the frame decoder and the command/state
/// discipline, owned together.
///
/// A session is reusable across start/stop cycles; there is no terminal
/// state. Decode counters accumulate for the life of the session.
pub struct Session<P: ByteStreamPort> {
    port: P,
    config: SessionConfig,
    state: SessionState,
    rate: RateMode,
    decoder: FrameDecoder,
}

impl Session<SerialBytePort> {
    /// Open the digitizer on a known serial port.
    ///
    /// Opening toggles DTR, which resets the board, so this waits out
    /// `config.reset_settle` and clears both FIFOs before returning.
    pub async fn open(path: &str, config: SessionConfig) -> Result<Self, Error> {
        let mut port = SerialBytePort::open(path, config.baud)?;
        info!(settle = ?config.reset_settle, "Waiting for the board to come out of reset");
        sleep(config.reset_settle).await;
        port.reset_input_buffer()?;
        port.reset_output_buffer()?;
        Ok(Session::new(port, config))
    }

    /// Find the digitizer by USB descriptor and open it.
    pub async fn discover(config: SessionConfig) -> Result<Self, Error> {
        let path = discover_port()?;
        Self::open(&path, config).await
    }
}

impl<P: ByteStreamPort> Session<P> {
    /// Wrap an already-open port. No I/O happens here.
    pub fn new(port: P, config: SessionConfig) -> Self {
        Self {
            port,
            config,
            state: SessionState::Idle,
            rate: RateMode::default(),
            decoder: FrameDecoder::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Rate last selected. The firmware comes out of reset at 1 kHz.
    pub fn rate(&self) -> RateMode {
        self.rate
    }

    pub fn decode_stats(&self) -> DecodeStats {
        self.decoder.stats()
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    async fn send_command(&mut self, command: Command) -> Result<(), Error> {
        let byte = command.to_wire();
        debug!(?command, byte = %format_args!("{byte:#04x}"), "Sending command");
        self.port.write(&[byte]).await
    }

    /// Select the sample rate. Only valid while idle.
    pub async fn select_rate(&mut self, mode: RateMode) -> Result<(), Error> {
        if self.state != SessionState::Idle {
            return Err(Error::InvalidState {
                command: "select_rate",
                state: self.state,
            });
        }
        self.send_command(Command::SelectRate(mode)).await?;
        sleep(self.config.command_settle).await;
        self.rate = mode;
        info!(%mode, "Sample rate selected");
        Ok(())
    }

    /// Begin streaming. Only valid while idle.
    pub async fn start(&mut self) -> Result<(), Error> {
        if self.state != SessionState::Idle {
            return Err(Error::InvalidState {
                command: "start",
                state: self.state,
            });
        }
        self.send_command(Command::Start).await?;
        self.state = SessionState::Running;
        info!(rate = %self.rate, "Streaming started");
        Ok(())
    }

    /// Halt streaming. Idempotent: calling it while already idle just
    /// re-sends the stop byte, which is how a device in an unknown state
    /// gets forced back to a known one.
    pub async fn stop(&mut self) -> Result<(), Error> {
        self.send_command(Command::Stop).await?;
        sleep(self.config.command_settle).await;
        self.state = SessionState::Idle;
        info!("Streaming stopped");
        Ok(())
    }

    /// Discard everything already received: the port's input FIFO and the
    /// decoder's carry buffer. Returns the number of bytes dropped.
    pub fn discard_input(&mut self) -> Result<usize, Error> {
        let waiting = self.port.bytes_waiting()?;
        self.port.reset_input_buffer()?;
        let buffered = self.decoder.discard_buffered();
        Ok(waiting + buffered)
    }

    /// Post-stop cleanup: wait `drain_settle` for bytes still in flight
    /// to land, then discard them. Stopping does not drain by itself;
    /// the caller decides when the pipeline should be emptied.
    pub async fn drain(&mut self) -> Result<usize, Error> {
        sleep(self.config.drain_settle).await;
        let dropped = self.discard_input()?;
        debug!(dropped, "Drained stale input");
        Ok(dropped)
    }

    /// Exchange the identification handshake and return the verified
    /// identity. Only valid while idle; while running the reply would
    /// interleave with sample frames.
    pub async fn handshake(&mut self) -> Result<String, Error> {
        if self.state != SessionState::Idle {
            return Err(Error::InvalidState {
                command: "handshake",
                state: self.state,
            });
        }
        self.discard_input()?;
        self.send_command(Command::Handshake).await?;

        let mut reply = [0u8; HANDSHAKE_REPLY_SIZE];
        let mut filled = 0;
        let deadline = Instant::now() + self.config.handshake_timeout;
        while filled < HANDSHAKE_REPLY_SIZE {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            filled += self.port.read_available(&mut reply[filled..], deadline - now).await?;
        }
        if filled < HANDSHAKE_REPLY_SIZE {
            return Err(Error::IncompleteResponse {
                expected: HANDSHAKE_REPLY_SIZE,
                actual: filled,
            });
        }

        debug!(reply = %hex::encode(reply), "Handshake reply");
        let ident = handshake::verify_reply(&reply)?;
        info!(ident = %ident, "Handshake verified");
        Ok(ident)
    }

    /// Pull up to `max` decoded samples, waiting at most `timeout` for
    /// bytes to arrive. A short or empty result is the normal outcome of
    /// a slow or stopped stream, not an error. Legal in any state: noise
    /// arriving while idle decodes or resyncs like any other bytes.
    pub async fn read_samples(&mut self, max: usize, timeout: Duration) -> Result<Vec<Sample>, Error> {
        let mut out = Vec::with_capacity(max);
        let mut chunk = vec![0u8; self.config.read_chunk];
        let deadline = Instant::now() + timeout;
        loop {
            while out.len() < max {
                match self.decoder.next_sample() {
                    Some(sample) => out.push(sample),
                    None => break,
                }
            }
            if out.len() >= max {
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let wait = cmp::min(self.config.idle_poll, deadline - now);
            let n = self.port.read_available(&mut chunk, wait).await?;
            if n > 0 {
                self.decoder.push_bytes(&chunk[..n]);
            }
        }
        Ok(out)
    }

    /// Count raw bytes over a wall-clock window without decoding them.
    ///
    /// The window expiring is the only exit; byte totals never cut it
    /// short, and a silent link simply counts zero. Returns the count and
    /// the elapsed time actually measured. Bytes seen here never reach
    /// the frame decoder.
    pub async fn count_raw_bytes(&mut self, window: Duration) -> Result<(u64, Duration), Error> {
        let mut chunk = vec![0u8; self.config.read_chunk];
        let mut total: u64 = 0;
        let started = Instant::now();
        loop {
            let elapsed = started.elapsed();
            if elapsed >= window {
                break;
            }
            let wait = cmp::min(self.config.idle_poll, window - elapsed);
            total += self.port.read_available(&mut chunk, wait).await? as u64;
        }
        Ok((total, started.elapsed()))
    }
}
