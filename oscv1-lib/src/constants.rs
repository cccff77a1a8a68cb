// Protocol constants for the OSC_V1 digitizer

use std::time::Duration;

/// Marker bit distinguishing frame halves (set on the high byte only)
pub const MARKER_BIT: u8 = 0x80;

/// Size of one sample frame on the wire (2 bytes)
pub const FRAME_SIZE: usize = 2;

/// Maximum reconstructable sample value (10-bit ADC)
pub const SAMPLE_MAX: u16 = 0x3FF;

/// Identification string sent in the handshake reply, LF-terminated
pub const IDENT: &[u8; 7] = b"OSC_V1\n";

/// Size of the full handshake reply (ident + 1 checksum byte)
pub const HANDSHAKE_REPLY_SIZE: usize = 8;

/// Command byte: begin streaming samples
pub const CMD_START: u8 = 0x01;

/// Command byte: halt streaming
pub const CMD_STOP: u8 = 0x02;

/// Command byte: select the 1 kHz sample rate
pub const CMD_RATE_1KHZ: u8 = 0x10;

/// Command byte: select the 10 kHz sample rate
pub const CMD_RATE_10KHZ: u8 = 0x11;

/// Command byte: select the 20 kHz sample rate
pub const CMD_RATE_20KHZ: u8 = 0x12;

/// Command byte: request the handshake reply (`?`)
pub const CMD_HANDSHAKE: u8 = 0x3F;

/// UART baud rate the firmware is flashed for
pub const BAUD_RATE: u32 = 2_000_000;

/// ADC reference voltage in volts
pub const V_REF: f64 = 5.0;

/// ADC quantization steps (10-bit)
pub const ADC_STEPS: f64 = 1024.0;

/// Settle time after opening the port (the board auto-resets on DTR)
pub const RESET_SETTLE: Duration = Duration::from_secs(2);

/// Settle time after a state-changing command byte
pub const COMMAND_SETTLE: Duration = Duration::from_millis(50);

/// Wait for in-flight bytes to land before flushing after a stop
pub const DRAIN_SETTLE: Duration = Duration::from_millis(100);

/// Deadline for the complete handshake reply
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(500);

/// Poll interval while waiting for bytes in a measurement loop
pub const IDLE_POLL: Duration = Duration::from_millis(1);

/// Default per-read buffer size for bulk acquisition
pub const READ_CHUNK: usize = 4096;

/// Default throughput measurement window
pub const AUDIT_WINDOW: Duration = Duration::from_secs(10);

/// Stream warm-up discarded before a throughput measurement
pub const AUDIT_WARMUP: Duration = Duration::from_millis(200);
