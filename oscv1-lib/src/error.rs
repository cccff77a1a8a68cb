use std::io;
use thiserror::Error;

use crate::session::SessionState;

/// The primary error type for the `oscv1` library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no serial port looks like an OSC_V1 digitizer. Is the board plugged in?")]
    DeviceNotFound,

    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("handshake reply incomplete: expected {expected} bytes, got {actual} before the deadline")]
    IncompleteResponse { expected: usize, actual: usize },

    #[error("handshake identity mismatch: expected {expected:?}, got {actual:?}")]
    IdentityMismatch { expected: String, actual: String },

    #[error("handshake checksum mismatch: computed {computed:#04x}, received {received:#04x}")]
    ChecksumMismatch { computed: u8, received: u8 },

    #[error("{command} is not valid while the session is {state}")]
    InvalidState {
        command: &'static str,
        state: SessionState,
    },
}
