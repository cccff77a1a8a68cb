use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::constants::{CMD_HANDSHAKE, CMD_START, CMD_STOP};

/// Sample rates the firmware timer can be programmed to.
///
/// The discriminant is the wire byte that selects the rate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, Default, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum RateMode {
    /// Firmware default after reset
    #[default]
    #[strum(to_string = "1 kHz")]
    Khz1 = 0x10,
    #[strum(to_string = "10 kHz")]
    Khz10 = 0x11,
    #[strum(to_string = "20 kHz")]
    Khz20 = 0x12,
}

impl RateMode {
    /// Every mode, slowest first.
    pub const ALL: [RateMode; 3] = [RateMode::Khz1, RateMode::Khz10, RateMode::Khz20];

    /// Nominal rate in samples per second.
    pub fn as_hz(&self) -> u32 {
        match self {
            RateMode::Khz1 => 1_000,
            RateMode::Khz10 => 10_000,
            RateMode::Khz20 => 20_000,
        }
    }
}

/// Single-byte commands the firmware accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    SelectRate(RateMode),
    Handshake,
}

impl Command {
    /// Encode as the wire byte.
    pub fn to_wire(self) -> u8 {
        match self {
            Command::Start => CMD_START,
            Command::Stop => CMD_STOP,
            Command::SelectRate(mode) => mode.into(),
            Command::Handshake => CMD_HANDSHAKE,
        }
    }

    /// Decode a wire byte. Anything outside the command table yields
    /// `None`; the firmware silently ignores such bytes.
    pub fn from_wire(byte: u8) -> Option<Command> {
        match byte {
            CMD_START => Some(Command::Start),
            CMD_STOP => Some(Command::Stop),
            CMD_HANDSHAKE => Some(Command::Handshake),
            other => RateMode::try_from(other).ok().map(Command::SelectRate),
        }
    }
}
