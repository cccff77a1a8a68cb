use bytes::{Buf, BytesMut};
use modular_bitfield::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{ADC_STEPS, FRAME_SIZE, SAMPLE_MAX, V_REF};

/// First byte of a sample frame: marker set, D9..D7 in the low bits.
///
/// Bits 3..=6 are always zero on the wire; the decoder does not check
/// them, only the marker.
#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighByte {
    pub data: B3,
    #[skip]
    unused: B4,
    pub marker: bool,
}

/// Second byte of a sample frame: marker clear, D6..D0 in the low bits.
#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowByte {
    pub data: B7,
    pub marker: bool,
}

/// One reconstructed 10-bit ADC reading, always in [0, 1023].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sample(u16);

impl Sample {
    /// Wrap a raw reading, masking it into the 10-bit range.
    pub fn new(raw: u16) -> Self {
        Sample(raw & SAMPLE_MAX)
    }

    fn from_parts(high: HighByte, low: LowByte) -> Self {
        Sample(((high.data() as u16) << 7) | low.data() as u16)
    }

    /// The raw ADC value.
    pub fn raw(self) -> u16 {
        self.0
    }

    /// The reading in volts against the ADC reference.
    pub fn volts(self) -> f64 {
        self.0 as f64 * V_REF / ADC_STEPS
    }

    /// Encode as the two-byte wire frame.
    pub fn to_wire(self) -> [u8; FRAME_SIZE] {
        let high = HighByte::new().with_data(((self.0 >> 7) & 0x07) as u8).with_marker(true);
        let low = LowByte::new().with_data((self.0 & 0x7F) as u8).with_marker(false);
        [high.into_bytes()[0], low.into_bytes()[0]]
    }
}

/// Decode counters, cumulative over the life of one decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Frames successfully decoded into samples
    pub valid_frames: u64,
    /// Bytes discarded while hunting for frame alignment
    pub sync_errors: u64,
}

/// Incremental decoder for the two-byte sample framing.
///
/// Bytes go in through [`push_bytes`](Self::push_bytes) in whatever chunk
/// sizes the port delivers; samples come out through
/// [`next_sample`](Self::next_sample). Between calls the decoder carries
/// at most the bytes it has not consumed yet, so a frame split across two
/// reads decodes exactly like one delivered whole.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
    valid_frames: u64,
    sync_errors: u64,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes from the port.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Decode the next sample, or `None` when more bytes are needed.
    ///
    /// Never blocks and never fails. A byte without the marker where a
    /// high byte should be, or a second marker where the low byte should
    /// be, costs one `sync_error` and advances the scan by exactly one
    /// byte; consumed bytes are never revisited.
    pub fn next_sample(&mut self) -> Option<Sample> {
        loop {
            let high = HighByte::from_bytes([*self.buf.first()?]);
            if !high.marker() {
                // Noise where a high byte belongs: resync byte by byte.
                self.buf.advance(1);
                self.sync_errors += 1;
                continue;
            }
            let low = LowByte::from_bytes([*self.buf.get(1)?]);
            if low.marker() {
                // Two markers back to back means the low half was lost.
                // The stale high byte goes; the second becomes the new
                // frame candidate.
                self.buf.advance(1);
                self.sync_errors += 1;
                continue;
            }
            self.buf.advance(FRAME_SIZE);
            self.valid_frames += 1;
            return Some(Sample::from_parts(high, low));
        }
    }

    /// Iterator over everything currently decodable.
    pub fn samples(&mut self) -> impl Iterator<Item = Sample> + '_ {
        std::iter::from_fn(move || self.next_sample())
    }

    /// Drop buffered, not-yet-decoded bytes. Counters survive.
    pub fn discard_buffered(&mut self) -> usize {
        let dropped = self.buf.len();
        self.buf.clear();
        dropped
    }

    /// Bytes waiting in the carry buffer.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn valid_frames(&self) -> u64 {
        self.valid_frames
    }

    pub fn sync_errors(&self) -> u64 {
        self.sync_errors
    }

    pub fn stats(&self) -> DecodeStats {
        DecodeStats {
            valid_frames: self.valid_frames,
            sync_errors: self.sync_errors,
        }
    }
}
