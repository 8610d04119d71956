//! Mode S / ADS-B Squitter Framing
//!
//! Timing constants for the 1090 MHz preamble and pulse-position payload,
//! the Mode S CRC-24, and field accessors for decoded squitters.
//!
//! Frame layout (each bit is 1 µs, split into two 0.5 µs chips):
//! ```text
//! | preamble 8 µs | 56 or 112 bits |
//!   pulses at 0, 1, 3.5 and 4.5 µs
//! ```
//!
//! Reference: ICAO Annex 10 Vol IV, 3.1.2 (Mode S signals in space)

use crc::{Algorithm, Crc};
use snafu::{ensure, Snafu};

use crate::correlator::DecodedMessage;

/// Preamble length in microseconds
pub const PREAMBLE_US: usize = 8;

/// Preamble pulse start times, in half-microsecond slots
pub const PREAMBLE_PULSE_SLOTS: [usize; 4] = [0, 2, 7, 9];

/// Short (DF0/4/5/11) squitter length
pub const SHORT_SQUITTER_BITS: usize = 56;

/// Extended (DF17/18) squitter length
pub const LONG_SQUITTER_BITS: usize = 112;

/// Mode S CRC-24 generator polynomial
const MODE_S_POLYNOMIAL: u32 = 0xFFF409;

const CRC_MODE_S: Algorithm<u32> = Algorithm {
    width: 24,
    poly: MODE_S_POLYNOMIAL,
    init: 0x0,
    refin: false,
    refout: false,
    xorout: 0x0,
    check: 0x054268,
    residue: 0x0,
};

const MODE_S_CRC: Crc<u32> = Crc::<u32>::new(&CRC_MODE_S);

/// The preamble as 16 half-microsecond slots (true = pulse)
pub fn preamble_slots() -> [bool; 2 * PREAMBLE_US] {
    let mut slots = [false; 2 * PREAMBLE_US];
    for &slot in PREAMBLE_PULSE_SLOTS.iter() {
        slots[slot] = true;
    }
    slots
}

/// Mode S CRC-24 over whole bytes.
///
/// Running it over a complete DF17/18 message (data plus parity) yields 0.
pub fn crc24(bytes: &[u8]) -> u32 {
    MODE_S_CRC.checksum(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum SquitterError {
    #[snafu(display("Unsupported squitter length: {} bits (expected 56 or 112)", bit_len))]
    UnsupportedLength { bit_len: usize },
}

/// A decoded 56- or 112-bit Mode S message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Squitter {
    bytes: [u8; 14],
    len: usize,
}

impl Squitter {
    /// Build from message bytes (7 or 14 of them)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SquitterError> {
        ensure!(
            bytes.len() == SHORT_SQUITTER_BITS / 8 || bytes.len() == LONG_SQUITTER_BITS / 8,
            UnsupportedLengthSnafu {
                bit_len: bytes.len() * 8
            }
        );
        let mut buf = [0u8; 14];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: bytes.len(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn bit_len(&self) -> usize {
        self.len * 8
    }

    pub fn is_extended(&self) -> bool {
        self.bit_len() == LONG_SQUITTER_BITS
    }

    /// Downlink format (first 5 bits)
    pub fn downlink_format(&self) -> u8 {
        self.bytes[0] >> 3
    }

    /// Transponder capability (bits 6..8)
    pub fn capability(&self) -> u8 {
        self.bytes[0] & 0x07
    }

    /// 24-bit aircraft address (bits 9..32)
    pub fn icao(&self) -> u32 {
        u32::from_be_bytes([0, self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    /// 56-bit ME field of an extended squitter
    pub fn me(&self) -> Option<u64> {
        if !self.is_extended() {
            return None;
        }
        let mut buf = [0u8; 8];
        buf[1..].copy_from_slice(&self.bytes[4..11]);
        Some(u64::from_be_bytes(buf))
    }

    /// ME type code (first 5 bits of ME)
    pub fn type_code(&self) -> Option<u8> {
        self.me().map(|me| (me >> 51) as u8)
    }

    /// Trailing 24 parity bits
    pub fn parity(&self) -> u32 {
        let tail = &self.bytes[self.len - 3..self.len];
        u32::from_be_bytes([0, tail[0], tail[1], tail[2]])
    }

    /// True when the CRC over the whole message leaves no residual
    /// (address/parity overlay cleared, as in DF11/17/18)
    pub fn parity_ok(&self) -> bool {
        crc24(self.bytes()) == 0
    }

    pub fn to_hex(&self) -> String {
        self.bytes().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl TryFrom<&DecodedMessage> for Squitter {
    type Error = SquitterError;

    fn try_from(message: &DecodedMessage) -> Result<Self, Self::Error> {
        ensure!(
            message.bit_len == SHORT_SQUITTER_BITS || message.bit_len == LONG_SQUITTER_BITS,
            UnsupportedLengthSnafu {
                bit_len: message.bit_len
            }
        );
        Self::from_bytes(&message.to_bytes())
    }
}
