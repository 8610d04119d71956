///! Preamble Correlator / Squitter Decoder
///!
///! Slides a known chip pattern over a magnitude stream. When the dot product
///! reaches the threshold, the detector (optionally) holds for the correlation
///! peak, then slices `payload_len` bits from the samples that follow and
///! emits them as one [`DecodedMessage`].
///!
///! **Module Organization**:
///! - `preamble` - Chip patterns (generic, ADS-B)
///! - `config` - Threshold, payload shape, overlap policy
///! - `detector` - The Searching → Triggered → Decoding state machine
///! - `fir` - Optional magnitude smoothing between front end and detector
///! - `receiver` - IQ front end (CORDIC magnitude) feeding the detector

pub mod config;
pub mod detector;
pub mod fir;
pub mod preamble;
pub mod receiver;

pub use config::{CorrelatorConfig, OverlapPolicy, PayloadEncoding, MAX_PAYLOAD_BITS};
pub use detector::{Correlator, CorrelatorStats, DecodedMessage, DetectorState};
pub use fir::MagnitudeFir;
pub use preamble::Preamble;
pub use receiver::SquitterReceiver;
