///! Test Signal Generation
///!
///! Deterministic (seeded) stimulus for the loop and the receiver.
///!
///! **Module Organization**:
///! - `noise` - Seeded complex white Gaussian noise
///! - `bpsk` - Random-symbol BPSK on a residual carrier offset
///! - `squitter` - Pulse-position-modulated 1090 MHz frames

pub mod bpsk;
pub mod noise;
pub mod squitter;

pub use bpsk::{generate_bpsk, BpskConfig, BpskGenerator};
pub use noise::ComplexNoise;
pub use squitter::{ppm_envelope, SquitterSynth, SquitterSynthConfig};
