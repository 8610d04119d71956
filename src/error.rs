//! Configuration errors
//!
//! Every kernel validates its configuration once, at construction. Step calls
//! never fail: saturation is silent and incomplete decodes are dropped.

use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    /// CORDIC iteration count outside the arctangent table
    #[snafu(display("CORDIC iteration count must be in 1..={max}, got {iterations}"))]
    InvalidIterations { iterations: usize, max: usize },

    /// Fixed-point lane width or fraction bits out of range
    #[snafu(display("fixed-point format needs 2..=63 bits and fewer fraction bits than width, got {bits} bits / {frac_bits} fraction bits"))]
    InvalidFixedFormat { bits: u32, frac_bits: u32 },

    /// Loop gain outside its documented range
    #[snafu(display("loop gain {name} = {value} is outside (0, {max}]"))]
    InvalidLoopGain {
        name: &'static str,
        value: f64,
        max: f64,
    },

    /// Preamble has no chips
    #[snafu(display("preamble pattern is empty"))]
    EmptyPreamble,

    /// FIR with no taps
    #[snafu(display("FIR filter needs at least one tap"))]
    EmptyFilter,

    /// Payload length is zero or wider than the packed message
    #[snafu(display("payload length must be in 1..={max} bits, got {payload_len}"))]
    InvalidPayloadLength { payload_len: usize, max: usize },

    /// Symbol period too short for the payload encoding
    #[snafu(display("samples per bit must be at least {min}, got {samples_per_bit}"))]
    InvalidSamplesPerBit { samples_per_bit: usize, min: usize },

    /// Peak hold long enough to swallow a whole payload
    #[snafu(display("peak window of {peak_window} samples must be shorter than the {payload_samples}-sample payload"))]
    PeakWindowTooLong {
        peak_window: usize,
        payload_samples: usize,
    },

    /// ADS-B timing needs whole half-microsecond chips
    #[snafu(display("samples per microsecond must be even and non-zero, got {samples_per_us}"))]
    InvalidSamplesPerMicrosecond { samples_per_us: usize },

    /// Signal generator parameters
    #[snafu(display("signal generator parameter {name} is invalid: {value}"))]
    InvalidGenerator { name: &'static str, value: f64 },
}
