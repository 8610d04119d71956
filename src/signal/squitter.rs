//! Pulse-position squitter synthesizer
//!
//! Builds a complex baseband stream of ADS-B frames separated by idle gaps.
//! Pulses are `amplitude · e^(j·ω·n)` with a slow carrier rotation ω, and
//! seeded noise is added to every sample, idle ones included.

use num::Complex;
use rand::prelude::*;
use snafu::ensure;
use tracing::debug;

use super::noise::ComplexNoise;
use crate::adsb::{preamble_slots, PREAMBLE_US};
use crate::correlator::MAX_PAYLOAD_BITS;
use crate::error::{
    ConfigError, InvalidGeneratorSnafu, InvalidPayloadLengthSnafu,
    InvalidSamplesPerMicrosecondSnafu,
};
use crate::fixed::{ComplexSample, FixedFormat};

/// On/off keying of one frame: preamble then one PPM symbol per bit.
///
/// A 1 bit puts the pulse in the first half of its microsecond, a 0 bit in
/// the second half. `samples_per_us` must be even.
pub fn ppm_envelope(
    payload: u128,
    bit_len: usize,
    samples_per_us: usize,
) -> Result<Vec<bool>, ConfigError> {
    ensure!(
        (1..=MAX_PAYLOAD_BITS).contains(&bit_len),
        InvalidPayloadLengthSnafu {
            payload_len: bit_len,
            max: MAX_PAYLOAD_BITS
        }
    );
    let half = samples_per_us / 2;
    let mut envelope = Vec::with_capacity((PREAMBLE_US + bit_len) * samples_per_us);

    for slot in preamble_slots() {
        envelope.extend(std::iter::repeat(slot).take(half));
    }
    for b in 0..bit_len {
        let bit = (payload >> (bit_len - 1 - b)) & 1 == 1;
        envelope.extend(std::iter::repeat(bit).take(half));
        envelope.extend(std::iter::repeat(!bit).take(half));
    }
    Ok(envelope)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SquitterSynthConfig {
    pub samples_per_us: usize,
    /// Pulse amplitude in real units (`GAIN` counts per unit once quantized)
    pub amplitude: f64,
    /// Carrier rotation in radians/sample
    pub carrier_step: f64,
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for SquitterSynthConfig {
    fn default() -> Self {
        Self {
            samples_per_us: 64,
            amplitude: 2.0,
            carrier_step: 0.013,
            noise_std: 0.06,
            seed: 1,
        }
    }
}

/// Accumulates idle gaps and frames into one sample stream
#[derive(Debug, Clone)]
pub struct SquitterSynth {
    config: SquitterSynthConfig,
    rng: StdRng,
    noise: ComplexNoise,
    samples: Vec<Complex<f64>>,
}

impl SquitterSynth {
    pub fn new(config: SquitterSynthConfig) -> Result<Self, ConfigError> {
        ensure!(
            config.samples_per_us > 0 && config.samples_per_us % 2 == 0,
            InvalidSamplesPerMicrosecondSnafu {
                samples_per_us: config.samples_per_us
            }
        );
        ensure!(
            config.amplitude.is_finite(),
            InvalidGeneratorSnafu {
                name: "amplitude",
                value: config.amplitude
            }
        );
        ensure!(
            config.carrier_step.is_finite(),
            InvalidGeneratorSnafu {
                name: "carrier_step",
                value: config.carrier_step
            }
        );
        let noise = ComplexNoise::new(config.noise_std)?;
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            noise,
            samples: Vec::new(),
            config,
        })
    }

    /// Samples occupied by a frame of `bit_len` payload bits
    pub fn frame_len(&self, bit_len: usize) -> usize {
        (PREAMBLE_US + bit_len) * self.config.samples_per_us
    }

    /// Append `count` samples of noise only
    pub fn idle(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.push(false);
        }
        self
    }

    /// Append one frame; returns the index of its first preamble sample
    pub fn frame(&mut self, payload: u128, bit_len: usize) -> Result<usize, ConfigError> {
        let envelope = ppm_envelope(payload, bit_len, self.config.samples_per_us)?;
        let start = self.samples.len();
        for on in envelope {
            self.push(on);
        }
        debug!(start, bit_len, payload = format!("{:x}", payload), "synthesized frame");
        Ok(start)
    }

    fn push(&mut self, on: bool) {
        let n = self.samples.len() as f64;
        let carrier = if on {
            Complex::from_polar(self.config.amplitude, self.config.carrier_step * n)
        } else {
            Complex::new(0.0, 0.0)
        };
        let sample = carrier + self.noise.sample(&mut self.rng);
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Complex<f64>] {
        &self.samples
    }

    /// Quantize the stream into `format`
    pub fn to_fixed(&self, format: FixedFormat) -> Vec<ComplexSample> {
        self.samples
            .iter()
            .map(|&s| ComplexSample::from_complex(s, format))
            .collect()
    }

    pub fn into_samples(self) -> Vec<Complex<f64>> {
        self.samples
    }
}
