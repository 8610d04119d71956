//! BPSK test signal with a residual carrier offset
//!
//! sample[n] = symbol[n / sps] · e^(j·2π·f·(n + start)/fs) + noise[n]
//!
//! Symbols are drawn uniformly from {−1, +1}. Noise is independent
//! N(0, σ²) on I and Q. The whole sequence is a pure function of the
//! configuration, seed included.

use num::Complex;
use rand::prelude::*;
use snafu::ensure;

use super::noise::ComplexNoise;
use crate::error::{ConfigError, InvalidGeneratorSnafu};
use crate::fixed::{ComplexSample, FixedFormat};

#[derive(Debug, Clone, PartialEq)]
pub struct BpskConfig {
    pub num_samples: usize,
    pub samples_per_symbol: usize,
    /// Residual carrier offset in Hz
    pub freq_offset: f64,
    pub sample_rate: f64,
    pub noise_std: f64,
    pub seed: u64,
    /// Carrier phase index of the first sample
    pub start_index: usize,
}

impl Default for BpskConfig {
    fn default() -> Self {
        Self {
            num_samples: 500,
            samples_per_symbol: 1,
            freq_offset: 300.0,
            sample_rate: 19_000.0,
            noise_std: 0.0,
            seed: 0,
            start_index: 0,
        }
    }
}

/// Lazy, finite, restartable BPSK sample source
#[derive(Debug, Clone)]
pub struct BpskGenerator {
    config: BpskConfig,
    rng: StdRng,
    noise: ComplexNoise,
    index: usize,
    symbol: f64,
}

impl BpskGenerator {
    pub fn new(config: BpskConfig) -> Result<Self, ConfigError> {
        ensure!(
            config.samples_per_symbol > 0,
            InvalidGeneratorSnafu {
                name: "samples_per_symbol",
                value: config.samples_per_symbol as f64
            }
        );
        ensure!(
            config.sample_rate.is_finite() && config.sample_rate > 0.0,
            InvalidGeneratorSnafu {
                name: "sample_rate",
                value: config.sample_rate
            }
        );
        ensure!(
            config.freq_offset.is_finite(),
            InvalidGeneratorSnafu {
                name: "freq_offset",
                value: config.freq_offset
            }
        );
        let noise = ComplexNoise::new(config.noise_std)?;
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            noise,
            index: 0,
            symbol: 1.0,
            config,
        })
    }

    pub fn config(&self) -> &BpskConfig {
        &self.config
    }

    /// Rewind to the first sample; the replay is identical
    pub fn restart(&mut self) {
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.index = 0;
        self.symbol = 1.0;
    }

    /// Quantize each sample into `format` (clip, then truncate)
    pub fn quantized(self, format: FixedFormat) -> impl Iterator<Item = ComplexSample> {
        self.map(move |s| ComplexSample::from_complex(s, format))
    }
}

impl Iterator for BpskGenerator {
    type Item = Complex<f64>;

    fn next(&mut self) -> Option<Complex<f64>> {
        if self.index >= self.config.num_samples {
            return None;
        }
        if self.index % self.config.samples_per_symbol == 0 {
            self.symbol = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        }

        let n = (self.index + self.config.start_index) as f64;
        let phase = 2.0 * std::f64::consts::PI * self.config.freq_offset * n / self.config.sample_rate;
        let sample = Complex::from_polar(self.symbol, phase) + self.noise.sample(&mut self.rng);

        self.index += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.config.num_samples - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BpskGenerator {}

/// Convenience constructor matching the reference harness parameters
pub fn generate_bpsk(
    num_samples: usize,
    samples_per_symbol: usize,
    freq_offset: f64,
    sample_rate: f64,
    noise_std: f64,
    seed: u64,
) -> Result<BpskGenerator, ConfigError> {
    BpskGenerator::new(BpskConfig {
        num_samples,
        samples_per_symbol,
        freq_offset,
        sample_rate,
        noise_std,
        seed,
        start_index: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_samples() {
        let a: Vec<_> = generate_bpsk(200, 4, 300.0, 19e3, 0.1, 42).unwrap().collect();
        let b: Vec<_> = generate_bpsk(200, 4, 300.0, 19e3, 0.1, 42).unwrap().collect();
        let c: Vec<_> = generate_bpsk(200, 4, 300.0, 19e3, 0.1, 43).unwrap().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_restart_replays() {
        let mut generator = generate_bpsk(64, 2, 100.0, 8e3, 0.5, 3).unwrap();
        let first: Vec<_> = generator.by_ref().collect();
        assert_eq!(generator.next(), None);
        generator.restart();
        let second: Vec<_> = generator.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_symbols_repeat_and_are_unit_magnitude() {
        let sps = 8;
        let samples: Vec<_> = generate_bpsk(800, sps, 300.0, 19e3, 0.0, 1).unwrap().collect();
        assert_eq!(samples.len(), 800);
        assert!(samples.iter().all(|s| (s.norm() - 1.0).abs() < 1e-12));

        // Remove the carrier to expose the symbol stream
        let w = 2.0 * std::f64::consts::PI * 300.0 / 19e3;
        let symbols: Vec<f64> = samples
            .iter()
            .enumerate()
            .map(|(n, s)| (s * Complex::from_polar(1.0, -w * n as f64)).re.signum())
            .collect();
        for chunk in symbols.chunks(sps) {
            assert!(chunk.iter().all(|&v| v == chunk[0]));
        }
        assert!(symbols.iter().any(|&v| v > 0.0));
        assert!(symbols.iter().any(|&v| v < 0.0));
    }

    #[test]
    fn test_start_index_shifts_carrier() {
        let config = BpskConfig {
            num_samples: 1,
            start_index: 300,
            ..BpskConfig::default()
        };
        let sample = BpskGenerator::new(config.clone()).unwrap().next().unwrap();
        let expected = 2.0 * std::f64::consts::PI * 300.0 * 300.0 / 19e3;
        let angle = sample.im.atan2(sample.re);
        let diff = (angle - expected).rem_euclid(std::f64::consts::PI);
        assert!(diff < 1e-9 || std::f64::consts::PI - diff < 1e-9);
    }

    #[test]
    fn test_quantized_uses_gain_scale() {
        let generator = generate_bpsk(10, 1, 0.0, 19e3, 0.0, 5).unwrap();
        for s in generator.quantized(FixedFormat::IQ16) {
            assert_eq!(s.i.raw().abs(), 1024);
            assert_eq!(s.q.raw(), 0);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(generate_bpsk(10, 0, 300.0, 19e3, 0.0, 0).is_err());
        assert!(generate_bpsk(10, 1, 300.0, 0.0, 0.0, 0).is_err());
        assert!(generate_bpsk(10, 1, 300.0, 19e3, -1.0, 0).is_err());
        assert!(generate_bpsk(10, 1, f64::NAN, 19e3, 0.0, 0).is_err());
    }
}
