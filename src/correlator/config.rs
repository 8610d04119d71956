//! Correlator configuration
//!
//! Fixed at construction. The ADS-B preset mirrors the 64 MHz reference
//! harness: 8 µs preamble, 112 PPM bits, half-microsecond peak hold.

use snafu::ensure;

use super::preamble::Preamble;
use crate::adsb::LONG_SQUITTER_BITS;
use crate::error::{
    ConfigError, InvalidPayloadLengthSnafu, InvalidSamplesPerBitSnafu, PeakWindowTooLongSnafu,
};

/// Widest payload that packs into the `u128` message word
pub const MAX_PAYLOAD_BITS: usize = 128;

/// How each payload symbol maps to a bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadEncoding {
    /// Bit = 1 when the first half-period carries more energy than the second
    PulsePosition,
    /// Integrate-and-dump; bit = 1 when the period sum is positive
    #[default]
    Level,
}

impl PayloadEncoding {
    fn min_samples_per_bit(self) -> usize {
        match self {
            PayloadEncoding::PulsePosition => 2,
            PayloadEncoding::Level => 1,
        }
    }
}

/// What a threshold crossing does while a payload is being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Keep decoding; count the crossing as ignored
    #[default]
    IgnoreWhileDecoding,
    /// Drop the partial payload and re-trigger
    Restart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatorConfig {
    preamble: Preamble,
    threshold: i64,
    payload_len: usize,
    samples_per_bit: usize,
    encoding: PayloadEncoding,
    peak_window: usize,
    overlap: OverlapPolicy,
}

impl CorrelatorConfig {
    /// One sample per bit, level slicing, no peak hold, overlaps ignored
    pub fn new(preamble: Preamble, threshold: i64, payload_len: usize) -> Result<Self, ConfigError> {
        ensure!(
            (1..=MAX_PAYLOAD_BITS).contains(&payload_len),
            InvalidPayloadLengthSnafu {
                payload_len,
                max: MAX_PAYLOAD_BITS
            }
        );
        Ok(Self {
            preamble,
            threshold,
            payload_len,
            samples_per_bit: 1,
            encoding: PayloadEncoding::Level,
            peak_window: 0,
            overlap: OverlapPolicy::IgnoreWhileDecoding,
        })
    }

    /// ADS-B extended squitter at `samples_per_us` samples per microsecond
    pub fn adsb(samples_per_us: usize, threshold: i64) -> Result<Self, ConfigError> {
        Ok(Self::new(Preamble::adsb(samples_per_us)?, threshold, LONG_SQUITTER_BITS)?
            .with_symbol_period(samples_per_us, PayloadEncoding::PulsePosition)?
            .with_peak_window(samples_per_us / 2)?)
    }

    pub fn with_symbol_period(
        mut self,
        samples_per_bit: usize,
        encoding: PayloadEncoding,
    ) -> Result<Self, ConfigError> {
        let min = encoding.min_samples_per_bit();
        ensure!(
            samples_per_bit >= min,
            InvalidSamplesPerBitSnafu {
                samples_per_bit,
                min
            }
        );
        self.samples_per_bit = samples_per_bit;
        self.encoding = encoding;
        self.check_peak_window()?;
        Ok(self)
    }

    /// Hold in the triggered state for up to `samples` looking for the peak.
    ///
    /// The window must be shorter than one payload, otherwise the next
    /// frame's preamble could arrive while the detector is still holding.
    pub fn with_peak_window(mut self, samples: usize) -> Result<Self, ConfigError> {
        self.peak_window = samples;
        self.check_peak_window()?;
        Ok(self)
    }

    pub fn with_overlap_policy(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    /// Replace the payload length, e.g. 56 for short squitters
    pub fn with_payload_len(mut self, payload_len: usize) -> Result<Self, ConfigError> {
        ensure!(
            (1..=MAX_PAYLOAD_BITS).contains(&payload_len),
            InvalidPayloadLengthSnafu {
                payload_len,
                max: MAX_PAYLOAD_BITS
            }
        );
        self.payload_len = payload_len;
        self.check_peak_window()?;
        Ok(self)
    }

    /// Samples spanned by a full payload
    pub fn payload_samples(&self) -> usize {
        self.payload_len.saturating_mul(self.samples_per_bit)
    }

    fn check_peak_window(&self) -> Result<(), ConfigError> {
        let payload_samples = self.payload_samples();
        ensure!(
            self.peak_window < payload_samples,
            PeakWindowTooLongSnafu {
                peak_window: self.peak_window,
                payload_samples
            }
        );
        Ok(())
    }

    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    pub fn samples_per_bit(&self) -> usize {
        self.samples_per_bit
    }

    pub fn encoding(&self) -> PayloadEncoding {
        self.encoding
    }

    pub fn peak_window(&self) -> usize {
        self.peak_window
    }

    pub fn overlap(&self) -> OverlapPolicy {
        self.overlap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adsb_preset() {
        let config = CorrelatorConfig::adsb(64, 150_000).unwrap();
        assert_eq!(config.preamble().len(), 512);
        assert_eq!(config.payload_len(), 112);
        assert_eq!(config.samples_per_bit(), 64);
        assert_eq!(config.encoding(), PayloadEncoding::PulsePosition);
        assert_eq!(config.peak_window(), 32);
        assert_eq!(config.overlap(), OverlapPolicy::IgnoreWhileDecoding);
    }

    #[test]
    fn test_payload_bounds() {
        let preamble = Preamble::new(vec![1]).unwrap();
        assert_eq!(
            CorrelatorConfig::new(preamble.clone(), 1, 0),
            Err(ConfigError::InvalidPayloadLength {
                payload_len: 0,
                max: 128
            })
        );
        assert!(CorrelatorConfig::new(preamble.clone(), 1, 129).is_err());
        assert!(CorrelatorConfig::new(preamble, 1, 128).is_ok());
    }

    #[test]
    fn test_symbol_period_bounds() {
        let config = CorrelatorConfig::new(Preamble::new(vec![1]).unwrap(), 1, 8).unwrap();
        assert!(config
            .clone()
            .with_symbol_period(0, PayloadEncoding::Level)
            .is_err());
        assert!(config
            .clone()
            .with_symbol_period(1, PayloadEncoding::PulsePosition)
            .is_err());
        assert!(config.with_symbol_period(2, PayloadEncoding::PulsePosition).is_ok());
    }

    #[test]
    fn test_peak_window_shorter_than_payload() {
        let config = CorrelatorConfig::new(Preamble::new(vec![1]).unwrap(), 1, 4).unwrap();
        assert_eq!(
            config.clone().with_peak_window(4),
            Err(ConfigError::PeakWindowTooLong {
                peak_window: 4,
                payload_samples: 4
            })
        );
        let config = config.with_peak_window(3).unwrap();
        assert!(config.clone().with_payload_len(3).is_err());
        assert!(config
            .with_symbol_period(2, PayloadEncoding::Level)
            .unwrap()
            .with_payload_len(2)
            .is_ok());
    }
}
