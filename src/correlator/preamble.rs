//! Preamble chip patterns

use snafu::ensure;

use crate::adsb::preamble_slots;
use crate::error::{ConfigError, EmptyPreambleSnafu, InvalidSamplesPerMicrosecondSnafu};

/// Known ±1 (or weighted) chip sequence, one chip per input sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    chips: Vec<i32>,
}

impl Preamble {
    pub fn new(chips: Vec<i32>) -> Result<Self, ConfigError> {
        ensure!(!chips.is_empty(), EmptyPreambleSnafu);
        Ok(Self { chips })
    }

    /// Repeat each pattern chip `samples_per_chip` times
    pub fn from_pattern(pattern: &[i32], samples_per_chip: usize) -> Result<Self, ConfigError> {
        let chips = pattern
            .iter()
            .flat_map(|&c| std::iter::repeat(c).take(samples_per_chip))
            .collect();
        Self::new(chips)
    }

    /// Map bits to +1 / −1 chips, each held for `samples_per_chip` samples
    pub fn from_bits(bits: &[bool], samples_per_chip: usize) -> Result<Self, ConfigError> {
        let pattern: Vec<i32> = bits.iter().map(|&b| if b { 1 } else { -1 }).collect();
        Self::from_pattern(&pattern, samples_per_chip)
    }

    /// 8 µs Mode S preamble: +1 inside the 0.5 µs pulses at 0, 1.0, 3.5 and
    /// 4.5 µs, −1 elsewhere
    pub fn adsb(samples_per_us: usize) -> Result<Self, ConfigError> {
        ensure!(
            samples_per_us > 0 && samples_per_us % 2 == 0,
            InvalidSamplesPerMicrosecondSnafu { samples_per_us }
        );
        Self::from_bits(&preamble_slots(), samples_per_us / 2)
    }

    pub fn chips(&self) -> &[i32] {
        &self.chips
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// Always false; construction rejects empty patterns
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Dot product with a window of samples, oldest first
    pub fn correlate<'a, I>(&self, window: I) -> i64
    where
        I: IntoIterator<Item = &'a i64>,
    {
        window
            .into_iter()
            .zip(self.chips.iter())
            .fold(0i64, |acc, (&s, &c)| acc.saturating_add(s.saturating_mul(c as i64)))
    }

    /// Correlation of an ideal on/off pulse train of height `amplitude`
    pub fn ideal_correlation(&self, amplitude: i64) -> i64 {
        self.chips
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| c as i64 * amplitude)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adsb_chips() {
        let preamble = Preamble::adsb(2).unwrap();
        let expected = [1, -1, 1, -1, -1, -1, -1, 1, -1, 1, -1, -1, -1, -1, -1, -1];
        assert_eq!(preamble.chips(), &expected);

        let preamble = Preamble::adsb(64).unwrap();
        assert_eq!(preamble.len(), 512);
        assert_eq!(preamble.chips().iter().filter(|&&c| c == 1).count(), 4 * 32);
        // 3.5 µs pulse starts at sample 224
        assert_eq!(preamble.chips()[223], -1);
        assert_eq!(preamble.chips()[224], 1);
        assert_eq!(preamble.chips()[255], 1);
        assert_eq!(preamble.chips()[256], -1);
    }

    #[test]
    fn test_adsb_rejects_odd_rates() {
        assert!(Preamble::adsb(0).is_err());
        assert!(Preamble::adsb(5).is_err());
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(Preamble::new(vec![]), Err(ConfigError::EmptyPreamble));
        assert!(Preamble::from_pattern(&[1, -1], 0).is_err());
    }

    #[test]
    fn test_correlate() {
        let preamble = Preamble::from_pattern(&[1, -1, 1], 2).unwrap();
        let window = [5i64, 5, 0, 0, 5, 5];
        assert_eq!(preamble.correlate(&window), 20);
        assert_eq!(preamble.ideal_correlation(5), 20);
        assert_eq!(preamble.correlate(&[1i64, 1, 1, 1, 1, 1]), 2);
    }
}
