//! Integer FIR smoothing ahead of the correlator
//!
//! Direct-form convolution over magnitude samples. The delay line starts
//! zero-filled, so the filter produces output from the first sample.

use std::collections::VecDeque;

use snafu::ensure;

use crate::error::{ConfigError, EmptyFilterSnafu};

#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeFir {
    taps: Vec<i32>,
    history: VecDeque<i64>,
}

impl MagnitudeFir {
    /// `taps[0]` weights the newest sample
    pub fn new(taps: Vec<i32>) -> Result<Self, ConfigError> {
        ensure!(!taps.is_empty(), EmptyFilterSnafu);
        let history = VecDeque::from(vec![0; taps.len()]);
        Ok(Self { taps, history })
    }

    pub fn taps(&self) -> &[i32] {
        &self.taps
    }

    /// Sum of the taps, i.e. the DC gain
    pub fn gain(&self) -> i64 {
        self.taps.iter().map(|&t| t as i64).sum()
    }

    pub fn step(&mut self, sample: i64) -> i64 {
        self.history.pop_back();
        self.history.push_front(sample);
        self.taps
            .iter()
            .zip(self.history.iter())
            .fold(0i64, |acc, (&t, &x)| acc.saturating_add(x.saturating_mul(t as i64)))
    }

    pub fn reset(&mut self) {
        self.history.iter_mut().for_each(|x| *x = 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_response_is_taps() {
        let mut fir = MagnitudeFir::new(vec![1, 3, -2]).unwrap();
        let response: Vec<i64> = [1, 0, 0, 0].iter().map(|&x| fir.step(x)).collect();
        assert_eq!(response, vec![1, 3, -2, 0]);
    }

    #[test]
    fn test_step_settles_to_dc_gain() {
        let mut fir = MagnitudeFir::new(vec![1, 2, 1]).unwrap();
        let out: Vec<i64> = (0..4).map(|_| fir.step(100)).collect();
        assert_eq!(out, vec![100, 300, 400, 400]);
        assert_eq!(fir.gain(), 4);

        fir.reset();
        assert_eq!(fir.step(0), 0);
    }

    #[test]
    fn test_empty_taps_rejected() {
        assert_eq!(MagnitudeFir::new(vec![]), Err(ConfigError::EmptyFilter));
    }
}
