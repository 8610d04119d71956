//! Fixed-point Costas loop
//!
//! Register model:
//! - IQ lanes: 16-bit saturating at `GAIN` scale ([`FixedFormat::IQ16`])
//! - error, frequency, phase increment: 32-bit wrapping at `GAIN²` scale
//!   ([`FixedFormat::LOOP32`])
//! - phase: 16-bit binary angle, 65536 units per turn, wraps naturally
//!
//! Loop gains are held as Q16 multipliers. Derotation runs through the
//! integer CORDIC engine.

use tracing::{debug, trace};

use super::{CarrierLoop, CostasConfig, CostasOutput, LoopTrace};
use crate::cordic::fixed::angle_to_radians;
use crate::cordic::FixedCordic;
use crate::error::ConfigError;
use crate::fixed::{ComplexSample, FixedFormat, FixedSample, GAIN};

const GAIN_Q_BITS: u32 = 16;

/// Radians at `GAIN²` scale → binary angle units, as a Q32 multiplier
fn radians_to_angle_q32() -> i64 {
    let units_per_radian = 65536.0 / (2.0 * std::f64::consts::PI);
    ((1u64 << 32) as f64 * units_per_radian / (GAIN * GAIN) as f64).round() as i64
}

#[derive(Debug, Clone)]
pub struct FixedCostasLoop {
    config: CostasConfig,
    cordic: FixedCordic,
    alpha_q16: i64,
    beta_q16: i64,
    rad_to_angle_q32: i64,
    phase: u16,
    frequency: FixedSample,
    error: FixedSample,
    trace: Option<LoopTrace>,
}

impl FixedCostasLoop {
    /// Build a loop whose derotator runs `cordic_iterations` steps
    pub fn new(config: CostasConfig, cordic_iterations: usize) -> Result<Self, ConfigError> {
        let cordic = FixedCordic::new(cordic_iterations)?;
        let alpha_q16 = (config.alpha() * (1u64 << GAIN_Q_BITS) as f64).round() as i64;
        let beta_q16 = (config.beta() * (1u64 << GAIN_Q_BITS) as f64).round() as i64;
        debug!(
            alpha_q16,
            beta_q16, cordic_iterations, "fixed-point Costas loop created"
        );
        Ok(Self {
            config,
            cordic,
            alpha_q16,
            beta_q16,
            rad_to_angle_q32: radians_to_angle_q32(),
            phase: 0,
            frequency: FixedSample::zero(FixedFormat::LOOP32),
            error: FixedSample::zero(FixedFormat::LOOP32),
            trace: None,
        })
    }

    pub fn with_trace(mut self, capacity: usize) -> Self {
        self.trace = Some(LoopTrace::with_capacity(capacity));
        self
    }

    /// One loop step. Inputs in other formats are converted to IQ16 first.
    pub fn step(&mut self, sample: ComplexSample) -> CostasOutput<ComplexSample> {
        let i = sample.i.convert(FixedFormat::IQ16);
        let q = sample.q.convert(FixedFormat::IQ16);

        let (ci, cq) = self
            .cordic
            .rotate(i.raw() as i32, q.raw() as i32, self.phase.wrapping_neg());
        let corrected = ComplexSample::from_raw(ci as i64, cq as i64, FixedFormat::IQ16);

        self.error = corrected.i.widening_mul(corrected.q, FixedFormat::LOOP32);
        let beta_term = FixedSample::new(
            (self.beta_q16 * self.error.raw()) >> GAIN_Q_BITS,
            FixedFormat::LOOP32,
        );
        self.frequency = self.frequency + beta_term;
        let alpha_term = FixedSample::new(
            (self.alpha_q16 * self.error.raw()) >> GAIN_Q_BITS,
            FixedFormat::LOOP32,
        );
        let increment = self.frequency + alpha_term;

        // Truncation to u16 is the modulo-one-turn wrap
        let delta = (increment.raw() * self.rad_to_angle_q32) >> 32;
        self.phase = self.phase.wrapping_add(delta as u16);

        trace!(
            error = self.error.raw(),
            frequency = self.frequency.raw(),
            phase = self.phase,
            "fixed costas step"
        );

        let output = CostasOutput {
            corrected,
            error: self.error.to_f64(),
            frequency: self.frequency.to_f64(),
            phase: angle_to_radians(self.phase),
        };
        if let Some(trace) = self.trace.as_mut() {
            trace.record(&output);
        }
        output
    }

    /// Bus-level step: packed IQ word in, packed corrected word out
    pub fn step_word(&mut self, word: u32) -> u32 {
        let sample = ComplexSample::from_bus_word(word, FixedFormat::IQ16);
        self.step(sample).corrected.to_bus_word()
    }

    pub fn config(&self) -> CostasConfig {
        self.config
    }

    /// Phase register in binary angle units
    pub fn raw_phase(&self) -> u16 {
        self.phase
    }

    /// Frequency register at `GAIN²` scale
    pub fn raw_frequency(&self) -> i64 {
        self.frequency.raw()
    }

    /// Error register at `GAIN²` scale
    pub fn raw_error(&self) -> i64 {
        self.error.raw()
    }

    pub fn phase(&self) -> f64 {
        angle_to_radians(self.phase)
    }

    pub fn frequency(&self) -> f64 {
        self.frequency.to_f64()
    }

    pub fn error(&self) -> f64 {
        self.error.to_f64()
    }

    pub fn trace(&self) -> Option<&LoopTrace> {
        self.trace.as_ref()
    }

    pub fn reset(&mut self) {
        self.phase = 0;
        self.frequency = FixedSample::zero(FixedFormat::LOOP32);
        self.error = FixedSample::zero(FixedFormat::LOOP32);
        if let Some(trace) = self.trace.as_mut() {
            trace.clear();
        }
    }
}

impl CarrierLoop for FixedCostasLoop {
    type Sample = ComplexSample;

    fn step(&mut self, sample: ComplexSample) -> CostasOutput<ComplexSample> {
        FixedCostasLoop::step(self, sample)
    }

    fn reset(&mut self) {
        FixedCostasLoop::reset(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cordic::HARDWARE_ITERATIONS;
    use crate::signal::{BpskConfig, BpskGenerator};
    use std::f64::consts::{PI, TAU};

    fn reference_loop() -> FixedCostasLoop {
        FixedCostasLoop::new(CostasConfig::new(0.5, 0.02).unwrap(), HARDWARE_ITERATIONS).unwrap()
    }

    #[test]
    fn test_locks_onto_offset() {
        let config = BpskConfig {
            num_samples: 3000,
            start_index: 300,
            ..BpskConfig::default()
        };
        let expected = 2.0 * PI * config.freq_offset / config.sample_rate;
        let mut costas = reference_loop();
        let outputs: Vec<_> = BpskGenerator::new(config)
            .unwrap()
            .quantized(FixedFormat::IQ16)
            .map(|s| costas.step(s))
            .collect();

        for out in &outputs[1500..] {
            assert!((out.frequency - expected).abs() < 2e-3, "{}", out.frequency);
            assert!(out.error.abs() < 0.01);
            assert!(out.corrected.i.to_f64().abs() > 0.99);
            assert!(out.corrected.q.to_f64().abs() < 0.01);
        }
    }

    #[test]
    fn test_full_scale_input_does_not_overflow_lanes() {
        let mut costas = reference_loop();
        for n in 0..500u32 {
            let sign = if n % 3 == 0 { -1 } else { 1 };
            let sample = ComplexSample::from_raw(
                sign * 32768,
                -sign * 32767,
                FixedFormat::IQ16,
            );
            let out = costas.step(sample);
            assert!((0.0..TAU).contains(&out.phase));
            assert!(out.corrected.i.raw() <= 32767 && out.corrected.i.raw() >= -32768);
            assert!(costas.raw_frequency() <= i32::MAX as i64);
            assert!(costas.raw_frequency() >= i32::MIN as i64);
        }
    }

    #[test]
    fn test_step_word_round_trip_when_idle() {
        let mut costas = reference_loop();
        // Zero phase on the first step, Q = 0 keeps the loop at rest
        let word = ComplexSample::from_raw(1000, 0, FixedFormat::IQ16).to_bus_word();
        let out = costas.step_word(word);
        let back = ComplexSample::from_bus_word(out, FixedFormat::IQ16);
        assert!((back.i.raw() - 1000).abs() <= 2);
        assert!(back.q.raw().abs() <= 2);
        assert_eq!(costas.raw_error(), back.i.raw() * back.q.raw());
    }

    #[test]
    fn test_reset_clears_registers() {
        let mut costas = reference_loop().with_trace(4);
        for _ in 0..10 {
            costas.step(ComplexSample::from_raw(700, 300, FixedFormat::IQ16));
        }
        assert_ne!(costas.raw_phase(), 0);
        costas.reset();
        assert_eq!(costas.raw_phase(), 0);
        assert_eq!(costas.raw_frequency(), 0);
        assert_eq!(costas.raw_error(), 0);
        assert!(costas.trace().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_cordic_iterations() {
        let config = CostasConfig::new(0.5, 0.02).unwrap();
        assert!(FixedCostasLoop::new(config, 0).is_err());
    }
}
