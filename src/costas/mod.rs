///! Costas Carrier-Recovery Loop (second order, BPSK)
///!
///! Each step derotates one complex sample by the current phase estimate,
///! forms the BPSK discriminator `error = Re(out) · Im(out)`, and runs a
///! proportional-integral update:
///!
///! ```text
///! frequency += beta · error
///! phase     += frequency + alpha · error     (wrapped into [0, 2π))
///! ```
///!
///! **Gain selection**: alpha sets the proportional (phase) response, beta the
///! integral (frequency) response. Larger gains lock faster but ring or go
///! unstable; keeping beta ≪ alpha² gives an over- to critically-damped loop.
///! Whether a given pair stays stable across every frequency offset is not
///! derived here; tune against the offsets you expect.
///!
///! **Module Organization**:
///! - `float` - Floating-point loop, direct trig derotation
///! - `fixed` - Fixed-point loop matching the hardware registers

pub mod fixed;
pub mod float;

pub use fixed::FixedCostasLoop;
pub use float::CostasLoop;

use std::f64::consts::TAU;

use snafu::ensure;

use crate::error::{ConfigError, InvalidLoopGainSnafu};

/// Loop gains, validated once at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostasConfig {
    alpha: f64,
    beta: f64,
}

impl CostasConfig {
    /// Upper bound for the proportional gain
    pub const ALPHA_MAX: f64 = 2.0;
    /// Upper bound for the integral gain
    pub const BETA_MAX: f64 = 1.0;

    /// Create a configuration from explicit gains.
    ///
    /// alpha must lie in (0, 2] and beta in (0, 1]. The reference tuning for a
    /// 19 kHz stream with a few hundred Hz of offset is alpha = 0.5,
    /// beta = 0.02.
    pub fn new(alpha: f64, beta: f64) -> Result<Self, ConfigError> {
        ensure!(
            alpha.is_finite() && alpha > 0.0 && alpha <= Self::ALPHA_MAX,
            InvalidLoopGainSnafu {
                name: "alpha",
                value: alpha,
                max: Self::ALPHA_MAX
            }
        );
        ensure!(
            beta.is_finite() && beta > 0.0 && beta <= Self::BETA_MAX,
            InvalidLoopGainSnafu {
                name: "beta",
                value: beta,
                max: Self::BETA_MAX
            }
        );
        Ok(Self { alpha, beta })
    }

    /// Derive gains from a normalized loop bandwidth and damping factor.
    ///
    /// ω_n = bw / (ζ + 1/(4ζ)), alpha = 2ζω_n, beta = ω_n².
    /// ζ = 0.707 is the usual critically-damped choice.
    pub fn from_loop_bandwidth(loop_bw: f64, damping: f64) -> Result<Self, ConfigError> {
        ensure!(
            damping.is_finite() && damping > 0.0,
            InvalidLoopGainSnafu {
                name: "damping",
                value: damping,
                max: f64::INFINITY
            }
        );
        let omega_n = loop_bw / (damping + 1.0 / (4.0 * damping));
        Self::new(2.0 * damping * omega_n, omega_n * omega_n)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}

/// Result of one loop step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostasOutput<S> {
    /// Input sample derotated by the phase estimate in force for this step
    pub corrected: S,
    /// Discriminator output
    pub error: f64,
    /// Frequency estimate after the update (radians/sample)
    pub frequency: f64,
    /// Phase estimate after the update, in [0, 2π)
    pub phase: f64,
}

/// Per-step diagnostic history, bounded by a fixed capacity.
///
/// Recording stops silently once full.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopTrace {
    capacity: usize,
    error: Vec<f64>,
    frequency: Vec<f64>,
    phase: Vec<f64>,
}

impl LoopTrace {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            error: Vec::with_capacity(capacity),
            frequency: Vec::with_capacity(capacity),
            phase: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn record<S>(&mut self, output: &CostasOutput<S>) {
        if self.is_full() {
            return;
        }
        self.error.push(output.error);
        self.frequency.push(output.frequency);
        self.phase.push(output.phase);
    }

    pub fn len(&self) -> usize {
        self.error.len()
    }

    pub fn is_empty(&self) -> bool {
        self.error.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.error.len() >= self.capacity
    }

    pub fn error(&self) -> &[f64] {
        &self.error
    }

    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    pub fn phase(&self) -> &[f64] {
        &self.phase
    }

    pub fn clear(&mut self) {
        self.error.clear();
        self.frequency.clear();
        self.phase.clear();
    }
}

/// A carrier-recovery loop consuming one sample per step
pub trait CarrierLoop {
    type Sample: Copy;

    fn step(&mut self, sample: Self::Sample) -> CostasOutput<Self::Sample>;

    /// Clear phase, frequency, error and trace
    fn reset(&mut self);

    fn process(&mut self, samples: &[Self::Sample]) -> Vec<CostasOutput<Self::Sample>> {
        samples.iter().map(|&s| self.step(s)).collect()
    }
}

/// Fold a phase into [0, 2π) by repeated ±2π adjustment.
///
/// Values more than a turn out of range are reduced with a modulo first.
pub fn wrap_phase(phase: f64) -> f64 {
    let mut phase = phase;
    if !(-TAU..2.0 * TAU).contains(&phase) {
        phase = phase.rem_euclid(TAU);
    }
    while phase >= TAU {
        phase -= TAU;
    }
    while phase < 0.0 {
        phase += TAU;
    }
    // -ε + 2π can round up to exactly 2π
    if phase >= TAU {
        phase = 0.0;
    }
    phase
}
