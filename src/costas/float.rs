//! Floating-point Costas loop

use num::Complex;
use tracing::{debug, trace};

use super::{wrap_phase, CarrierLoop, CostasConfig, CostasOutput, LoopTrace};

/// BPSK Costas loop operating on `Complex<f64>` samples
#[derive(Debug, Clone)]
pub struct CostasLoop {
    config: CostasConfig,
    phase: f64,
    frequency: f64,
    error: f64,
    trace: Option<LoopTrace>,
}

impl CostasLoop {
    pub fn new(config: CostasConfig) -> Self {
        debug!(
            alpha = config.alpha(),
            beta = config.beta(),
            "Costas loop created"
        );
        Self {
            config,
            phase: 0.0,
            frequency: 0.0,
            error: 0.0,
            trace: None,
        }
    }

    /// Record per-step diagnostics for up to `capacity` steps
    pub fn with_trace(mut self, capacity: usize) -> Self {
        self.trace = Some(LoopTrace::with_capacity(capacity));
        self
    }

    /// Derotate one sample and update the loop state.
    ///
    /// The output sample uses the phase estimate from *before* this step's
    /// update; the returned diagnostics are the values *after* it.
    pub fn step(&mut self, sample: Complex<f64>) -> CostasOutput<Complex<f64>> {
        let corrected = sample * Complex::from_polar(1.0, -self.phase);

        self.error = corrected.re * corrected.im;
        self.frequency += self.config.beta() * self.error;
        self.phase = wrap_phase(self.phase + self.frequency + self.config.alpha() * self.error);

        trace!(
            error = self.error,
            frequency = self.frequency,
            phase = self.phase,
            "costas step"
        );

        let output = CostasOutput {
            corrected,
            error: self.error,
            frequency: self.frequency,
            phase: self.phase,
        };
        if let Some(trace) = self.trace.as_mut() {
            trace.record(&output);
        }
        output
    }

    pub fn config(&self) -> CostasConfig {
        self.config
    }

    /// Current phase estimate in [0, 2π)
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Current frequency estimate in radians/sample
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Frequency estimate converted to Hz
    pub fn frequency_hz(&self, sample_rate: f64) -> f64 {
        self.frequency * sample_rate / (2.0 * std::f64::consts::PI)
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn trace(&self) -> Option<&LoopTrace> {
        self.trace.as_ref()
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.frequency = 0.0;
        self.error = 0.0;
        if let Some(trace) = self.trace.as_mut() {
            trace.clear();
        }
    }
}

impl CarrierLoop for CostasLoop {
    type Sample = Complex<f64>;

    fn step(&mut self, sample: Complex<f64>) -> CostasOutput<Complex<f64>> {
        CostasLoop::step(self, sample)
    }

    fn reset(&mut self) {
        CostasLoop::reset(self)
    }
}
