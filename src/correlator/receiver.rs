//! Squitter receiver: magnitude front end, optional FIR, correlator

use tracing::instrument;

use super::config::CorrelatorConfig;
use super::detector::{Correlator, DecodedMessage};
use super::fir::MagnitudeFir;
use crate::cordic::{FixedCordic, HARDWARE_ITERATIONS};
use crate::error::ConfigError;
use crate::fixed::{ComplexSample, FixedFormat};

#[derive(Debug, Clone)]
pub struct SquitterReceiver {
    cordic: FixedCordic,
    lowpass: Option<MagnitudeFir>,
    correlator: Correlator,
}

impl SquitterReceiver {
    pub fn new(config: CorrelatorConfig, cordic_iterations: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            cordic: FixedCordic::new(cordic_iterations)?,
            lowpass: None,
            correlator: Correlator::new(config),
        })
    }

    /// ADS-B receiver with the hardware CORDIC depth
    pub fn adsb(samples_per_us: usize, threshold: i64) -> Result<Self, ConfigError> {
        Self::new(
            CorrelatorConfig::adsb(samples_per_us, threshold)?,
            HARDWARE_ITERATIONS,
        )
    }

    /// Smooth the magnitude with `taps` before correlating. The threshold
    /// applies to the filtered stream, so scale it by the filter's DC gain.
    pub fn with_lowpass(mut self, taps: Vec<i32>) -> Result<Self, ConfigError> {
        self.lowpass = Some(MagnitudeFir::new(taps)?);
        Ok(self)
    }

    pub fn lowpass(&self) -> Option<&MagnitudeFir> {
        self.lowpass.as_ref()
    }

    /// Envelope of one IQ sample, in raw lane units
    pub fn magnitude(&self, sample: ComplexSample) -> i64 {
        let i = sample.i.raw().clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        let q = sample.q.raw().clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        self.cordic.to_polar(i, q).1 as i64
    }

    pub fn step(&mut self, sample: ComplexSample) -> Option<DecodedMessage> {
        let mut magnitude = self.magnitude(sample);
        if let Some(fir) = self.lowpass.as_mut() {
            magnitude = fir.step(magnitude);
        }
        self.correlator.step(magnitude)
    }

    /// Step with a packed bus word (low 16 = I, high 16 = Q)
    pub fn step_word(&mut self, word: u32) -> Option<DecodedMessage> {
        self.step(ComplexSample::from_bus_word(word, FixedFormat::IQ16))
    }

    /// Decode a complete capture, dropping any trailing partial payload
    #[instrument(skip_all, fields(samples = samples.len()))]
    pub fn decode_stream(&mut self, samples: &[ComplexSample]) -> Vec<DecodedMessage> {
        let messages: Vec<_> = samples.iter().filter_map(|&s| self.step(s)).collect();
        self.finish();
        messages
    }

    /// End of stream; the filter history is cleared along with the register
    pub fn finish(&mut self) -> bool {
        if let Some(fir) = self.lowpass.as_mut() {
            fir.reset();
        }
        self.correlator.finish()
    }

    pub fn reset(&mut self) {
        if let Some(fir) = self.lowpass.as_mut() {
            fir.reset();
        }
        self.correlator.reset();
    }

    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }
}
