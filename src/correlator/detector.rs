//! Preamble correlator state machine
//!
//! ```text
//!            corr ≥ threshold             peak window elapsed
//! Searching ─────────────────▶ Triggered ───────────────────▶ Decoding
//!     ▲                                                          │
//!     └──────────────────── payload_len bits ◀───────────────────┘
//! ```
//!
//! The shift register always advances, in every state, so the correlation
//! is continuous across decodes. Correlation is only evaluated once the
//! register holds a full preamble's worth of samples.

use std::collections::VecDeque;

use bitvec::prelude::*;
use tracing::{debug, trace};

use super::config::{CorrelatorConfig, OverlapPolicy, PayloadEncoding, MAX_PAYLOAD_BITS};

/// Detector phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Searching,
    Triggered,
    Decoding,
}

/// Payload emitted after a full decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Bits packed MSB-first (first received bit is the most significant)
    pub payload: u128,
    pub bit_len: usize,
    /// Sample index where the correlation first crossed the threshold
    pub trigger_index: u64,
    /// Sample index of the correlation maximum within the peak window
    pub peak_index: u64,
    /// Correlation at `peak_index`
    pub correlation: i64,
}

impl DecodedMessage {
    /// Payload as bytes, left-aligned (trailing pad bits are zero).
    ///
    /// `bit_len` is capped at the 128 bits the payload word can hold.
    pub fn to_bytes(&self) -> Vec<u8> {
        let bit_len = self.bit_len.min(MAX_PAYLOAD_BITS);
        let byte_len = bit_len.div_ceil(8);
        let aligned = self.payload << (byte_len * 8 - bit_len);
        aligned.to_be_bytes()[16 - byte_len..].to_vec()
    }

    pub fn to_hex(&self) -> String {
        self.to_bytes().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Counters kept by each correlator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrelatorStats {
    pub samples: u64,
    pub triggers: u64,
    pub messages: u64,
    /// Partial payloads dropped by a restart or end of stream
    pub discarded: u64,
    /// Rising threshold crossings seen while decoding
    pub ignored_triggers: u64,
}

#[derive(Debug, Clone, Copy)]
struct Trigger {
    trigger_index: u64,
    peak_index: u64,
    peak: i64,
}

/// Integrates one symbol period
#[derive(Debug, Clone, Copy, Default)]
struct SymbolAccumulator {
    first: i64,
    second: i64,
    position: usize,
}

#[derive(Debug, Clone)]
pub struct Correlator {
    config: CorrelatorConfig,
    register: VecDeque<i64>,
    state: DetectorState,
    correlation: Option<i64>,
    above_threshold: bool,
    trigger: Option<Trigger>,
    held: usize,
    replay: Vec<i64>,
    symbol: SymbolAccumulator,
    bits: BitVec<u8, Msb0>,
    stats: CorrelatorStats,
}

impl Correlator {
    pub fn new(config: CorrelatorConfig) -> Self {
        debug!(
            preamble_len = config.preamble().len(),
            threshold = config.threshold(),
            payload_len = config.payload_len(),
            samples_per_bit = config.samples_per_bit(),
            peak_window = config.peak_window(),
            "correlator created"
        );
        Self {
            register: VecDeque::with_capacity(config.preamble().len()),
            state: DetectorState::Searching,
            correlation: None,
            above_threshold: false,
            trigger: None,
            held: 0,
            replay: Vec::with_capacity(config.peak_window()),
            symbol: SymbolAccumulator::default(),
            bits: BitVec::with_capacity(config.payload_len()),
            stats: CorrelatorStats::default(),
            config,
        }
    }

    /// Consume one magnitude sample
    pub fn step(&mut self, sample: i64) -> Option<DecodedMessage> {
        let index = self.stats.samples;
        self.stats.samples += 1;

        if self.register.len() == self.config.preamble().len() {
            self.register.pop_front();
        }
        self.register.push_back(sample);

        self.correlation = if self.register.len() == self.config.preamble().len() {
            Some(self.config.preamble().correlate(&self.register))
        } else {
            None
        };

        let crossing = self
            .correlation
            .is_some_and(|c| c >= self.config.threshold());
        let rising = crossing && !self.above_threshold;
        self.above_threshold = crossing;

        match self.state {
            DetectorState::Searching => {
                if crossing {
                    return self.begin_trigger(index);
                }
                None
            }
            DetectorState::Triggered => self.hold_peak(index, sample),
            DetectorState::Decoding => {
                if rising {
                    match self.config.overlap() {
                        OverlapPolicy::IgnoreWhileDecoding => {
                            self.stats.ignored_triggers += 1;
                            trace!(index, "trigger ignored while decoding");
                        }
                        OverlapPolicy::Restart => {
                            self.stats.discarded += 1;
                            debug!(
                                index,
                                bits = self.bits.len(),
                                "restarting on new trigger, partial payload dropped"
                            );
                            return self.begin_trigger(index);
                        }
                    }
                }
                self.accumulate(sample)
            }
        }
    }

    /// Feed a block of samples, collecting every completed message.
    ///
    /// A payload still in progress at the end of the block stays pending.
    pub fn process(&mut self, samples: &[i64]) -> Vec<DecodedMessage> {
        samples.iter().filter_map(|&s| self.step(s)).collect()
    }

    /// `process` followed by `finish`
    pub fn decode_stream(&mut self, samples: &[i64]) -> Vec<DecodedMessage> {
        let messages = self.process(samples);
        self.finish();
        messages
    }

    /// End of stream: drop any partial payload and empty the register.
    ///
    /// Returns true when a partial payload was discarded.
    pub fn finish(&mut self) -> bool {
        let discarded = self.state != DetectorState::Searching;
        if discarded {
            self.stats.discarded += 1;
            debug!(
                state = ?self.state,
                bits = self.bits.len(),
                "end of stream, partial payload discarded"
            );
        }
        self.return_to_search();
        self.register.clear();
        self.correlation = None;
        self.above_threshold = false;
        discarded
    }

    /// Back to the power-on state, statistics included
    pub fn reset(&mut self) {
        self.finish();
        self.stats = CorrelatorStats::default();
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Correlation computed for the latest sample
    pub fn correlation(&self) -> Option<i64> {
        self.correlation
    }

    pub fn stats(&self) -> CorrelatorStats {
        self.stats
    }

    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    fn begin_trigger(&mut self, index: u64) -> Option<DecodedMessage> {
        let correlation = self.correlation.unwrap_or_default();
        self.stats.triggers += 1;
        self.trigger = Some(Trigger {
            trigger_index: index,
            peak_index: index,
            peak: correlation,
        });
        self.held = 0;
        self.replay.clear();
        self.bits.clear();
        self.symbol = SymbolAccumulator::default();

        if self.config.peak_window() == 0 {
            debug!(index, correlation, "preamble detected, decoding");
            self.state = DetectorState::Decoding;
        } else {
            trace!(index, correlation, "preamble threshold crossed, holding for peak");
            self.state = DetectorState::Triggered;
        }
        None
    }

    fn hold_peak(&mut self, index: u64, sample: i64) -> Option<DecodedMessage> {
        self.held += 1;
        let correlation = self.correlation.unwrap_or_default();
        if let Some(trigger) = self.trigger.as_mut() {
            if correlation > trigger.peak {
                trigger.peak = correlation;
                trigger.peak_index = index;
                self.replay.clear();
            } else {
                self.replay.push(sample);
            }
        }
        if self.held < self.config.peak_window() {
            return None;
        }

        if let Some(trigger) = self.trigger {
            debug!(
                peak_index = trigger.peak_index,
                correlation = trigger.peak,
                "preamble peak located, decoding"
            );
        }
        self.state = DetectorState::Decoding;

        // Samples after the peak already belong to the payload. The window is
        // shorter than a payload, so the replay alone never completes one.
        let mut replay = std::mem::take(&mut self.replay);
        let mut message = None;
        for &s in replay.iter() {
            message = self.accumulate(s);
            if message.is_some() {
                break;
            }
        }
        replay.clear();
        self.replay = replay;
        message
    }

    fn accumulate(&mut self, sample: i64) -> Option<DecodedMessage> {
        let samples_per_bit = self.config.samples_per_bit();
        let symbol = &mut self.symbol;
        match self.config.encoding() {
            PayloadEncoding::PulsePosition if symbol.position >= samples_per_bit / 2 => {
                symbol.second = symbol.second.saturating_add(sample);
            }
            _ => symbol.first = symbol.first.saturating_add(sample),
        }
        symbol.position += 1;
        if symbol.position < samples_per_bit {
            return None;
        }

        let bit = match self.config.encoding() {
            PayloadEncoding::PulsePosition => symbol.first > symbol.second,
            PayloadEncoding::Level => symbol.first > 0,
        };
        self.symbol = SymbolAccumulator::default();
        self.bits.push(bit);

        if self.bits.len() < self.config.payload_len() {
            return None;
        }
        Some(self.complete())
    }

    fn complete(&mut self) -> DecodedMessage {
        let payload = self
            .bits
            .iter()
            .fold(0u128, |acc, bit| (acc << 1) | (*bit as u128));
        let trigger = self.trigger.unwrap_or(Trigger {
            trigger_index: 0,
            peak_index: 0,
            peak: 0,
        });
        let message = DecodedMessage {
            payload,
            bit_len: self.bits.len(),
            trigger_index: trigger.trigger_index,
            peak_index: trigger.peak_index,
            correlation: trigger.peak,
        };
        self.stats.messages += 1;
        debug!(
            payload = format!("{:x}", payload),
            peak_index = message.peak_index,
            "message decoded"
        );
        self.return_to_search();
        message
    }

    fn return_to_search(&mut self) {
        self.state = DetectorState::Searching;
        self.trigger = None;
        self.held = 0;
        self.replay.clear();
        self.bits.clear();
        self.symbol = SymbolAccumulator::default();
    }
}
