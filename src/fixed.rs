//! Fixed-Point Samples
//!
//! Signed integers with an implicit binary scale (Q-format). The hardware this
//! crate models mixes two overflow behaviors: IQ lanes saturate at 16 bits,
//! while loop error and frequency registers wrap at 32 bits. Each
//! [`FixedFormat`] therefore carries an explicit [`ArithmeticMode`], and every
//! operation fits its result with the mode of the destination format.
//!
//! **Bus word layout** (harness boundary): a 32-bit word carries one complex
//! sample, low 16 bits = I, high 16 bits = Q, both two's complement.

use core::ops::{Add, Neg, Sub};

use num::Complex;
use snafu::ensure;

use crate::error::{ConfigError, InvalidFixedFormatSnafu};

/// Fraction bits of the IQ scale used by the loop hardware
pub const GAIN_BITS: u32 = 10;

/// IQ scale factor (`GAIN` = 2^10)
pub const GAIN: i64 = 1 << GAIN_BITS;

/// Overflow behavior of a fixed-point field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticMode {
    /// Clamp to the representable range
    Saturating,
    /// Two's-complement wraparound at the lane width
    Wrapping,
}

/// Width, scale and overflow mode of a fixed-point field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedFormat {
    bits: u32,
    frac_bits: u32,
    mode: ArithmeticMode,
}

impl FixedFormat {
    /// 16-bit saturating IQ lane at `GAIN` scale
    pub const IQ16: FixedFormat = FixedFormat {
        bits: 16,
        frac_bits: GAIN_BITS,
        mode: ArithmeticMode::Saturating,
    };

    /// 32-bit wrapping loop register at `GAIN²` scale
    pub const LOOP32: FixedFormat = FixedFormat {
        bits: 32,
        frac_bits: 2 * GAIN_BITS,
        mode: ArithmeticMode::Wrapping,
    };

    pub fn new(bits: u32, frac_bits: u32, mode: ArithmeticMode) -> Result<Self, ConfigError> {
        ensure!(
            (2..=63).contains(&bits) && frac_bits < bits,
            InvalidFixedFormatSnafu { bits, frac_bits }
        );
        Ok(Self {
            bits,
            frac_bits,
            mode,
        })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn frac_bits(&self) -> u32 {
        self.frac_bits
    }

    pub fn mode(&self) -> ArithmeticMode {
        self.mode
    }

    pub fn min_raw(&self) -> i64 {
        -(1i64 << (self.bits - 1))
    }

    pub fn max_raw(&self) -> i64 {
        (1i64 << (self.bits - 1)) - 1
    }

    /// Scale factor 2^frac_bits
    pub fn scale(&self) -> f64 {
        (1u64 << self.frac_bits) as f64
    }

    /// Bring an arbitrary-width raw value into range using this format's mode
    pub fn fit(&self, raw: i128) -> i64 {
        match self.mode {
            ArithmeticMode::Saturating => {
                raw.clamp(self.min_raw() as i128, self.max_raw() as i128) as i64
            }
            ArithmeticMode::Wrapping => {
                let modulus = 1i128 << self.bits;
                let v = raw.rem_euclid(modulus);
                if v > self.max_raw() as i128 {
                    (v - modulus) as i64
                } else {
                    v as i64
                }
            }
        }
    }
}

/// One scaled scalar sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedSample {
    raw: i64,
    format: FixedFormat,
}

impl FixedSample {
    /// Wrap or clamp `raw` into `format`
    pub fn new(raw: i64, format: FixedFormat) -> Self {
        Self {
            raw: format.fit(raw as i128),
            format,
        }
    }

    pub fn zero(format: FixedFormat) -> Self {
        Self { raw: 0, format }
    }

    /// Quantize a real value, truncating toward zero like the harness does.
    ///
    /// Saturating formats clip before truncation; wrapping formats truncate
    /// then wrap. NaN quantizes to zero.
    pub fn from_f64(value: f64, format: FixedFormat) -> Self {
        let scaled = value * format.scale();
        let raw = match format.mode {
            ArithmeticMode::Saturating => {
                scaled.clamp(format.min_raw() as f64, format.max_raw() as f64) as i64
            }
            ArithmeticMode::Wrapping => format.fit(scaled as i128),
        };
        Self { raw, format }
    }

    pub fn raw(&self) -> i64 {
        self.raw
    }

    pub fn format(&self) -> FixedFormat {
        self.format
    }

    pub fn to_f64(&self) -> f64 {
        self.raw as f64 / self.format.scale()
    }

    /// Full-precision product placed into `into` without rescaling.
    ///
    /// The raw product carries `self.frac_bits + rhs.frac_bits` fraction bits,
    /// so `into` should use that scale (IQ16 × IQ16 → LOOP32).
    pub fn widening_mul(self, rhs: FixedSample, into: FixedFormat) -> FixedSample {
        FixedSample {
            raw: into.fit(self.raw as i128 * rhs.raw as i128),
            format: into,
        }
    }

    /// Product rescaled back to `self`'s format
    pub fn mul(self, rhs: FixedSample) -> FixedSample {
        let product = (self.raw as i128 * rhs.raw as i128) >> rhs.format.frac_bits;
        FixedSample {
            raw: self.format.fit(product),
            format: self.format,
        }
    }

    /// Re-express in another format (shifting the binary point, then fitting)
    pub fn convert(self, format: FixedFormat) -> FixedSample {
        let raw = self.raw as i128;
        let shifted = if format.frac_bits >= self.format.frac_bits {
            raw << (format.frac_bits - self.format.frac_bits)
        } else {
            raw >> (self.format.frac_bits - format.frac_bits)
        };
        FixedSample {
            raw: format.fit(shifted),
            format,
        }
    }
}

/// Sums take the left operand's format
impl Add for FixedSample {
    type Output = FixedSample;

    fn add(self, rhs: FixedSample) -> FixedSample {
        FixedSample {
            raw: self.format.fit(self.raw as i128 + rhs.raw as i128),
            format: self.format,
        }
    }
}

impl Sub for FixedSample {
    type Output = FixedSample;

    fn sub(self, rhs: FixedSample) -> FixedSample {
        FixedSample {
            raw: self.format.fit(self.raw as i128 - rhs.raw as i128),
            format: self.format,
        }
    }
}

impl Neg for FixedSample {
    type Output = FixedSample;

    fn neg(self) -> FixedSample {
        FixedSample {
            raw: self.format.fit(-(self.raw as i128)),
            format: self.format,
        }
    }
}

/// One IQ sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComplexSample {
    pub i: FixedSample,
    pub q: FixedSample,
}

impl ComplexSample {
    pub fn new(i: FixedSample, q: FixedSample) -> Self {
        Self { i, q }
    }

    pub fn from_raw(i: i64, q: i64, format: FixedFormat) -> Self {
        Self {
            i: FixedSample::new(i, format),
            q: FixedSample::new(q, format),
        }
    }

    pub fn from_complex(value: Complex<f64>, format: FixedFormat) -> Self {
        Self {
            i: FixedSample::from_f64(value.re, format),
            q: FixedSample::from_f64(value.im, format),
        }
    }

    pub fn to_complex(&self) -> Complex<f64> {
        Complex::new(self.i.to_f64(), self.q.to_f64())
    }

    /// Pack into a bus word: low 16 bits = I, high 16 bits = Q.
    ///
    /// Lanes wider than 16 bits are truncated to their low 16 bits.
    pub fn to_bus_word(&self) -> u32 {
        let i = self.i.raw() as u16 as u32;
        let q = self.q.raw() as u16 as u32;
        (q << 16) | i
    }

    /// Unpack a bus word into `format` (normally [`FixedFormat::IQ16`])
    pub fn from_bus_word(word: u32, format: FixedFormat) -> Self {
        let i = (word & 0xFFFF) as u16 as i16 as i64;
        let q = (word >> 16) as u16 as i16 as i64;
        Self::from_raw(i, q, format)
    }
}
