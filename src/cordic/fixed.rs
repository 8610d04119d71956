//! Integer CORDIC (hardware parity)
//!
//! Angles are 16-bit binary angle units: 65536 units = 360°, so a `u16`
//! wraps exactly once per turn. The angle accumulator carries 16 extra
//! fraction bits (2^32 per turn) to keep the small arctangent entries
//! meaningful. Shifts are arithmetic (floor), as in the RTL.

use lazy_static::lazy_static;

use super::{scale_factor, validate_iterations, MAX_ITERATIONS};
use crate::error::ConfigError;

/// Binary angle units in one full turn
pub const ANGLE_UNITS_PER_TURN: u32 = 1 << 16;

/// Extra fraction bits carried by the internal angle accumulator
const Z_FRAC_BITS: u32 = 16;

/// Fraction bits of the gain-correction constant
const K_FRAC_BITS: u32 = 16;

const QUARTER_TURN: i64 = 1 << 30;
const HALF_TURN: i64 = 1 << 31;

lazy_static! {
    /// atan(2^-i) in 2^-32 turns
    static ref ATAN_TABLE_TURN32: [i64; MAX_ITERATIONS] = {
        let mut table = [0i64; MAX_ITERATIONS];
        let units = (1u64 << 32) as f64 / (2.0 * std::f64::consts::PI);
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = (2.0f64.powi(-(i as i32)).atan() * units).round() as i64;
        }
        table
    };
}

fn round_shift(value: i64, shift: u32) -> i64 {
    (value + (1 << (shift - 1))) >> shift
}

/// Degrees → binary angle units (wrapping)
pub fn degrees_to_angle(degrees: f64) -> u16 {
    let units = (degrees / 360.0 * ANGLE_UNITS_PER_TURN as f64).round();
    (units as i64).rem_euclid(ANGLE_UNITS_PER_TURN as i64) as u16
}

/// Binary angle units → degrees in [0, 360)
pub fn angle_to_degrees(angle: u16) -> f64 {
    angle as f64 * 360.0 / ANGLE_UNITS_PER_TURN as f64
}

/// Binary angle units → radians in [0, 2π)
pub fn angle_to_radians(angle: u16) -> f64 {
    angle as f64 * 2.0 * std::f64::consts::PI / ANGLE_UNITS_PER_TURN as f64
}

/// Integer CORDIC engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCordic {
    iterations: usize,
    k_q16: i64,
}

impl FixedCordic {
    pub fn new(iterations: usize) -> Result<Self, ConfigError> {
        validate_iterations(iterations)?;
        Ok(Self {
            iterations,
            k_q16: (scale_factor(iterations) * (1u64 << K_FRAC_BITS) as f64).round() as i64,
        })
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Rotate (x, y) by `angle` binary units, gain-corrected
    pub fn rotate(&self, x: i32, y: i32, angle: u16) -> (i32, i32) {
        let mut x = x as i64;
        let mut y = y as i64;
        let mut z = (angle as i16 as i64) << Z_FRAC_BITS;

        if z > QUARTER_TURN {
            x = -x;
            y = -y;
            z -= HALF_TURN;
        } else if z < -QUARTER_TURN {
            x = -x;
            y = -y;
            z += HALF_TURN;
        }

        for (i, &atan) in ATAN_TABLE_TURN32.iter().take(self.iterations).enumerate() {
            let (dx, dy) = (y >> i, x >> i);
            if z >= 0 {
                x -= dx;
                y += dy;
                z -= atan;
            } else {
                x += dx;
                y -= dy;
                z += atan;
            }
        }

        (
            clamp_i32(round_shift(x * self.k_q16, K_FRAC_BITS)),
            clamp_i32(round_shift(y * self.k_q16, K_FRAC_BITS)),
        )
    }

    /// Convert (x, y) to (angle in binary units, magnitude)
    pub fn to_polar(&self, x: i32, y: i32) -> (u16, u32) {
        if x == 0 && y == 0 {
            return (0, 0);
        }

        let mut x = x as i64;
        let mut y = y as i64;
        let mut offset = 0i64;
        if x < 0 {
            x = -x;
            y = -y;
            offset = HALF_TURN;
        }

        let mut z = 0i64;
        for (i, &atan) in ATAN_TABLE_TURN32.iter().take(self.iterations).enumerate() {
            let (dx, dy) = (y >> i, x >> i);
            if y > 0 {
                x += dx;
                y -= dy;
                z += atan;
            } else {
                x -= dx;
                y += dy;
                z -= atan;
            }
        }

        let angle = round_shift(z + offset, Z_FRAC_BITS) as u16;
        let magnitude = round_shift(x * self.k_q16, K_FRAC_BITS).clamp(0, u32::MAX as i64) as u32;
        (angle, magnitude)
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
