//! Floating-point CORDIC reference
//!
//! Angles are in degrees. Rotation handles any input angle by folding it into
//! [-180, 180] and then into CORDIC's convergence domain [-90, 90] (negating
//! the vector for the 180° half-turn). Vectoring folds x < 0 the same way.

use super::{scale_factor, validate_iterations, ATAN_TABLE_DEG};
use crate::error::ConfigError;

/// CORDIC engine with a fixed iteration count and its gain correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cordic {
    iterations: usize,
    scale: f64,
}

impl Cordic {
    /// Create an engine running `iterations` shift-add steps (1..=30)
    pub fn new(iterations: usize) -> Result<Self, ConfigError> {
        validate_iterations(iterations)?;
        Ok(Self {
            iterations,
            scale: scale_factor(iterations),
        })
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Gain correction K_n applied to rotation and vectoring outputs
    pub fn scale_factor(&self) -> f64 {
        self.scale
    }

    /// Rotate (x, y) by `angle_deg`, gain-corrected
    pub fn rotate(&self, x: f64, y: f64, angle_deg: f64) -> (f64, f64) {
        let (xr, yr) = self.rotate_unscaled(x, y, angle_deg);
        (xr * self.scale, yr * self.scale)
    }

    /// Rotate without the final K_n multiply; magnitude grows by 1/K_n
    pub fn rotate_unscaled(&self, x: f64, y: f64, angle_deg: f64) -> (f64, f64) {
        // fmod first so huge angles do not spin the adjust loops
        let mut z = angle_deg % 360.0;
        while z > 180.0 {
            z -= 360.0;
        }
        while z < -180.0 {
            z += 360.0;
        }

        let (mut x, mut y) = (x, y);
        if z > 90.0 {
            x = -x;
            y = -y;
            z -= 180.0;
        } else if z < -90.0 {
            x = -x;
            y = -y;
            z += 180.0;
        }

        for (i, &atan) in ATAN_TABLE_DEG.iter().take(self.iterations).enumerate() {
            let d = if z >= 0.0 { 1.0 } else { -1.0 };
            let shift = 2.0f64.powi(-(i as i32));
            let xn = x - d * y * shift;
            let yn = y + d * x * shift;
            z -= d * atan;
            x = xn;
            y = yn;
        }

        (x, y)
    }

    /// Convert (x, y) to (angle in [0, 360) degrees, magnitude)
    pub fn to_polar(&self, x: f64, y: f64) -> (f64, f64) {
        if x == 0.0 && y == 0.0 {
            return (0.0, 0.0);
        }

        let (mut x, mut y) = (x, y);
        let mut offset = 0.0;
        if x < 0.0 {
            x = -x;
            y = -y;
            offset = 180.0;
        }

        let mut z = 0.0;
        for (i, &atan) in ATAN_TABLE_DEG.iter().take(self.iterations).enumerate() {
            let d = if y > 0.0 { 1.0 } else { -1.0 };
            let shift = 2.0f64.powi(-(i as i32));
            let xn = x + d * y * shift;
            let yn = y - d * x * shift;
            z += d * atan;
            x = xn;
            y = yn;
        }

        let mut angle = (z + offset).rem_euclid(360.0);
        if angle >= 360.0 {
            angle -= 360.0;
        }
        (angle, x * self.scale)
    }
}

/// Rotate (x, y) by `angle_deg` degrees using `iterations` CORDIC steps
pub fn cordic_rotate(
    x: f64,
    y: f64,
    angle_deg: f64,
    iterations: usize,
) -> Result<(f64, f64), ConfigError> {
    Ok(Cordic::new(iterations)?.rotate(x, y, angle_deg))
}

/// Convert (x, y) to (angle, magnitude) using `iterations` CORDIC steps
pub fn cordic_to_polar(x: f64, y: f64, iterations: usize) -> Result<(f64, f64), ConfigError> {
    Ok(Cordic::new(iterations)?.to_polar(x, y))
}
