///! CORDIC Engine
///!
///! Shift-add vector rotation and vectoring (rectangular → polar).
///!
///! **Modes**:
///! - Rotation: drive the residual angle z to zero, rotating (x, y) by the input angle
///! - Vectoring: drive y to zero, accumulating the vector's angle in z
///!
///! Each iteration scales the vector by sqrt(1 + 2^(-2i)); after n iterations
///! the accumulated gain is corrected by K_n = Π 1/sqrt(1 + 2^(-2i)), which
///! tends to 0.6072529350088814.
///!
///! **Module Organization**:
///! - `float` - Floating-point reference engine (angles in degrees)
///! - `fixed` - Integer engine matching the hardware (16-bit binary angles)

pub mod fixed;
pub mod float;

pub use fixed::{FixedCordic, ANGLE_UNITS_PER_TURN};
pub use float::{cordic_rotate, cordic_to_polar, Cordic};

use lazy_static::lazy_static;
use snafu::ensure;

use crate::error::{ConfigError, InvalidIterationsSnafu};

/// Number of precomputed arctangent entries
pub const MAX_ITERATIONS: usize = 30;

/// Typical hardware iteration count
pub const HARDWARE_ITERATIONS: usize = 16;

/// Convergence gain correction for infinitely many iterations
pub const K_INFINITE: f64 = 0.6072529350088814;

lazy_static! {
    /// atan(2^-i) in degrees, i = 0..30
    pub(crate) static ref ATAN_TABLE_DEG: [f64; MAX_ITERATIONS] = {
        let mut table = [0.0; MAX_ITERATIONS];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = 2.0f64.powi(-(i as i32)).atan().to_degrees();
        }
        table
    };
}

/// Magnitude growth after `iterations` shift-add steps: Π sqrt(1 + 2^(-2i))
pub fn convergence_gain(iterations: usize) -> f64 {
    (0..iterations)
        .map(|i| (1.0 + 2.0f64.powi(-2 * i as i32)).sqrt())
        .product()
}

/// Correction factor K_n = 1 / convergence_gain(n)
pub fn scale_factor(iterations: usize) -> f64 {
    1.0 / convergence_gain(iterations)
}

pub(crate) fn validate_iterations(iterations: usize) -> Result<(), ConfigError> {
    ensure!(
        (1..=MAX_ITERATIONS).contains(&iterations),
        InvalidIterationsSnafu {
            iterations,
            max: MAX_ITERATIONS
        }
    );
    Ok(())
}
