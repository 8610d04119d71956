//! Seeded complex white Gaussian noise

use num::Complex;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use snafu::ensure;

use crate::error::{ConfigError, InvalidGeneratorSnafu};

/// Independent N(0, σ²) draws on I and Q.
///
/// σ = 0 is allowed and produces exact zeros without touching the RNG.
#[derive(Debug, Clone)]
pub struct ComplexNoise {
    normal: Option<Normal<f64>>,
}

impl ComplexNoise {
    pub fn new(std_dev: f64) -> Result<Self, ConfigError> {
        ensure!(
            std_dev.is_finite() && std_dev >= 0.0,
            InvalidGeneratorSnafu {
                name: "noise_std",
                value: std_dev
            }
        );
        let normal = if std_dev > 0.0 {
            Some(Normal::new(0.0, std_dev).map_err(|_| ConfigError::InvalidGenerator {
                name: "noise_std",
                value: std_dev,
            })?)
        } else {
            None
        };
        Ok(Self { normal })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Complex<f64> {
        match &self.normal {
            Some(normal) => Complex::new(normal.sample(rng), normal.sample(rng)),
            None => Complex::new(0.0, 0.0),
        }
    }
}
