//! Synthetic data source for running without hardware.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{DataSource, Reading};

/// Generates plausible readings from uniform ranges.
///
/// RPM is a whole number in `1500..3000`, temperature in `70..95` °C and
/// vibration in `1.0..3.5` m/s².
#[derive(Debug)]
pub struct SimulatedSource {
    rng: StdRng,
    description: String,
}

impl SimulatedSource {
    /// A generator seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            description: "simulation".to_string(),
        }
    }

    /// A reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            description: format!("simulation (seed {})", seed),
        }
    }

    fn generate(&mut self) -> Reading {
        Reading::new(
            self.rng.gen_range(1500..3000) as f64,
            self.rng.gen_range(70.0..95.0),
            self.rng.gen_range(1.0..3.5),
        )
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for SimulatedSource {
    fn poll(&mut self) -> Option<Reading> {
        Some(self.generate())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        None
    }
}
