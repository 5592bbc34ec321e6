//! Multiplicative noise for synthetic emissions.

use std::collections::HashMap;

use rand::Rng;

use crate::appliance::Appliance;

/// Default intensity applied to each hourly gram value.
pub const DEFAULT_HOURLY_NOISE: f64 = 0.1;

/// Scales `value` by `1 + U(-intensity, intensity)`, never going below zero.
///
/// A non-positive or non-finite intensity leaves the value unchanged
/// (apart from clamping at zero).
pub fn add_noise<R: Rng + ?Sized>(rng: &mut R, value: f64, intensity: f64) -> f64 {
    if !(intensity.is_finite() && intensity > 0.0) {
        return value.max(0.0);
    }
    let factor = 1.0 + rng.random_range(-intensity..=intensity);
    (value * factor).max(0.0)
}

/// Noise intensities used by the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseConfig {
    /// Intensity applied to every hourly gram value.
    pub hourly: f64,
    /// Per-appliance overrides for the daily usage-hours perturbation.
    pub usage_hours: HashMap<Appliance, f64>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            hourly: DEFAULT_HOURLY_NOISE,
            usage_hours: HashMap::new(),
        }
    }
}

impl NoiseConfig {
    /// Noise-free configuration, for deterministic expectations.
    pub fn disabled() -> Self {
        let usage_hours = Appliance::all().map(|a| (a, 0.0)).collect();
        Self {
            hourly: 0.0,
            usage_hours,
        }
    }

    /// Usage-hours intensity for `appliance`, falling back to its profile default.
    pub fn usage_intensity(&self, appliance: Appliance) -> f64 {
        self.usage_hours
            .get(&appliance)
            .copied()
            .unwrap_or(appliance.profile().usage_noise)
    }
}
