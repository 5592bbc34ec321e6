//! Synthetic hourly emission profiles for a household's appliance inventory.

use chrono::{Datelike, Utc};
use indexmap::IndexMap;
use rand::Rng;

use super::distribution::{build_distribution, select_shape};
use super::multipliers::{seasonal_multiplier, weekend_multiplier};
use super::noise::{NoiseConfig, add_noise};
use super::types::{
    DEFAULT_EMISSION_FACTOR_KG_PER_KWH, HOURS_PER_DAY, SimulationOutput, SimulationRequest,
    Summary, round2, top_by_total, zero_hourly,
};
use super::window::normalize_windows;
use crate::appliance::Appliance;

/// Absolute floor of the distribution sanity-check tolerance (hours).
const SANITY_ABS_TOLERANCE_HOURS: f64 = 0.01;
/// Relative distribution sanity-check tolerance.
const SANITY_REL_TOLERANCE: f64 = 0.02;

/// Generates a plausible 24-hour emissions profile per appliance.
///
/// The simulator itself holds only configuration; randomness is supplied
/// by the caller on every call, so a seeded generator reproduces a run
/// exactly while two unseeded runs for the same day differ.
///
/// # Examples
///
/// ```
/// use home_emissions::appliance::{Appliance, ApplianceInventory};
/// use home_emissions::sim::simulator::EmissionSimulator;
/// use home_emissions::sim::types::SimulationRequest;
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let sim = EmissionSimulator::default();
/// let mut rng = StdRng::seed_from_u64(42);
/// let request = SimulationRequest {
///     appliances: [(Appliance::Refrigerator, 1)].into_iter().collect(),
///     ..SimulationRequest::default()
/// };
/// let out = sim.simulate(&mut rng, &request);
/// assert_eq!(out.total_hourly.len(), 24);
/// assert_eq!(out.summary.top_appliance.as_deref(), Some("refrigerator"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmissionSimulator {
    noise: NoiseConfig,
}

impl EmissionSimulator {
    pub fn new(noise: NoiseConfig) -> Self {
        Self { noise }
    }

    /// Simulates one home-day.
    ///
    /// Appliances with a zero count are skipped. A missing, zero, negative
    /// or non-finite emission factor falls back to
    /// [`DEFAULT_EMISSION_FACTOR_KG_PER_KWH`]; a missing date uses the
    /// current UTC time.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &SimulationRequest,
    ) -> SimulationOutput {
        let factor = request
            .emission_factor_kg_per_kwh
            .filter(|f| f.is_finite() && *f > 0.0)
            .unwrap_or(DEFAULT_EMISSION_FACTOR_KG_PER_KWH);
        let date = request.date.unwrap_or_else(Utc::now);
        let country = request.country_code.as_deref();

        let calendar = seasonal_multiplier(country, date.month0())
            * weekend_multiplier(date.weekday().num_days_from_sunday());
        let grams_per_kwh = factor * 1000.0 * calendar;

        let mut emissions = IndexMap::new();
        let mut total_hourly = zero_hourly();

        for (appliance, count) in request.appliances.iter() {
            if count == 0 {
                tracing::debug!(appliance = appliance.key(), "skipping zero-count appliance");
                continue;
            }
            let profile = appliance.profile();

            let usage_hours = add_noise(
                rng,
                profile.default_daily_usage_hours,
                self.noise.usage_intensity(appliance),
            );

            let shape = select_shape(appliance, profile.usage_windows);
            let spans = normalize_windows(profile.usage_windows);
            let distribution = build_distribution(&spans, shape);

            check_allocation(appliance, &distribution, usage_hours);

            let kw = profile.power_rating_kw * f64::from(count);
            let mut hourly = Vec::with_capacity(HOURS_PER_DAY);
            for (h, p) in distribution.iter().enumerate() {
                let kwh = p * usage_hours * kw;
                let grams = round2(add_noise(rng, kwh * grams_per_kwh, self.noise.hourly));
                total_hourly[h] += grams;
                hourly.push(grams);
            }
            emissions.insert(appliance.key().to_string(), hourly);
        }

        for v in &mut total_hourly {
            *v = round2(*v);
        }

        let top_appliance = top_by_total(
            emissions
                .iter()
                .map(|(key, series)| (key.as_str(), series.iter().sum::<f64>())),
        )
        .map(str::to_string);

        SimulationOutput {
            summary: Summary {
                total_emissions: round2(total_hourly.iter().sum()),
                top_appliance,
            },
            emissions,
            total_hourly,
        }
    }
}

/// Warns when `distribution` spreads noticeably more or less than
/// `usage_hours` across the day. Returns `false` in that case.
fn check_allocation(appliance: Appliance, distribution: &[f64], usage_hours: f64) -> bool {
    let allocated: f64 = distribution.iter().map(|p| p * usage_hours).sum();
    let tolerance = SANITY_ABS_TOLERANCE_HOURS.max(SANITY_REL_TOLERANCE * usage_hours);
    if (allocated - usage_hours).abs() > tolerance {
        tracing::warn!(
            appliance = appliance.key(),
            allocated,
            usage_hours,
            "usage distribution does not account for the daily usage hours"
        );
        return false;
    }
    true
}
