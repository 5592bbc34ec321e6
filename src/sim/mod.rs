/// Hour-of-day usage distributions and shape selection.
pub mod distribution;
/// Seasonal and weekend multipliers.
pub mod multipliers;
pub mod noise;
pub mod simulator;
pub mod types;
/// Usage-window normalization.
pub mod window;

pub use simulator::EmissionSimulator;
pub use types::{HOURS_PER_DAY, HourlyArray, SimulationOutput, SimulationRequest, Summary};
