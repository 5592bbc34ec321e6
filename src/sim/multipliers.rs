//! Calendar multipliers applied to simulated emissions.

/// Climatic hemisphere of a country, used to decide which months are winter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    Equatorial,
}

/// Heating-season uplift.
pub const WINTER_MULTIPLIER: f64 = 1.20;
/// Cooling-season uplift.
pub const SUMMER_MULTIPLIER: f64 = 1.15;
/// Saturday/Sunday uplift.
pub const WEEKEND_MULTIPLIER: f64 = 1.10;

const SOUTHERN: &[&str] = &[
    "AR", "AU", "BO", "BW", "CL", "FJ", "LS", "MG", "MU", "MZ", "NA", "NZ", "PE", "PY", "SZ",
    "UY", "ZA", "ZM", "ZW",
];

const EQUATORIAL: &[&str] = &[
    "BR", "CD", "CG", "CO", "EC", "GA", "GH", "ID", "KE", "LK", "MY", "NG", "PG", "SG", "TZ",
    "UG", "VE",
];

/// Looks up a country's hemisphere; unknown or missing codes default to north.
pub fn hemisphere(country_code: Option<&str>) -> Hemisphere {
    let Some(code) = country_code.map(|c| c.trim().to_ascii_uppercase()) else {
        return Hemisphere::North;
    };
    if SOUTHERN.contains(&code.as_str()) {
        Hemisphere::South
    } else if EQUATORIAL.contains(&code.as_str()) {
        Hemisphere::Equatorial
    } else {
        Hemisphere::North
    }
}

/// Seasonal uplift for a country and zero-based month (0 = January).
///
/// Out-of-range months fall through to the neutral 1.0.
pub fn seasonal_multiplier(country_code: Option<&str>, month0: u32) -> f64 {
    let december_to_february = matches!(month0, 11 | 0 | 1);
    let june_to_august = matches!(month0, 5..=7);
    match hemisphere(country_code) {
        Hemisphere::North if december_to_february => WINTER_MULTIPLIER,
        Hemisphere::North if june_to_august => SUMMER_MULTIPLIER,
        Hemisphere::South if june_to_august => WINTER_MULTIPLIER,
        Hemisphere::South if december_to_february => SUMMER_MULTIPLIER,
        _ => 1.0,
    }
}

/// Weekend uplift for a zero-based weekday (0 = Sunday, 6 = Saturday).
pub fn weekend_multiplier(day_of_week0: u32) -> f64 {
    if matches!(day_of_week0, 0 | 6) {
        WEEKEND_MULTIPLIER
    } else {
        1.0
    }
}
