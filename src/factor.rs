//! Grid emission factor resolution.

use std::collections::HashMap;

use crate::error::EmissionsError;

/// Supplies the grid carbon intensity (kg CO2 per kWh) for a home.
pub trait EmissionFactorSource: Send + Sync {
    /// Resolves a factor for a home.
    ///
    /// `Ok(None)` means "nothing supplied", letting the simulator use its
    /// built-in fallback.
    ///
    /// # Errors
    ///
    /// [`EmissionsError::Configuration`] when the source is required but
    /// cannot produce a factor.
    fn factor_for(
        &self,
        home_factor: Option<f64>,
        country_code: Option<&str>,
    ) -> Result<Option<f64>, EmissionsError>;
}

/// Country-keyed factor table with an optional default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorTable {
    countries: HashMap<String, f64>,
    default: Option<f64>,
    required: bool,
}

impl FactorTable {
    /// Builds a table; country codes are matched case-insensitively.
    pub fn new<I, K>(countries: I, default: Option<f64>) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        Self {
            countries: countries
                .into_iter()
                .map(|(k, v)| (k.as_ref().trim().to_ascii_uppercase(), v))
                .collect(),
            default,
            required: false,
        }
    }

    /// Makes an unresolvable lookup an error instead of deferring to the simulator fallback.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl EmissionFactorSource for FactorTable {
    fn factor_for(
        &self,
        home_factor: Option<f64>,
        country_code: Option<&str>,
    ) -> Result<Option<f64>, EmissionsError> {
        if let Some(f) = home_factor {
            return Ok(Some(f));
        }
        let by_country = country_code
            .map(|c| c.trim().to_ascii_uppercase())
            .and_then(|c| self.countries.get(&c).copied());
        match by_country.or(self.default) {
            Some(f) => Ok(Some(f)),
            None if self.required => Err(EmissionsError::Configuration(format!(
                "no emission factor for country {}",
                country_code.unwrap_or("<none>")
            ))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FactorTable {
        FactorTable::new([("us", 0.39), ("FR", 0.06)], None)
    }

    #[test]
    fn home_factor_wins() {
        assert_eq!(table().factor_for(Some(0.9), Some("US")), Ok(Some(0.9)));
    }

    #[test]
    fn country_lookup_is_case_insensitive() {
        assert_eq!(table().factor_for(None, Some("Us")), Ok(Some(0.39)));
        assert_eq!(table().factor_for(None, Some("fr")), Ok(Some(0.06)));
    }

    #[test]
    fn default_applies_to_unknown_country() {
        let t = FactorTable::new([("US", 0.39)], Some(0.5));
        assert_eq!(t.factor_for(None, Some("DE")), Ok(Some(0.5)));
        assert_eq!(t.factor_for(None, None), Ok(Some(0.5)));
    }

    #[test]
    fn optional_table_defers_to_simulator() {
        assert_eq!(table().factor_for(None, Some("DE")), Ok(None));
    }

    #[test]
    fn required_table_reports_configuration_error() {
        let err = table().required().factor_for(None, Some("DE"));
        assert!(matches!(err, Err(EmissionsError::Configuration(_))));
    }
}
