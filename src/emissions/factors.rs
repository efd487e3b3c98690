//! Emission factor lookup.

use std::collections::BTreeMap;

use crate::domain::normalize_fuel_name;
use crate::emissions::units::kg_per_mwh_to_mt_per_twh;
use crate::error::ForecastError;

/// Immutable fuel -> kgCO2/MWh table.
///
/// Fuel keys are normalised like generation headers. Factors must be finite and >= 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmissionFactorTable {
    kg_per_mwh: BTreeMap<String, f64>,
}

impl EmissionFactorTable {
    pub fn new<I, S>(entries: I) -> Result<Self, ForecastError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut kg_per_mwh = BTreeMap::new();
        for (fuel, factor) in entries {
            let fuel = normalize_fuel_name(fuel.as_ref());
            if !(factor.is_finite() && factor >= 0.0) {
                return Err(ForecastError::InvalidInput(format!(
                    "Emission factor for '{fuel}' must be finite and >= 0, got {factor}."
                )));
            }
            if kg_per_mwh.insert(fuel.clone(), factor).is_some() {
                return Err(ForecastError::InvalidInput(format!(
                    "Emission factor for '{fuel}' is listed twice."
                )));
            }
        }
        Ok(Self { kg_per_mwh })
    }

    pub fn len(&self) -> usize {
        self.kg_per_mwh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kg_per_mwh.is_empty()
    }

    pub fn kg_per_mwh(&self, fuel: &str) -> Option<f64> {
        self.kg_per_mwh.get(fuel).copied()
    }

    /// Factor in MtCO2/TWh, or `UnknownFuelFactor`.
    pub fn mt_per_twh(&self, fuel: &str) -> Result<f64, ForecastError> {
        self.kg_per_mwh(fuel)
            .map(kg_per_mwh_to_mt_per_twh)
            .ok_or_else(|| ForecastError::UnknownFuelFactor(fuel.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_normalised_and_converted() {
        let t = EmissionFactorTable::new([(" Coal ", 900.0), ("solar", 0.0)]).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.kg_per_mwh("coal"), Some(900.0));
        assert!((t.mt_per_twh("coal").unwrap() - 0.9).abs() < 1e-15);
        assert_eq!(t.mt_per_twh("solar").unwrap(), 0.0);
    }

    #[test]
    fn negative_and_duplicate_factors_are_rejected() {
        assert!(EmissionFactorTable::new([("gas", -1.0)]).is_err());
        assert!(EmissionFactorTable::new([("gas", f64::NAN)]).is_err());
        assert!(EmissionFactorTable::new([("gas", 1.0), ("GAS", 2.0)]).is_err());
    }

    #[test]
    fn unmapped_fuel_is_reported() {
        let t = EmissionFactorTable::new([("coal", 900.0)]).unwrap();
        assert!(matches!(t.mt_per_twh("oil"), Err(ForecastError::UnknownFuelFactor(f)) if f == "oil"));
    }
}
