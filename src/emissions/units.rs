//! Unit conventions.
//!
//! Emission factors come in kgCO2/MWh, generation is in TWh and emissions are
//! reported in MtCO2. Intensity is reported back in kgCO2/MWh.

/// 1 TWh = 1e6 MWh.
pub const MWH_PER_TWH: f64 = 1e6;

/// 1 Mt = 1e9 kg.
pub const KG_PER_MT: f64 = 1e9;

/// kgCO2/MWh -> MtCO2/TWh, for multiplying against TWh of generation.
pub fn kg_per_mwh_to_mt_per_twh(kg_per_mwh: f64) -> f64 {
    kg_per_mwh * MWH_PER_TWH / KG_PER_MT
}

/// MtCO2/TWh -> kgCO2/MWh.
pub fn mt_per_twh_to_kg_per_mwh(mt_per_twh: f64) -> f64 {
    mt_per_twh * KG_PER_MT / MWH_PER_TWH
}

/// Intensity of `emission_mt` over `generation_twh`, in kgCO2/MWh.
///
/// Callers must ensure `generation_twh > 0`.
pub fn intensity_kg_per_mwh(emission_mt: f64, generation_twh: f64) -> f64 {
    (emission_mt * KG_PER_MT) / (generation_twh * MWH_PER_TWH)
}
