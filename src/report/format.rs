//! Formatted terminal output.
//!
//! Formatting stays here so the forecasting and aggregation code only deals
//! in values.

use crate::domain::SourceFailure;
use crate::emissions::HeadlineKpis;
use crate::forecast::ForecastRun;
use crate::validation::ValidationReport;

/// One line per forecast fuel: model, history span and horizon value.
pub fn format_forecast_summary(run: &ForecastRun) -> String {
    let mut out = String::new();
    out.push_str("=== emf - generation forecast ===\n");
    out.push_str(
        format!(
            "{:<12} {:<8} {:>9} {:>9} {:>14}\n",
            "fuel", "model", "observed", "horizon", "final_twh"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<8} {:->9} {:->9} {:->14}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in &run.results {
        let last = r.points().last().map_or(0.0, |p| p.value);
        out.push_str(&format!(
            "{:<12} {:<8} {:>9} {:>9} {:>14.2}\n",
            r.fuel(),
            r.model().display_name(),
            r.last_observed_year(),
            r.last_year(),
            last
        ));
    }
    out
}

/// Headline indicators for the final forecast year.
pub fn format_headline(kpi: &HeadlineKpis) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nKey indicators ({} projection):\n", kpi.year));
    out.push_str(&format!("- Total electricity : {:.0} TWh\n", kpi.total_generation_twh));
    out.push_str(&format!("- Total emissions   : {:.0} MtCO2\n", kpi.total_emission_mtco2));
    out.push_str(&format!(
        "- Emission intensity: {:.0} kgCO2/MWh\n",
        kpi.emission_intensity_kgco2_per_mwh
    ));
    out.push_str(&format!("- Renewable share   : {:.1}%\n", kpi.renewable_share_pct));
    out
}

/// Validation scores; `*` marks the lowest-RMSE model of each source.
pub fn format_validation_table(report: &ValidationReport) -> String {
    let best = report.best_by_source();
    let mut out = String::new();
    out.push_str("=== emf - model validation ===\n");
    out.push_str(format!("  {:<12} {:<8} {:>12} {:>10}\n", "source", "model", "rmse", "mape").trim_end());
    out.push('\n');
    out.push_str(format!("  {:-<12} {:-<8} {:->12} {:->10}\n", "", "", "", "").trim_end());
    out.push('\n');

    for r in &report.records {
        let chosen = if best.contains(&(r.source.as_str(), r.model)) { "*" } else { " " };
        let mape = match r.mape.value() {
            Some(v) => format!("{:.2}%", v * 100.0),
            None => r.mape.to_string(),
        };
        out.push_str(&format!(
            "{chosen} {:<12} {:<8} {:>12.3} {:>10}\n",
            r.source,
            r.model.display_name(),
            r.rmse,
            mape
        ));
    }
    out
}

/// End-of-run failure list. Empty string when nothing failed.
pub fn format_failures(title: &str, failures: &[SourceFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }
    let mut out = format!("\n{title} ({}):\n", failures.len());
    for f in failures {
        match f.model {
            Some(model) => out.push_str(&format!("- {} [{}]: {}\n", f.fuel, model.display_name(), f.reason)),
            None => out.push_str(&format!("- {}: {}\n", f.fuel, f.reason)),
        }
    }
    out
}

pub fn format_unmapped(fuels: &[String]) -> String {
    if fuels.is_empty() {
        return String::new();
    }
    format!(
        "\nNo emission factor for: {} (counted at 0 MtCO2/TWh)\n",
        fuels.join(", ")
    )
}
