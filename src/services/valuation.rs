// src/services/valuation.rs
//! IP valuation formulas: relief-from-royalty DCF, comparable multiples,
//! R&D ratio and royalty-rate estimate.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::calculations::{calculate_average, compound, discount_factor, percent, round_to};
use super::reference_data::{ComparableCompany, ReferenceData};

/// Explicit forecast horizon of the relief-from-royalty model.
pub const FORECAST_YEARS: u32 = 5;

/// Share of R&D expenditure that forms the base ratio.
const RD_BASE_SHARE: f64 = 0.1;

/// Half-width of the illustrative royalty-rate range, in percentage points.
pub const ROYALTY_VARIATION_SPAN: f64 = 2.0;

const ROYALTY_RATE_FLOOR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculatorMode {
    Basic,
    Earning,
    Rd,
    Royalty,
}

impl CalculatorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculatorMode::Basic => "basic",
            CalculatorMode::Earning => "earning",
            CalculatorMode::Rd => "rd",
            CalculatorMode::Royalty => "royalty",
        }
    }
}

impl fmt::Display for CalculatorMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CalculatorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(CalculatorMode::Basic),
            "earning" => Ok(CalculatorMode::Earning),
            "rd" => Ok(CalculatorMode::Rd),
            "royalty" => Ok(CalculatorMode::Royalty),
            other => Err(format!("unknown calculator mode '{}'", other)),
        }
    }
}

/// Relief-from-royalty assumptions. Rates are percentages (`12.0` is 12%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationInput {
    pub royalty_rate: f64,
    pub corporate_tax_rate: f64,
    pub discount_rate: f64,
    pub growth_rate_forecast: f64,
    pub growth_rate_residual: f64,
    pub sales_year1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyCashFlow {
    pub year: u32,
    pub sales: f64,
    pub royalty_cash_flow: f64,
    pub corporate_tax: f64,
    pub earnings_after_tax: f64,
    pub discount_factor: f64,
    pub discounted_cash_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcfResult {
    pub yearly_results: Vec<YearlyCashFlow>,
    pub total_pv: f64,
    pub continuing_value: f64,
    pub continuing_value_pv: f64,
    pub fair_market_value: f64,
}

impl DcfResult {
    /// Display copy: currency in whole units, discount factors to 4 decimals.
    pub fn rounded(&self) -> DcfResult {
        DcfResult {
            yearly_results: self
                .yearly_results
                .iter()
                .map(|row| YearlyCashFlow {
                    year: row.year,
                    sales: row.sales.round(),
                    royalty_cash_flow: row.royalty_cash_flow.round(),
                    corporate_tax: row.corporate_tax.round(),
                    earnings_after_tax: row.earnings_after_tax.round(),
                    discount_factor: round_to(row.discount_factor, 4),
                    discounted_cash_flow: row.discounted_cash_flow.round(),
                })
                .collect(),
            total_pv: self.total_pv.round(),
            continuing_value: self.continuing_value.round(),
            continuing_value_pv: self.continuing_value_pv.round(),
            fair_market_value: self.fair_market_value.round(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableQuery {
    pub industry: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiplesResult {
    pub pe: f64,
    pub ev_ebit: f64,
    pub ev_ebitda: f64,
    pub companies: Vec<ComparableCompany>,
    /// Set when the companies are synthetic stand-ins rather than tabulated data.
    pub is_fallback_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdRatioResult {
    pub rd_sales_ratio: f64,
    pub industry: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltyRateResult {
    pub royalty_rate: f64,
    pub base_rate: f64,
    pub variation: f64,
    pub industry: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CalculationResult {
    Basic(DcfResult),
    Earning(MultiplesResult),
    Rd(RdRatioResult),
    Royalty(RoyaltyRateResult),
}

impl CalculationResult {
    pub fn mode(&self) -> CalculatorMode {
        match self {
            CalculationResult::Basic(_) => CalculatorMode::Basic,
            CalculationResult::Earning(_) => CalculatorMode::Earning,
            CalculationResult::Rd(_) => CalculatorMode::Rd,
            CalculationResult::Royalty(_) => CalculatorMode::Royalty,
        }
    }

    /// Copy suitable for display, with DCF figures rounded.
    pub fn for_display(&self) -> CalculationResult {
        match self {
            CalculationResult::Basic(dcf) => CalculationResult::Basic(dcf.rounded()),
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    #[error("invalid assumptions: {0}")]
    InvalidAssumptions(String),
}

/// Uniform samples in `[0, 1)` feeding the illustrative parts of the calculator.
pub trait VariationSource: Send {
    fn sample(&mut self) -> f64;
}

/// Random samples, optionally from a fixed seed.
pub struct RandomVariation {
    rng: StdRng,
}

impl RandomVariation {
    pub fn from_entropy() -> Self {
        RandomVariation {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomVariation {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl VariationSource for RandomVariation {
    fn sample(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Largest sample a `VariationSource` may return.
const MAX_SAMPLE: f64 = 1.0 - f64::EPSILON;

/// Always returns the same sample, kept inside `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedVariation(pub f64);

impl FixedVariation {
    /// Midpoint sample: no royalty-rate variation.
    pub fn centered() -> Self {
        FixedVariation(0.5)
    }
}

impl VariationSource for FixedVariation {
    fn sample(&mut self) -> f64 {
        self.0.clamp(0.0, MAX_SAMPLE)
    }
}

/// Relief-from-royalty fair market value over a five-year forecast plus a
/// perpetuity-growth continuing value.
pub fn relief_from_royalty(input: &ValuationInput) -> Result<DcfResult, ValuationError> {
    let royalty = percent(input.royalty_rate);
    let tax = percent(input.corporate_tax_rate);
    let discount = percent(input.discount_rate);
    let growth = percent(input.growth_rate_forecast);
    let residual = percent(input.growth_rate_residual);

    if discount <= residual {
        return Err(ValuationError::InvalidAssumptions(format!(
            "discount rate ({}%) must exceed the residual growth rate ({}%)",
            input.discount_rate, input.growth_rate_residual
        )));
    }

    let mut yearly_results = Vec::with_capacity(FORECAST_YEARS as usize);
    for year in 1..=FORECAST_YEARS {
        let sales = compound(input.sales_year1, growth, year - 1);
        let royalty_cash_flow = sales * royalty;
        let corporate_tax = royalty_cash_flow * tax;
        let earnings_after_tax = royalty_cash_flow - corporate_tax;
        let factor = discount_factor(discount, year);
        yearly_results.push(YearlyCashFlow {
            year,
            sales,
            royalty_cash_flow,
            corporate_tax,
            earnings_after_tax,
            discount_factor: factor,
            discounted_cash_flow: earnings_after_tax * factor,
        });
    }
    let total_pv: f64 = yearly_results.iter().map(|r| r.discounted_cash_flow).sum();

    let final_sales = compound(input.sales_year1, growth, FORECAST_YEARS);
    let continuing_value = final_sales * royalty * (1.0 - tax) / (discount - residual);
    let continuing_value_pv = continuing_value * discount_factor(discount, FORECAST_YEARS);
    let fair_market_value = total_pv + continuing_value_pv;

    if !fair_market_value.is_finite() {
        warn!("Non-finite fair market value for input {:?}", input);
        return Err(ValuationError::InvalidAssumptions(
            "the assumptions do not produce a finite value".to_string(),
        ));
    }

    debug!("Relief-from-royalty FMV {:.2} for {:?}", fair_market_value, input);
    Ok(DcfResult {
        yearly_results,
        total_pv,
        continuing_value,
        continuing_value_pv,
        fair_market_value,
    })
}

// Ranges the synthetic comparables are drawn from: (low, width).
const FALLBACK_PE: (f64, f64) = (5.0, 20.0);
const FALLBACK_EV_EBIT: (f64, f64) = (3.0, 15.0);
const FALLBACK_EV_EBITDA: (f64, f64) = (2.0, 12.0);

/// Truncated to one decimal so the result stays in `[low, low + width)`.
fn draw(source: &mut dyn VariationSource, (low, width): (f64, f64)) -> f64 {
    let sample = source.sample().clamp(0.0, MAX_SAMPLE);
    low + (sample * width * 10.0).floor() / 10.0
}

/// Three approximate placeholder companies for an untabulated pair. Not sourced data.
fn fallback_comparables(industry: &str, source: &mut dyn VariationSource) -> Vec<ComparableCompany> {
    ["Corp.", "Ltd.", "Inc."]
        .iter()
        .map(|suffix| {
            let pe = draw(source, FALLBACK_PE);
            let ev_ebit = draw(source, FALLBACK_EV_EBIT);
            let ev_ebitda = draw(source, FALLBACK_EV_EBITDA);
            ComparableCompany::new(format!("{} {}", industry, suffix), pe, ev_ebit, ev_ebitda)
        })
        .collect()
}

/// Average P/E, EV/EBIT and EV/EBITDA of the comparables for `query`.
pub fn earning_multiples(
    data: &dyn ReferenceData,
    query: &ComparableQuery,
    source: &mut dyn VariationSource,
) -> MultiplesResult {
    let (companies, is_fallback_data) = match data.comparables(&query.industry, &query.country) {
        Some(companies) if !companies.is_empty() => (companies, false),
        _ => {
            warn!(
                "No comparables for industry '{}' in '{}', using synthetic set",
                query.industry, query.country
            );
            (fallback_comparables(&query.industry, source), true)
        }
    };

    let average = |f: fn(&ComparableCompany) -> f64| {
        let values: Vec<f64> = companies.iter().map(f).collect();
        round_to(calculate_average(&values), 2)
    };

    MultiplesResult {
        pe: average(|c| c.pe),
        ev_ebit: average(|c| c.ev_ebit),
        ev_ebitda: average(|c| c.ev_ebitda),
        is_fallback_data,
        companies,
    }
}

pub fn rd_ratio(data: &dyn ReferenceData, query: &ComparableQuery, rd_expenditure: f64) -> RdRatioResult {
    let ratio = rd_expenditure
        * RD_BASE_SHARE
        * data.industry_rd_factor(&query.industry)
        * data.country_rd_factor(&query.country);
    RdRatioResult {
        rd_sales_ratio: round_to(ratio, 2),
        industry: query.industry.clone(),
        country: query.country.clone(),
    }
}

/// Royalty-rate estimate with an explicit variation in percentage points,
/// clamped to `±ROYALTY_VARIATION_SPAN`.
pub fn royalty_rate(data: &dyn ReferenceData, query: &ComparableQuery, variation: f64) -> RoyaltyRateResult {
    let variation = variation.clamp(-ROYALTY_VARIATION_SPAN, ROYALTY_VARIATION_SPAN);
    let base_rate =
        (data.industry_royalty_rate(&query.industry) + data.country_royalty_rate(&query.country)) / 2.0;
    let rate = (base_rate + variation).max(ROYALTY_RATE_FLOOR);
    RoyaltyRateResult {
        royalty_rate: round_to(rate, 2),
        base_rate,
        variation,
        industry: query.industry.clone(),
        country: query.country.clone(),
    }
}

/// Royalty-rate estimate with the variation drawn from `source`.
/// Only reproducible when `source` is.
pub fn estimate_royalty_rate(
    data: &dyn ReferenceData,
    query: &ComparableQuery,
    source: &mut dyn VariationSource,
) -> RoyaltyRateResult {
    let variation = (source.sample() - 0.5) * 2.0 * ROYALTY_VARIATION_SPAN;
    royalty_rate(data, query, variation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reference_data::StaticReferenceData;

    fn scenario() -> ValuationInput {
        ValuationInput {
            royalty_rate: 5.0,
            corporate_tax_rate: 20.0,
            discount_rate: 12.0,
            growth_rate_forecast: 10.0,
            growth_rate_residual: 3.0,
            sales_year1: 1_000_000.0,
        }
    }

    fn query(industry: &str, country: &str) -> ComparableQuery {
        ComparableQuery {
            industry: industry.to_string(),
            country: country.to_string(),
        }
    }

    #[test]
    fn first_year_of_reference_scenario() {
        let result = relief_from_royalty(&scenario()).unwrap();
        let year1 = &result.yearly_results[0];
        assert_eq!(year1.year, 1);
        assert!((year1.royalty_cash_flow - 50_000.0).abs() < 1e-6);
        assert!((year1.corporate_tax - 10_000.0).abs() < 1e-6);
        assert!((year1.earnings_after_tax - 40_000.0).abs() < 1e-6);
        assert_eq!(round_to(year1.discount_factor, 4), 0.8929);
        assert_eq!(year1.discounted_cash_flow.round(), 35_714.0);
    }

    #[test]
    fn fair_market_value_is_sum_of_parts() {
        let result = relief_from_royalty(&scenario()).unwrap();
        assert_eq!(result.yearly_results.len(), 5);
        let sum: f64 = result.yearly_results.iter().map(|r| r.discounted_cash_flow).sum();
        assert_eq!(result.total_pv, sum);
        assert_eq!(result.fair_market_value, sum + result.continuing_value_pv);

        // Sales grow at the forecast rate and the terminal year uses sales_1 * 1.1^5
        assert!((result.yearly_results[4].sales - 1_464_100.0).abs() < 1e-6);
        let expected_cv = 1_610_510.0 * 0.05 * 0.8 / (0.12 - 0.03);
        assert!((result.continuing_value - expected_cv).abs() < 1e-6);
    }

    #[test]
    fn same_input_same_output() {
        assert_eq!(relief_from_royalty(&scenario()), relief_from_royalty(&scenario()));
    }

    #[test]
    fn discount_not_above_residual_growth_is_rejected() {
        let mut input = scenario();
        input.discount_rate = 3.0;
        assert!(matches!(
            relief_from_royalty(&input),
            Err(ValuationError::InvalidAssumptions(_))
        ));
        input.discount_rate = 2.0;
        assert!(relief_from_royalty(&input).is_err());
    }

    #[test]
    fn all_zero_input_is_rejected() {
        let input = ValuationInput {
            royalty_rate: 0.0,
            corporate_tax_rate: 0.0,
            discount_rate: 0.0,
            growth_rate_forecast: 0.0,
            growth_rate_residual: 0.0,
            sales_year1: 0.0,
        };
        assert!(relief_from_royalty(&input).is_err());
    }

    #[test]
    fn non_finite_value_is_rejected() {
        let mut input = scenario();
        input.discount_rate = -100.0;
        input.growth_rate_residual = -200.0;
        assert!(relief_from_royalty(&input).is_err());
    }

    #[test]
    fn rounded_copy_for_display() {
        let shown = relief_from_royalty(&scenario()).unwrap().rounded();
        assert_eq!(shown.yearly_results[0].discount_factor, 0.8929);
        assert_eq!(shown.yearly_results[0].discounted_cash_flow, 35_714.0);
        assert_eq!(shown.fair_market_value, shown.fair_market_value.round());
    }

    #[test]
    fn multiples_for_tabulated_pair() {
        let result = earning_multiples(
            &StaticReferenceData,
            &query("Technology", "United States"),
            &mut FixedVariation::centered(),
        );
        assert!(!result.is_fallback_data);
        assert_eq!(result.companies.len(), 3);
        // (28.5 + 32.1 + 24.8) / 3 = 28.4666..
        assert_eq!(result.pe, 28.47);
        assert_eq!(result.ev_ebit, 22.37);
        assert_eq!(result.ev_ebitda, 18.73);
    }

    #[test]
    fn unknown_pair_gets_synthetic_comparables() {
        let result = earning_multiples(
            &StaticReferenceData,
            &query("Quantum Widgets", "Atlantis"),
            &mut FixedVariation(0.5),
        );
        assert!(result.is_fallback_data);
        let names: Vec<&str> = result.companies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Quantum Widgets Corp.", "Quantum Widgets Ltd.", "Quantum Widgets Inc."]
        );
        assert_eq!(result.pe, 15.0);
        assert_eq!(result.ev_ebit, 10.5);
        assert_eq!(result.ev_ebitda, 8.0);
    }

    #[test]
    fn synthetic_comparables_stay_in_range() {
        let mut source = RandomVariation::seeded(7);
        for _ in 0..50 {
            let result = earning_multiples(&StaticReferenceData, &query("Fishery", "Chad"), &mut source);
            for c in &result.companies {
                assert!((5.0..25.0).contains(&c.pe));
                assert!((3.0..18.0).contains(&c.ev_ebit));
                assert!((2.0..14.0).contains(&c.ev_ebitda));
            }
        }
    }

    #[test]
    fn top_sample_stays_below_range_end() {
        let result = earning_multiples(
            &StaticReferenceData,
            &query("Quantum Widgets", "Atlantis"),
            &mut FixedVariation(1.0),
        );
        for c in &result.companies {
            assert!((c.pe - 24.9).abs() < 1e-9, "pe {}", c.pe);
            assert!((c.ev_ebit - 17.9).abs() < 1e-9, "ev/ebit {}", c.ev_ebit);
            assert!((c.ev_ebitda - 13.9).abs() < 1e-9, "ev/ebitda {}", c.ev_ebitda);
        }
        let bottom = earning_multiples(
            &StaticReferenceData,
            &query("Quantum Widgets", "Atlantis"),
            &mut FixedVariation(-3.0),
        );
        assert_eq!(bottom.pe, 5.0);
    }

    #[test]
    fn rd_ratio_applies_both_factors() {
        let result = rd_ratio(&StaticReferenceData, &query("Technology", "Germany"), 1000.0);
        // 1000 * 0.1 * 1.5 * 1.2
        assert_eq!(result.rd_sales_ratio, 180.0);
        let unknown = rd_ratio(&StaticReferenceData, &query("Atlantis Mining", "Atlantis"), 50.0);
        assert_eq!(unknown.rd_sales_ratio, 5.0);
    }

    #[test]
    fn royalty_rate_with_pinned_variation() {
        let result = royalty_rate(&StaticReferenceData, &query("Pharmaceuticals", "Switzerland"), 0.0);
        assert_eq!(result.base_rate, 10.5);
        assert_eq!(result.royalty_rate, 10.5);

        let clamped = royalty_rate(&StaticReferenceData, &query("Pharmaceuticals", "Switzerland"), 9.0);
        assert_eq!(clamped.variation, 2.0);
        assert_eq!(clamped.royalty_rate, 12.5);
    }

    #[test]
    fn royalty_rate_never_below_floor() {
        let result = royalty_rate(&StaticReferenceData, &query("Banking", "Nowhere"), -2.0);
        // (2.0 + 6.0) / 2 - 2 = 2.0
        assert_eq!(result.royalty_rate, 2.0);

        struct LowTables;
        impl ReferenceData for LowTables {
            fn comparables(&self, _: &str, _: &str) -> Option<Vec<ComparableCompany>> {
                None
            }
            fn industry_rd_factor(&self, _: &str) -> f64 {
                1.0
            }
            fn country_rd_factor(&self, _: &str) -> f64 {
                1.0
            }
            fn industry_royalty_rate(&self, _: &str) -> f64 {
                0.5
            }
            fn country_royalty_rate(&self, _: &str) -> f64 {
                0.5
            }
            fn industries(&self) -> &[&'static str] {
                &[]
            }
            fn countries(&self) -> &[&'static str] {
                &[]
            }
        }
        let floored = royalty_rate(&LowTables, &query("a", "b"), -2.0);
        assert_eq!(floored.royalty_rate, 1.0);
    }

    #[test]
    fn estimated_royalty_rate_spans_two_points() {
        let q = query("Technology", "United States");
        let low = estimate_royalty_rate(&StaticReferenceData, &q, &mut FixedVariation(0.0));
        let high = estimate_royalty_rate(&StaticReferenceData, &q, &mut FixedVariation(1.0));
        assert_eq!(low.royalty_rate, 6.25);
        assert_eq!(high.royalty_rate, 10.25);

        let a = estimate_royalty_rate(&StaticReferenceData, &q, &mut RandomVariation::seeded(42));
        let b = estimate_royalty_rate(&StaticReferenceData, &q, &mut RandomVariation::seeded(42));
        assert_eq!(a, b);
    }

    #[test]
    fn mode_round_trips_through_strings() {
        for mode in [
            CalculatorMode::Basic,
            CalculatorMode::Earning,
            CalculatorMode::Rd,
            CalculatorMode::Royalty,
        ] {
            assert_eq!(mode.to_string().parse::<CalculatorMode>(), Ok(mode));
        }
    }
}
