use proptest::prelude::*;

use yd_advisory::services::calculations::{calculate_average, round_to};
use yd_advisory::services::reference_data::{ComparableCompany, ReferenceData, StaticReferenceData};
use yd_advisory::services::valuation::{
    earning_multiples, relief_from_royalty, royalty_rate, ComparableQuery, FixedVariation, ValuationError,
    ValuationInput, FORECAST_YEARS, ROYALTY_VARIATION_SPAN,
};

/// Answers every pair with the same company list.
struct Tabulated(Vec<ComparableCompany>);

impl ReferenceData for Tabulated {
    fn comparables(&self, _industry: &str, _country: &str) -> Option<Vec<ComparableCompany>> {
        Some(self.0.clone())
    }
    fn industry_rd_factor(&self, _industry: &str) -> f64 {
        1.0
    }
    fn country_rd_factor(&self, _country: &str) -> f64 {
        1.0
    }
    fn industry_royalty_rate(&self, _industry: &str) -> f64 {
        5.0
    }
    fn country_royalty_rate(&self, _country: &str) -> f64 {
        6.0
    }
    fn industries(&self) -> &[&'static str] {
        &[]
    }
    fn countries(&self) -> &[&'static str] {
        &[]
    }
}

fn software_in_canada() -> ComparableQuery {
    ComparableQuery {
        industry: "Software".to_string(),
        country: "Canada".to_string(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    round_to(calculate_average(&values.collect::<Vec<_>>()), 2)
}

#[test]
fn empty_comparable_list_uses_synthetic_set() {
    let result = earning_multiples(&Tabulated(Vec::new()), &software_in_canada(), &mut FixedVariation::centered());
    assert!(result.is_fallback_data);
    assert_eq!(result.companies.len(), 3);
    assert!(result.companies.iter().all(|c| c.name.starts_with("Software ")));
    assert_eq!(result.pe, 15.0);
}

fn input(discount: f64, residual: f64, sales: f64, royalty: f64, tax: f64, growth: f64) -> ValuationInput {
    ValuationInput {
        royalty_rate: royalty,
        corporate_tax_rate: tax,
        discount_rate: discount,
        growth_rate_forecast: growth,
        growth_rate_residual: residual,
        sales_year1: sales,
    }
}

proptest! {
    #[test]
    fn fair_market_value_sums_its_parts(
        residual in 0.0f64..10.0,
        spread in 0.5f64..20.0,
        sales in 1.0f64..1e9,
        royalty in 0.0f64..30.0,
        tax in 0.0f64..50.0,
        growth in -20.0f64..50.0,
    ) {
        let result = relief_from_royalty(&input(residual + spread, residual, sales, royalty, tax, growth)).unwrap();
        prop_assert_eq!(result.yearly_results.len(), FORECAST_YEARS as usize);
        let sum: f64 = result.yearly_results.iter().map(|r| r.discounted_cash_flow).sum();
        prop_assert!((result.total_pv - sum).abs() <= 1e-6 * sum.abs().max(1.0));
        let fmv = result.total_pv + result.continuing_value_pv;
        prop_assert!((result.fair_market_value - fmv).abs() <= 1e-6 * fmv.abs().max(1.0));
        for (i, row) in result.yearly_results.iter().enumerate() {
            prop_assert_eq!(row.year, i as u32 + 1);
            prop_assert!(row.discount_factor > 0.0 && row.discount_factor <= 1.0);
        }
    }

    #[test]
    fn discount_at_or_below_residual_is_rejected(
        residual in -5.0f64..20.0,
        gap in 0.0f64..10.0,
        sales in 0.0f64..1e9,
    ) {
        let result = relief_from_royalty(&input(residual - gap, residual, sales, 5.0, 20.0, 10.0));
        prop_assert!(matches!(result, Err(ValuationError::InvalidAssumptions(_))));
    }

    #[test]
    fn average_lies_between_min_and_max(values in prop::collection::vec(-1e6f64..1e6, 1..20)) {
        let avg = calculate_average(&values);
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(avg >= min - 1e-6 && avg <= max + 1e-6);
    }

    #[test]
    fn multiples_are_rounded_means_of_the_comparables(
        rows in prop::collection::vec((0.1f64..100.0, 0.1f64..80.0, 0.1f64..60.0), 1..=20),
    ) {
        let companies: Vec<ComparableCompany> = rows
            .iter()
            .enumerate()
            .map(|(i, &(pe, ev_ebit, ev_ebitda))| ComparableCompany::new(format!("Company {}", i), pe, ev_ebit, ev_ebitda))
            .collect();
        let result = earning_multiples(&Tabulated(companies.clone()), &software_in_canada(), &mut FixedVariation::centered());

        prop_assert!(!result.is_fallback_data);
        prop_assert_eq!(&result.companies, &companies);
        prop_assert_eq!(result.pe, mean(rows.iter().map(|r| r.0)));
        prop_assert_eq!(result.ev_ebit, mean(rows.iter().map(|r| r.1)));
        prop_assert_eq!(result.ev_ebitda, mean(rows.iter().map(|r| r.2)));
    }

    #[test]
    fn royalty_variation_is_bounded(variation in -100.0f64..100.0) {
        let query = ComparableQuery {
            industry: "Pharmaceuticals".to_string(),
            country: "Japan".to_string(),
        };
        let result = royalty_rate(&StaticReferenceData, &query, variation);
        prop_assert!(result.variation.abs() <= ROYALTY_VARIATION_SPAN);
        prop_assert!((result.royalty_rate - round_to(result.base_rate + result.variation, 2)).abs() < 1e-9);
    }
}
