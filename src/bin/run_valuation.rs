// src/bin/run_valuation.rs
// Usage: run_valuation [royalty% tax% discount% growth% residual% sales]
use anyhow::{Context, Result};
use std::env;

use yd_advisory::services::valuation::{relief_from_royalty, ValuationInput};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<f64> = env::args()
        .skip(1)
        .map(|a| a.parse::<f64>().with_context(|| format!("'{}' is not a number", a)))
        .collect::<Result<_>>()?;

    let input = match args.as_slice() {
        [] => ValuationInput {
            royalty_rate: 5.0,
            corporate_tax_rate: 20.0,
            discount_rate: 12.0,
            growth_rate_forecast: 10.0,
            growth_rate_residual: 2.0,
            sales_year1: 1_000_000.0,
        },
        [royalty, tax, discount, growth, residual, sales] => ValuationInput {
            royalty_rate: *royalty,
            corporate_tax_rate: *tax,
            discount_rate: *discount,
            growth_rate_forecast: *growth,
            growth_rate_residual: *residual,
            sales_year1: *sales,
        },
        _ => anyhow::bail!("expected no arguments or exactly six"),
    };
    println!("Assumptions: {:?}", input);

    let result = relief_from_royalty(&input)?.rounded();
    println!(
        "{:>4} {:>14} {:>12} {:>12} {:>12} {:>8} {:>12}",
        "Year", "Sales", "Royalty", "Tax", "After tax", "DF", "PV"
    );
    for year in &result.yearly_results {
        println!(
            "{:>4} {:>14.0} {:>12.0} {:>12.0} {:>12.0} {:>8.4} {:>12.0}",
            year.year,
            year.sales,
            year.royalty_cash_flow,
            year.corporate_tax,
            year.earnings_after_tax,
            year.discount_factor,
            year.discounted_cash_flow
        );
    }
    println!("Sum of PV:            {:.0}", result.total_pv);
    println!("Continuing value:     {:.0}", result.continuing_value);
    println!("Continuing value PV:  {:.0}", result.continuing_value_pv);
    println!("Fair market value:    {:.0}", result.fair_market_value);
    Ok(())
}
