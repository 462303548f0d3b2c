// src/services/form.rs
//! Calculator form values and their conversion into formula inputs.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use super::valuation::{ComparableQuery, ValuationInput};

/// How malformed numeric fields are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Blank or unparseable numbers become `0`, so the calculator always produces a figure.
    #[default]
    Lenient,
    /// Blank or unparseable numbers are rejected.
    Strict,
}

impl std::str::FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(InputMode::Lenient),
            "strict" => Ok(InputMode::Strict),
            other => Err(format!("unknown input mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a number, got '{value}'")]
    Malformed { field: &'static str, value: String },
}

impl FormError {
    pub fn field(&self) -> &'static str {
        match self {
            FormError::Missing { field } | FormError::Malformed { field, .. } => field,
        }
    }
}

/// Raw field values as typed into the calculator, all optional strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatorForm {
    pub royalty_rate: String,
    pub corporate_tax_rate: String,
    pub discount_rate: String,
    pub growth_rate_forecast: String,
    pub growth_rate_residual: String,
    pub sales_year1: String,
    pub industry: String,
    pub country: String,
    pub rd_sales: String,
    pub company: String,
}

/// Partial form update as sent by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormUpdate {
    pub royalty_rate: Option<String>,
    pub corporate_tax_rate: Option<String>,
    pub discount_rate: Option<String>,
    pub growth_rate_forecast: Option<String>,
    pub growth_rate_residual: Option<String>,
    pub sales_year1: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub rd_sales: Option<String>,
    pub company: Option<String>,
}

/// A whole form replaces every field.
impl From<CalculatorForm> for FormUpdate {
    fn from(form: CalculatorForm) -> Self {
        FormUpdate {
            royalty_rate: Some(form.royalty_rate),
            corporate_tax_rate: Some(form.corporate_tax_rate),
            discount_rate: Some(form.discount_rate),
            growth_rate_forecast: Some(form.growth_rate_forecast),
            growth_rate_residual: Some(form.growth_rate_residual),
            sales_year1: Some(form.sales_year1),
            industry: Some(form.industry),
            country: Some(form.country),
            rd_sales: Some(form.rd_sales),
            company: Some(form.company),
        }
    }
}

impl CalculatorForm {
    /// Applies `update`: absent fields are left alone, present ones replace
    /// the stored value (an empty string clears it).
    pub fn merge(&mut self, update: FormUpdate) {
        let FormUpdate {
            royalty_rate,
            corporate_tax_rate,
            discount_rate,
            growth_rate_forecast,
            growth_rate_residual,
            sales_year1,
            industry,
            country,
            rd_sales,
            company,
        } = update;
        let pairs = [
            (&mut self.royalty_rate, royalty_rate),
            (&mut self.corporate_tax_rate, corporate_tax_rate),
            (&mut self.discount_rate, discount_rate),
            (&mut self.growth_rate_forecast, growth_rate_forecast),
            (&mut self.growth_rate_residual, growth_rate_residual),
            (&mut self.sales_year1, sales_year1),
            (&mut self.industry, industry),
            (&mut self.country, country),
            (&mut self.rd_sales, rd_sales),
            (&mut self.company, company),
        ];
        for (slot, value) in pairs {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }

    pub fn valuation_input(&self, mode: InputMode) -> Result<ValuationInput, FormError> {
        Ok(ValuationInput {
            royalty_rate: parse_number("royaltyRate", &self.royalty_rate, mode)?,
            corporate_tax_rate: parse_number("corporateTaxRate", &self.corporate_tax_rate, mode)?,
            discount_rate: parse_number("discountRate", &self.discount_rate, mode)?,
            growth_rate_forecast: parse_number("growthRateForecast", &self.growth_rate_forecast, mode)?,
            growth_rate_residual: parse_number("growthRateResidual", &self.growth_rate_residual, mode)?,
            sales_year1: parse_number("salesYear1", &self.sales_year1, mode)?,
        })
    }

    pub fn comparable_query(&self, mode: InputMode) -> Result<ComparableQuery, FormError> {
        let industry = self.industry.trim();
        let country = self.country.trim();
        if mode == InputMode::Strict {
            if industry.is_empty() {
                return Err(FormError::Missing { field: "industry" });
            }
            if country.is_empty() {
                return Err(FormError::Missing { field: "country" });
            }
        }
        Ok(ComparableQuery {
            industry: industry.to_string(),
            country: country.to_string(),
        })
    }

    pub fn rd_expenditure(&self, mode: InputMode) -> Result<f64, FormError> {
        parse_number("rdSales", &self.rd_sales, mode)
    }
}

fn numeric_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("numeric prefix pattern is valid")
    })
}

/// Parses one numeric field according to `mode`.
///
/// Lenient parsing reads the longest numeric prefix (`"12%"` is 12) and falls
/// back to `0` when there is none.
pub fn parse_number(field: &'static str, raw: &str, mode: InputMode) -> Result<f64, FormError> {
    let trimmed = raw.trim();
    match mode {
        InputMode::Lenient => Ok(numeric_prefix()
            .find(trimmed)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)),
        InputMode::Strict => {
            if trimmed.is_empty() {
                return Err(FormError::Missing { field });
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| FormError::Malformed {
                    field,
                    value: trimmed.to_string(),
                })
        }
    }
}
