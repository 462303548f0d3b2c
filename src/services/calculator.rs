// src/services/calculator.rs
//! Calculator workflow: mode selection, gate check, input parsing and
//! dispatch to the valuation formulas.

use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;

use super::form::{CalculatorForm, FormError, FormUpdate, InputMode};
use super::gate::{ContactAcceptance, ContactRecord, ContactValidationError, GateDecision, GateState, LeadGate};
use super::reference_data::ReferenceData;
use super::valuation::{
    earning_multiples, estimate_royalty_rate, rd_ratio, relief_from_royalty, CalculationResult, CalculatorMode,
    ValuationError, VariationSource,
};
use crate::models::LeadSubmission;

pub const SERVICE_INTEREST: &str = "IP Valuation";
pub const FORM_TYPE: &str = "IP Valuation Calculator";
const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorConfig {
    pub initial_mode: CalculatorMode,
    pub input_mode: InputMode,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        CalculatorConfig {
            initial_mode: CalculatorMode::Basic,
            input_mode: InputMode::Lenient,
        }
    }
}

impl CalculatorConfig {
    /// Maps the landing page's `type` parameter: `advanced` opens the earning
    /// multiples tool, anything else the basic valuation.
    pub fn from_type_param(param: Option<&str>, input_mode: InputMode) -> Self {
        let initial_mode = match param {
            Some("advanced") => CalculatorMode::Earning,
            _ => CalculatorMode::Basic,
        };
        CalculatorConfig {
            initial_mode,
            input_mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CalculateOutcome {
    /// The gate is closed; the contact form has to be shown instead.
    ContactRequired,
    Computed { result: CalculationResult },
    /// Discount rate not above residual growth; no value is produced.
    InvalidAssumptions { message: String },
    /// Strict-mode input rejection.
    InvalidInput { field: String, message: String },
}

/// Outcome of a valid contact submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactOutcome {
    /// Lead to forward, `None` when one was already forwarded this session.
    pub lead: Option<LeadSubmission>,
    pub calculation: CalculateOutcome,
}

pub struct CalculatorController {
    config: CalculatorConfig,
    mode: CalculatorMode,
    form: CalculatorForm,
    last_result: Option<CalculationResult>,
    last_error: Option<String>,
    gate: LeadGate,
    reference: Arc<dyn ReferenceData>,
    variation: Box<dyn VariationSource>,
}

impl CalculatorController {
    pub fn new(
        config: CalculatorConfig,
        reference: Arc<dyn ReferenceData>,
        variation: Box<dyn VariationSource>,
    ) -> Self {
        CalculatorController {
            config,
            mode: config.initial_mode,
            form: CalculatorForm::default(),
            last_result: None,
            last_error: None,
            gate: LeadGate::new(),
            reference,
            variation,
        }
    }

    pub fn config(&self) -> CalculatorConfig {
        self.config
    }

    pub fn mode(&self) -> CalculatorMode {
        self.mode
    }

    /// Switching tools clears the previous result, like switching tabs did.
    pub fn set_mode(&mut self, mode: CalculatorMode) {
        if mode != self.mode {
            debug!("Calculator mode {} -> {}", self.mode, mode);
            self.mode = mode;
            self.last_result = None;
            self.last_error = None;
        }
    }

    pub fn form(&self) -> &CalculatorForm {
        &self.form
    }

    pub fn update_form(&mut self, update: impl Into<FormUpdate>) {
        self.form.merge(update.into());
    }

    pub fn last_result(&self) -> Option<&CalculationResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn contact(&self) -> Option<&ContactRecord> {
        self.gate.contact()
    }

    pub fn calculate(&mut self) -> CalculateOutcome {
        if self.gate.request_calculation() == GateDecision::ContactRequired {
            return CalculateOutcome::ContactRequired;
        }

        match self.compute() {
            Ok(result) => {
                info!("Calculated {} result", result.mode());
                self.last_result = Some(result.clone());
                self.last_error = None;
                CalculateOutcome::Computed { result }
            }
            Err(outcome) => {
                self.last_result = None;
                self.last_error = match &outcome {
                    CalculateOutcome::InvalidAssumptions { message } => Some(message.clone()),
                    CalculateOutcome::InvalidInput { message, .. } => Some(message.clone()),
                    _ => None,
                };
                outcome
            }
        }
    }

    fn compute(&mut self) -> Result<CalculationResult, CalculateOutcome> {
        let input_mode = self.config.input_mode;
        let reference = self.reference.as_ref();
        match self.mode {
            CalculatorMode::Basic => {
                let input = self.form.valuation_input(input_mode).map_err(invalid_input)?;
                relief_from_royalty(&input)
                    .map(CalculationResult::Basic)
                    .map_err(|ValuationError::InvalidAssumptions(message)| {
                        warn!("Rejected valuation assumptions: {}", message);
                        CalculateOutcome::InvalidAssumptions { message }
                    })
            }
            CalculatorMode::Earning => {
                let query = self.form.comparable_query(input_mode).map_err(invalid_input)?;
                Ok(CalculationResult::Earning(earning_multiples(
                    reference,
                    &query,
                    self.variation.as_mut(),
                )))
            }
            CalculatorMode::Rd => {
                let query = self.form.comparable_query(input_mode).map_err(invalid_input)?;
                let expenditure = self.form.rd_expenditure(input_mode).map_err(invalid_input)?;
                Ok(CalculationResult::Rd(rd_ratio(reference, &query, expenditure)))
            }
            CalculatorMode::Royalty => {
                let query = self.form.comparable_query(input_mode).map_err(invalid_input)?;
                Ok(CalculationResult::Royalty(estimate_royalty_rate(
                    reference,
                    &query,
                    self.variation.as_mut(),
                )))
            }
        }
    }

    /// Passes the contact to the gate. A valid first contact yields the lead to
    /// forward; either way the gate is then open and the calculation runs.
    pub fn submit_contact(&mut self, record: ContactRecord) -> Result<ContactOutcome, ContactValidationError> {
        let lead = match self.gate.submit_contact(record)? {
            ContactAcceptance::Accepted(contact) => {
                let lead = self.lead_submission(&contact);
                // Forwarding is fire-and-forget, so the gate moves on right away.
                self.gate.mark_submitted();
                Some(lead)
            }
            ContactAcceptance::AlreadySubmitted => None,
        };
        Ok(ContactOutcome {
            lead,
            calculation: self.calculate(),
        })
    }

    pub fn lead_submission(&self, contact: &ContactRecord) -> LeadSubmission {
        let company = [Some(self.form.company.as_str()), contact.company.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|c| !c.is_empty())
            .unwrap_or("Not provided")
            .to_string();

        LeadSubmission {
            first_name: contact.first_name().to_string(),
            last_name: contact.last_name(),
            email: contact.email.trim().to_string(),
            phone: contact.phone.trim().to_string(),
            company,
            subject: format!("IP Valuation Calculator Request - {} Tool", self.mode),
            message: self.lead_message(),
            service_interest: SERVICE_INTEREST.to_string(),
            form_type: FORM_TYPE.to_string(),
        }
    }

    fn lead_message(&self) -> String {
        let form = &self.form;
        let field = |value: &str| {
            let value = value.trim();
            if value.is_empty() {
                NOT_SPECIFIED.to_string()
            } else {
                value.to_string()
            }
        };
        let percent = |value: &str| {
            let value = value.trim();
            if value.is_empty() {
                NOT_SPECIFIED.to_string()
            } else {
                format!("{}%", value)
            }
        };
        let location = format!(
            "- Industry: {}\n- Country: {}",
            field(&form.industry),
            field(&form.country)
        );

        let parameters = match self.mode {
            CalculatorMode::Basic => format!(
                "- Royalty Rate: {}\n- Corporate Tax Rate: {}\n- Discount Rate: {}\n\
                 - Growth Rate (Forecast): {}\n- Growth Rate (Residual): {}\n- Sales Year 1: {}",
                percent(&form.royalty_rate),
                percent(&form.corporate_tax_rate),
                percent(&form.discount_rate),
                percent(&form.growth_rate_forecast),
                percent(&form.growth_rate_residual),
                field(&form.sales_year1),
            ),
            CalculatorMode::Earning => format!(
                "{}\n- Analysis Type: Earning Multiples (P/E, EV/EBIT, EV/EBITDA)",
                location
            ),
            CalculatorMode::Rd => format!(
                "{}\n- R&D Expenditure: {}\n- Analysis Type: R&D to Sales Ratio",
                location,
                field(&form.rd_sales)
            ),
            CalculatorMode::Royalty => format!("{}\n- Analysis Type: Royalty Rate Analysis", location),
        };

        format!(
            "Dear YD Advisory Team,\n\n\
             I have completed the IP Valuation Calculator and would like to receive detailed analysis and next steps.\n\n\
             CALCULATOR DETAILS:\n\
             - Calculator Type: {mode}\n\
             {location}\n\n\
             VALUATION PARAMETERS:\n\
             {parameters}\n\n\
             Please provide:\n\
             1. Detailed valuation analysis\n\
             2. Professional recommendations\n\
             3. Next steps for comprehensive IP valuation\n\
             4. Timeline and pricing information\n\n\
             Thank you for your expertise.",
            mode = self.mode,
            location = location,
            parameters = parameters,
        )
    }
}

fn invalid_input(e: FormError) -> CalculateOutcome {
    CalculateOutcome::InvalidInput {
        field: e.field().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reference_data::StaticReferenceData;
    use crate::services::valuation::FixedVariation;

    fn controller(mode: CalculatorMode, input_mode: InputMode) -> CalculatorController {
        CalculatorController::new(
            CalculatorConfig {
                initial_mode: mode,
                input_mode,
            },
            Arc::new(StaticReferenceData),
            Box::new(FixedVariation::centered()),
        )
    }

    fn contact() -> ContactRecord {
        ContactRecord {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "0501234567".into(),
            company: Some("Acme".into()),
        }
    }

    fn scenario_form() -> CalculatorForm {
        CalculatorForm {
            royalty_rate: "5".into(),
            corporate_tax_rate: "20".into(),
            discount_rate: "12".into(),
            growth_rate_forecast: "10".into(),
            growth_rate_residual: "3".into(),
            sales_year1: "1000000".into(),
            ..Default::default()
        }
    }

    #[test]
    fn type_param_selects_initial_mode() {
        assert_eq!(
            CalculatorConfig::from_type_param(Some("advanced"), InputMode::Lenient).initial_mode,
            CalculatorMode::Earning
        );
        assert_eq!(
            CalculatorConfig::from_type_param(Some("basic"), InputMode::Lenient).initial_mode,
            CalculatorMode::Basic
        );
        assert_eq!(
            CalculatorConfig::from_type_param(None, InputMode::Lenient).initial_mode,
            CalculatorMode::Basic
        );
    }

    #[test]
    fn calculate_without_contact_is_gated() {
        let mut calc = controller(CalculatorMode::Basic, InputMode::Lenient);
        calc.update_form(scenario_form());
        assert_eq!(calc.calculate(), CalculateOutcome::ContactRequired);
        assert_eq!(calc.gate_state(), GateState::ContactPending);
        assert!(calc.last_result().is_none());
    }

    #[test]
    fn contact_submission_produces_lead_and_result() {
        let mut calc = controller(CalculatorMode::Basic, InputMode::Lenient);
        calc.update_form(scenario_form());
        calc.calculate();
        let outcome = calc.submit_contact(contact()).unwrap();

        let lead = outcome.lead.unwrap();
        assert_eq!(lead.first_name, "Jane");
        assert_eq!(lead.last_name, "Doe");
        assert_eq!(lead.company, "Acme");
        assert_eq!(lead.subject, "IP Valuation Calculator Request - basic Tool");
        assert!(lead.message.contains("- Royalty Rate: 5%"));
        assert!(lead.message.contains("- Industry: Not specified"));
        assert_eq!(lead.service_interest, "IP Valuation");

        match outcome.calculation {
            CalculateOutcome::Computed {
                result: CalculationResult::Basic(dcf),
            } => assert_eq!(dcf.yearly_results[0].discounted_cash_flow.round(), 35_714.0),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(calc.gate_state(), GateState::Submitted);
        assert_eq!(calc.contact().map(|c| c.email.as_str()), Some("jane@example.com"));
        assert_eq!(calc.last_result().map(CalculationResult::mode), Some(CalculatorMode::Basic));
    }

    #[test]
    fn gate_never_reprompts_after_contact() {
        let mut calc = controller(CalculatorMode::Royalty, InputMode::Lenient);
        calc.submit_contact(contact()).unwrap();
        for mode in [CalculatorMode::Basic, CalculatorMode::Earning, CalculatorMode::Rd] {
            calc.set_mode(mode);
            assert_ne!(calc.calculate(), CalculateOutcome::ContactRequired);
        }
        let again = calc.submit_contact(contact()).unwrap();
        assert!(again.lead.is_none());
    }

    #[test]
    fn invalid_contact_leaves_gate_pending() {
        let mut calc = controller(CalculatorMode::Basic, InputMode::Lenient);
        calc.calculate();
        let mut bad = contact();
        bad.email = "not-an-email".into();
        assert!(calc.submit_contact(bad).is_err());
        assert_eq!(calc.gate_state(), GateState::ContactPending);
        assert_eq!(calc.calculate(), CalculateOutcome::ContactRequired);
    }

    #[test]
    fn empty_basic_form_reports_invalid_assumptions() {
        let mut calc = controller(CalculatorMode::Basic, InputMode::Lenient);
        let outcome = calc.submit_contact(contact()).unwrap().calculation;
        assert!(matches!(outcome, CalculateOutcome::InvalidAssumptions { .. }));
        assert!(calc.last_result().is_none());
        assert!(calc.last_error().is_some());
    }

    #[test]
    fn strict_mode_rejects_malformed_numbers() {
        let mut calc = controller(CalculatorMode::Basic, InputMode::Strict);
        calc.submit_contact(contact()).unwrap();
        let mut form = scenario_form();
        form.discount_rate = "twelve".into();
        calc.update_form(form);
        match calc.calculate() {
            CalculateOutcome::InvalidInput { field, .. } => assert_eq!(field, "discountRate"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn earning_mode_flags_fallback_data() {
        let mut calc = controller(CalculatorMode::Earning, InputMode::Lenient);
        calc.submit_contact(contact()).unwrap();
        calc.update_form(CalculatorForm {
            industry: "Quantum Widgets".into(),
            country: "Atlantis".into(),
            ..Default::default()
        });
        match calc.calculate() {
            CalculateOutcome::Computed {
                result: CalculationResult::Earning(multiples),
            } => {
                assert!(multiples.is_fallback_data);
                assert_eq!(multiples.companies.len(), 3);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn rd_lead_message_lists_expenditure() {
        let mut calc = controller(CalculatorMode::Rd, InputMode::Lenient);
        calc.update_form(CalculatorForm {
            industry: "Technology".into(),
            country: "Japan".into(),
            rd_sales: "2500".into(),
            ..Default::default()
        });
        let lead = calc.lead_submission(&contact());
        assert!(lead.message.contains("- R&D Expenditure: 2500"));
        assert!(lead.message.contains("- Country: Japan"));
        assert_eq!(lead.subject, "IP Valuation Calculator Request - rd Tool");
    }

    #[test]
    fn switching_mode_clears_result() {
        let mut calc = controller(CalculatorMode::Royalty, InputMode::Lenient);
        calc.submit_contact(contact()).unwrap();
        assert!(calc.last_result().is_some());
        calc.set_mode(CalculatorMode::Rd);
        assert!(calc.last_result().is_none());
    }
}
