// src/services/gate.rs
//! Contact capture that must happen before calculator results are shown.

use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl ContactRecord {
    /// First word of the name, or the whole name when it has no spaces.
    pub fn first_name(&self) -> &str {
        let name = self.name.trim();
        name.split(' ').next().filter(|s| !s.is_empty()).unwrap_or(name)
    }

    /// Everything after the first space, possibly empty.
    pub fn last_name(&self) -> String {
        self.name.trim().split(' ').skip(1).collect::<Vec<_>>().join(" ")
    }

    pub fn validate(&self) -> Result<(), ContactValidationError> {
        for (field, value) in [("name", &self.name), ("email", &self.email), ("phone", &self.phone)] {
            if value.trim().is_empty() {
                return Err(ContactValidationError::MissingField(field));
            }
        }
        if !is_valid_email(&self.email) {
            return Err(ContactValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactValidationError {
    #[error("Please fill in all required fields ({0} is missing).")]
    MissingField(&'static str),
    #[error("Please enter a valid email address.")]
    InvalidEmail(String),
}

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GateState {
    NoContact,
    ContactPending,
    ContactValid,
    Submitted,
}

/// What a calculate request may do given the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    ContactRequired,
}

/// Result of a contact submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactAcceptance {
    /// First valid contact of the session; it should be forwarded.
    Accepted(ContactRecord),
    /// The session already has a forwarded contact.
    AlreadySubmitted,
}

#[derive(Debug, Clone)]
pub struct LeadGate {
    state: GateState,
    contact: Option<ContactRecord>,
}

impl Default for LeadGate {
    fn default() -> Self {
        LeadGate {
            state: GateState::NoContact,
            contact: None,
        }
    }
}

impl LeadGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn contact(&self) -> Option<&ContactRecord> {
        self.contact.as_ref()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, GateState::ContactValid | GateState::Submitted)
    }

    pub fn request_calculation(&mut self) -> GateDecision {
        match self.state {
            GateState::ContactValid | GateState::Submitted => GateDecision::Proceed,
            GateState::NoContact | GateState::ContactPending => {
                if self.state == GateState::NoContact {
                    debug!("Calculation requested without contact, showing capture form");
                }
                self.state = GateState::ContactPending;
                GateDecision::ContactRequired
            }
        }
    }

    /// Validates `record`. Invalid input keeps (or puts) the gate in `ContactPending`.
    pub fn submit_contact(&mut self, record: ContactRecord) -> Result<ContactAcceptance, ContactValidationError> {
        if self.is_open() {
            return Ok(ContactAcceptance::AlreadySubmitted);
        }
        if let Err(e) = record.validate() {
            self.state = GateState::ContactPending;
            return Err(e);
        }
        info!("Contact captured for calculator session");
        self.state = GateState::ContactValid;
        self.contact = Some(record.clone());
        Ok(ContactAcceptance::Accepted(record))
    }

    /// Records that the forward was attempted. Its outcome does not matter.
    pub fn mark_submitted(&mut self) {
        if self.state == GateState::ContactValid {
            self.state = GateState::Submitted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(email: &str) -> ContactRecord {
        ContactRecord {
            name: "Jane Q Doe".to_string(),
            email: email.to_string(),
            phone: "+971 50 000 0000".to_string(),
            company: None,
        }
    }

    #[test]
    fn first_calculation_asks_for_contact() {
        let mut gate = LeadGate::new();
        assert_eq!(gate.state(), GateState::NoContact);
        assert_eq!(gate.request_calculation(), GateDecision::ContactRequired);
        assert_eq!(gate.state(), GateState::ContactPending);
        assert_eq!(gate.request_calculation(), GateDecision::ContactRequired);
    }

    #[test]
    fn invalid_email_keeps_gate_pending() {
        let mut gate = LeadGate::new();
        gate.request_calculation();
        let err = gate.submit_contact(contact("not-an-email")).unwrap_err();
        assert_eq!(err, ContactValidationError::InvalidEmail("not-an-email".to_string()));
        assert_eq!(gate.state(), GateState::ContactPending);
        assert!(gate.contact().is_none());
    }

    #[test]
    fn blank_fields_are_rejected() {
        let mut gate = LeadGate::new();
        let mut record = contact("jane@example.com");
        record.phone = "   ".to_string();
        assert_eq!(
            gate.submit_contact(record),
            Err(ContactValidationError::MissingField("phone"))
        );
    }

    #[test]
    fn valid_contact_opens_gate_for_good() {
        let mut gate = LeadGate::new();
        gate.request_calculation();
        let accepted = gate.submit_contact(contact("jane@example.com")).unwrap();
        assert!(matches!(accepted, ContactAcceptance::Accepted(_)));
        assert_eq!(gate.state(), GateState::ContactValid);
        gate.mark_submitted();
        assert_eq!(gate.state(), GateState::Submitted);
        for _ in 0..3 {
            assert_eq!(gate.request_calculation(), GateDecision::Proceed);
        }
        assert_eq!(gate.state(), GateState::Submitted);
    }

    #[test]
    fn contact_is_accepted_only_once() {
        let mut gate = LeadGate::new();
        gate.submit_contact(contact("jane@example.com")).unwrap();
        gate.mark_submitted();
        assert_eq!(
            gate.submit_contact(contact("other@example.com")),
            Ok(ContactAcceptance::AlreadySubmitted)
        );
        assert_eq!(gate.contact().unwrap().email, "jane@example.com");
    }

    #[test]
    fn name_is_split_for_forwarding() {
        let record = contact("jane@example.com");
        assert_eq!(record.first_name(), "Jane");
        assert_eq!(record.last_name(), "Q Doe");

        let single = ContactRecord {
            name: "Cher".to_string(),
            ..record
        };
        assert_eq!(single.first_name(), "Cher");
        assert_eq!(single.last_name(), "");
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("@c.de"));
    }
}
