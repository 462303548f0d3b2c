// src/handlers/contact.rs
use chrono::Utc;
use log::{info, warn};
use regex::Regex;
use serde_json::json;
use std::sync::{Arc, OnceLock};
use warp::http::StatusCode;
use warp::Rejection;

use super::{check_length, respond};
use crate::models::{ApiResponse, ContactSubmission, FieldError, Pagination};
use crate::services::gate::is_valid_email;
use crate::state::AppState;

const SERVICE_INTERESTS: &[&str] = &[
    "investment-management",
    "financial-planning",
    "risk-assessment",
    "tax-planning",
    "estate-planning",
    "business-consulting",
    "other",
    "IP Valuation",
    "Business Valuation",
];

const BUDGETS: &[&str] = &["under-10k", "10k-50k", "50k-100k", "100k-500k", "500k-1m", "over-1m", "not-specified"];

const TIMELINES: &[&str] = &[
    "immediate",
    "1-3-months",
    "3-6-months",
    "6-12-months",
    "over-1-year",
    "not-specified",
];

fn phone_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone pattern is valid"))
}

fn is_valid_phone(phone: &str) -> bool {
    let digits: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    phone_pattern().is_match(&digits)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Field checks for a contact form submission. Empty optional fields count as absent.
pub fn validate_submission(form: &ContactSubmission) -> Vec<FieldError> {
    let mut errors = Vec::new();
    check_length(&mut errors, "firstName", &form.first_name, 2, 50, "First name must be between 2 and 50 characters");
    check_length(&mut errors, "lastName", &form.last_name, 2, 50, "Last name must be between 2 and 50 characters");
    if !is_valid_email(form.email.trim()) {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }
    if let Some(phone) = present(&form.phone) {
        if !is_valid_phone(phone) {
            errors.push(FieldError::new("phone", "Please provide a valid phone number"));
        }
    }
    if let Some(company) = present(&form.company) {
        check_length(&mut errors, "company", company, 0, 100, "Company name cannot exceed 100 characters");
    }
    check_length(&mut errors, "subject", &form.subject, 5, 200, "Subject must be between 5 and 200 characters");
    check_length(&mut errors, "message", &form.message, 10, 2000, "Message must be between 10 and 2000 characters");

    let choices: [(&str, &Option<String>, &[&str]); 3] = [
        ("serviceInterest", &form.service_interest, SERVICE_INTERESTS),
        ("budget", &form.budget, BUDGETS),
        ("timeline", &form.timeline, TIMELINES),
    ];
    for (field, value, allowed) in choices {
        if let Some(value) = present(value) {
            if !allowed.contains(&value) {
                errors.push(FieldError::new(field, "Invalid value"));
            }
        }
    }
    if let Some(form_type) = present(&form.form_type) {
        check_length(&mut errors, "formType", form_type, 0, 100, "Form type cannot exceed 100 characters");
    }
    errors
}

fn normalize(mut form: ContactSubmission) -> ContactSubmission {
    form.first_name = form.first_name.trim().to_string();
    form.last_name = form.last_name.trim().to_string();
    form.email = form.email.trim().to_lowercase();
    form.subject = form.subject.trim().to_string();
    form.message = form.message.trim().to_string();
    form.company = present(&form.company).map(str::to_string);
    form.form_type = present(&form.form_type).map(str::to_string);
    form
}

pub async fn submit_contact(form: ContactSubmission, state: Arc<AppState>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling contact form submission");

    let errors = validate_submission(&form);
    if !errors.is_empty() {
        warn!("Contact form rejected: {} invalid field(s)", errors.len());
        return Ok(respond(StatusCode::BAD_REQUEST, &ApiResponse::validation_failed(errors)));
    }

    let form = normalize(form);
    let form_type = form.form_type.as_deref().unwrap_or("Contact");
    info!(
        "New {} form submission from {} {} <{}>: subject={:?} company={:?} serviceInterest={:?} budget={:?} timeline={:?}",
        form_type,
        form.first_name,
        form.last_name,
        form.email,
        form.subject,
        form.company,
        form.service_interest,
        form.budget,
        form.timeline
    );

    match &state.config.mail_user {
        Some(user) => warn!(
            "Mail credentials for {} present but outbound mail is not supported; {} notification for {} not sent",
            user,
            form_type,
            state.config.admin_email.as_deref().unwrap_or(user)
        ),
        None => info!("Email not configured - contact form submitted without email notification"),
    }

    Ok(respond(
        StatusCode::CREATED,
        &ApiResponse::ok(
            "Thank you for your message. We will get back to you soon!",
            json!({ "submittedAt": Utc::now() }),
        ),
    ))
}

pub async fn list_contacts() -> Result<impl warp::Reply, Rejection> {
    Ok(respond(
        StatusCode::OK,
        &ApiResponse::ok(
            "Database-free mode: Contact data not available",
            json!({ "contacts": [], "pagination": Pagination::empty() }),
        ),
    ))
}

pub async fn get_contact(_id: String) -> Result<impl warp::Reply, Rejection> {
    Ok(respond(
        StatusCode::NOT_FOUND,
        &ApiResponse::message(false, "Database-free mode: Contact data not available"),
    ))
}

pub async fn update_contact(_id: String) -> Result<impl warp::Reply, Rejection> {
    Ok(respond(
        StatusCode::NOT_FOUND,
        &ApiResponse::message(false, "Database-free mode: Contact updates not available"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ContactSubmission {
        ContactSubmission {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "Jane@Example.com".into(),
            phone: Some("+971 50 123 4567".into()),
            subject: "IP Valuation Calculator Request - basic Tool".into(),
            message: "Please send me the detailed analysis.".into(),
            service_interest: Some("IP Valuation".into()),
            form_type: Some("IP Valuation Calculator".into()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_submission_passes() {
        assert!(validate_submission(&valid()).is_empty());
    }

    #[test]
    fn short_fields_are_reported() {
        let mut form = valid();
        form.last_name = "".into();
        form.subject = "Hi".into();
        let fields: Vec<String> = validate_submission(&form).into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["lastName", "subject"]);
    }

    #[test]
    fn enums_and_phone_are_checked() {
        let mut form = valid();
        form.budget = Some("a lot".into());
        form.phone = Some("call me".into());
        let fields: Vec<String> = validate_submission(&form).into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["phone", "budget"]);
    }

    #[test]
    fn email_is_lowercased() {
        assert_eq!(normalize(valid()).email, "jane@example.com");
    }
}
