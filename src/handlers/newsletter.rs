// src/handlers/newsletter.rs
use chrono::Utc;
use log::{info, warn};
use serde_json::json;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Rejection;

use super::{check_length, respond};
use crate::models::{ApiResponse, FieldError, NewsletterSubscription, Pagination};
use crate::services::gate::is_valid_email;
use crate::state::AppState;

pub fn validate_subscription(form: &NewsletterSubscription) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_valid_email(form.email.trim()) {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }
    if let Some(first_name) = &form.first_name {
        check_length(&mut errors, "firstName", first_name, 2, 50, "First name must be between 2 and 50 characters");
    }
    if let Some(last_name) = &form.last_name {
        check_length(&mut errors, "lastName", last_name, 2, 50, "Last name must be between 2 and 50 characters");
    }
    errors
}

/// Accepts the subscription without storing it.
pub async fn subscribe(form: NewsletterSubscription, state: Arc<AppState>) -> Result<impl warp::Reply, Rejection> {
    info!("Handling newsletter subscription");

    let errors = validate_subscription(&form);
    if !errors.is_empty() {
        warn!("Newsletter subscription rejected: {} invalid field(s)", errors.len());
        return Ok(respond(StatusCode::BAD_REQUEST, &ApiResponse::validation_failed(errors)));
    }

    let email = form.email.trim().to_lowercase();
    info!(
        "New newsletter subscription: email={} firstName={:?} lastName={:?}",
        email,
        form.first_name.as_deref().map(str::trim),
        form.last_name.as_deref().map(str::trim)
    );
    if state.config.mail_user.is_some() {
        warn!("Outbound mail is not supported; welcome email to {} not sent", email);
    } else {
        info!("Email not configured - newsletter subscription without email notification");
    }

    Ok(respond(
        StatusCode::CREATED,
        &ApiResponse::ok(
            "Thank you for subscribing to our newsletter!",
            json!({ "subscribedAt": Utc::now() }),
        ),
    ))
}

pub async fn list_subscribers() -> Result<impl warp::Reply, Rejection> {
    Ok(respond(
        StatusCode::OK,
        &ApiResponse::ok(
            "Database-free mode: Newsletter subscribers not available",
            json!({ "subscribers": [], "pagination": Pagination::empty() }),
        ),
    ))
}

pub async fn unsubscribe() -> Result<impl warp::Reply, Rejection> {
    Ok(respond(
        StatusCode::OK,
        &ApiResponse::message(true, "Database-free mode: Unsubscribe not available"),
    ))
}
