// src/handlers/mod.rs
pub mod calculator;
pub mod contact;
pub mod error;
pub mod newsletter;
pub mod placeholder;

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

use crate::models::FieldError;

pub(crate) fn respond<T: Serialize>(status: StatusCode, body: &T) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

/// Checks the trimmed length of a field in characters.
pub(crate) fn check_length(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
    msg: &str,
) {
    let len = value.trim().chars().count();
    if len < min || len > max {
        errors.push(FieldError::new(field, msg));
    }
}
