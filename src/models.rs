// src/models.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload sent to the lead endpoints when a calculator user leaves contact details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub subject: String,
    pub message: String,
    pub service_interest: String,
    pub form_type: String,
}

/// Body of `POST /api/contact/submit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    pub service_interest: Option<String>,
    pub budget: Option<String>,
    pub timeline: Option<String>,
    pub form_type: Option<String>,
}

/// Body of `POST /api/newsletter/subscribe`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsletterSubscription {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, msg: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            msg: msg.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub current: u32,
    pub pages: u32,
    pub total: u32,
}

impl Pagination {
    pub fn empty() -> Self {
        Pagination {
            current: 1,
            pages: 0,
            total: 0,
        }
    }
}

/// JSON envelope used by every site route: `{success, message, data?, errors?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    pub fn message(success: bool, message: impl Into<String>) -> Self {
        ApiResponse {
            success,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    pub fn validation_failed(errors: Vec<FieldError>) -> Self {
        ApiResponse {
            success: false,
            message: "Validation failed".to_string(),
            data: None,
            errors: Some(errors),
        }
    }
}
