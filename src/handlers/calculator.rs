// src/handlers/calculator.rs
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Rejection;

use super::error::ApiError;
use super::respond;
use crate::models::{ApiResponse, FieldError};
use crate::services::calculator::{CalculateOutcome, CalculatorConfig, CalculatorController};
use crate::services::form::{CalculatorForm, FormUpdate, InputMode};
use crate::services::gate::{ContactRecord, ContactValidationError, GateState};
use crate::services::sessions::SharedController;
use crate::services::valuation::{CalculationResult, CalculatorMode};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "type")]
    pub calculator_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CalculateRequest {
    pub mode: Option<CalculatorMode>,
    /// Fields to change; `""` clears a field, absent ones are kept.
    pub form: Option<FormUpdate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub mode: CalculatorMode,
    pub input_mode: InputMode,
    pub gate: GateState,
    pub form: CalculatorForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactRecord>,
    pub last_result: Option<CalculationResult>,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    fn of(session_id: Uuid, calc: &CalculatorController) -> Self {
        SessionSnapshot {
            session_id,
            mode: calc.mode(),
            input_mode: calc.config().input_mode,
            gate: calc.gate_state(),
            form: calc.form().clone(),
            contact: calc.contact().cloned(),
            last_result: calc.last_result().map(CalculationResult::for_display),
            last_error: calc.last_error().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub session_id: Uuid,
    pub mode: CalculatorMode,
    pub gate: GateState,
    #[serde(flatten)]
    pub outcome: CalculateOutcome,
}

fn for_display(outcome: CalculateOutcome) -> CalculateOutcome {
    match outcome {
        CalculateOutcome::Computed { result } => CalculateOutcome::Computed {
            result: result.for_display(),
        },
        other => other,
    }
}

fn status_of(outcome: &CalculateOutcome) -> StatusCode {
    match outcome {
        CalculateOutcome::Computed { .. } | CalculateOutcome::ContactRequired => StatusCode::OK,
        CalculateOutcome::InvalidAssumptions { .. } | CalculateOutcome::InvalidInput { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

async fn session(state: &AppState, id: &Uuid) -> Result<SharedController, Rejection> {
    state.sessions.get(id).await.ok_or_else(|| {
        debug!("Unknown calculator session {}", id);
        warp::reject::custom(ApiError::not_found("Calculator session not found"))
    })
}

/// Optional pause so the front end can show its "calculating" state.
async fn pace(state: &AppState, outcome: &CalculateOutcome) {
    let delay = state.config.calculation_delay;
    if !delay.is_zero() && matches!(outcome, CalculateOutcome::Computed { .. }) {
        tokio::time::sleep(delay).await;
    }
}

pub async fn create_session(query: SessionQuery, state: Arc<AppState>) -> Result<impl warp::Reply, Rejection> {
    let config = CalculatorConfig::from_type_param(query.calculator_type.as_deref(), state.config.input_mode);
    let (id, controller) = state.sessions.create(config).await;
    let calc = controller.lock().await;
    Ok(respond(StatusCode::CREATED, &SessionSnapshot::of(id, &calc)))
}

pub async fn get_session(id: Uuid, state: Arc<AppState>) -> Result<impl warp::Reply, Rejection> {
    let controller = session(&state, &id).await?;
    let calc = controller.lock().await;
    Ok(respond(StatusCode::OK, &SessionSnapshot::of(id, &calc)))
}

pub async fn calculate(
    id: Uuid,
    request: CalculateRequest,
    state: Arc<AppState>,
) -> Result<impl warp::Reply, Rejection> {
    let controller = session(&state, &id).await?;
    let response = {
        let mut calc = controller.lock().await;
        if let Some(mode) = request.mode {
            calc.set_mode(mode);
        }
        if let Some(form) = request.form {
            calc.update_form(form);
        }
        let outcome = calc.calculate();
        info!("Calculator session {} ({}): {:?}", id, calc.mode(), status_of(&outcome));
        CalculateResponse {
            session_id: id,
            mode: calc.mode(),
            gate: calc.gate_state(),
            outcome: for_display(outcome),
        }
    };

    pace(&state, &response.outcome).await;
    Ok(respond(status_of(&response.outcome), &response))
}

fn contact_errors(e: &ContactValidationError) -> Vec<FieldError> {
    let field = match e {
        ContactValidationError::MissingField(field) => *field,
        ContactValidationError::InvalidEmail(_) => "email",
    };
    vec![FieldError::new(field, e.to_string())]
}

pub async fn submit_contact(
    id: Uuid,
    record: ContactRecord,
    state: Arc<AppState>,
) -> Result<impl warp::Reply, Rejection> {
    let controller = session(&state, &id).await?;
    let result = {
        let mut calc = controller.lock().await;
        calc.submit_contact(record).map(|outcome| {
            let response = CalculateResponse {
                session_id: id,
                mode: calc.mode(),
                gate: calc.gate_state(),
                outcome: for_display(outcome.calculation),
            };
            (outcome.lead, response)
        })
    };

    match result {
        Err(e) => {
            warn!("Calculator session {} contact rejected: {}", id, e);
            Ok(respond(
                StatusCode::BAD_REQUEST,
                &ApiResponse::validation_failed(contact_errors(&e)),
            ))
        }
        Ok((lead, response)) => {
            if let Some(lead) = lead {
                state.notifier.spawn_notify(lead);
            }
            pace(&state, &response.outcome).await;
            Ok(respond(status_of(&response.outcome), &response))
        }
    }
}

pub async fn industries(state: Arc<AppState>) -> Result<impl warp::Reply, Rejection> {
    let reference = state.sessions.reference();
    Ok(respond(StatusCode::OK, &json!({ "industries": reference.industries() })))
}

pub async fn countries(state: Arc<AppState>) -> Result<impl warp::Reply, Rejection> {
    let reference = state.sessions.reference();
    Ok(respond(StatusCode::OK, &json!({ "countries": reference.countries() })))
}
