// src/services/notifier.rs
//! Best-effort forwarding of calculator leads.
//!
//! Transports are tried in order and the first success wins. If every
//! transport fails the caller gets `NotificationError::AllFailed` and is
//! expected to log it; nothing here ever blocks showing a result.

use async_trait::async_trait;
use log::{error, info, warn};
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::LeadConfig;
use crate::models::LeadSubmission;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("{transport}: request failed: {source}")]
    Http {
        transport: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{transport}: submission rejected: {message}")]
    Rejected { transport: String, message: String },
    #[error("all lead transports failed: {}", .0.join("; "))]
    AllFailed(Vec<String>),
    #[error("no lead transports configured")]
    NoTransports,
}

#[async_trait]
pub trait LeadTransport: Send + Sync {
    fn name(&self) -> &str;
    async fn deliver(&self, lead: &LeadSubmission) -> Result<(), NotificationError>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

fn build_client(config: &LeadConfig) -> Client {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build lead HTTP client with timeout ({}), using defaults", e);
            Client::new()
        })
}

async fn read_outcome(transport: &str, response: reqwest::Response) -> Result<(), NotificationError> {
    let status = response.status();
    let body = response.json::<SubmitResponse>().await.map_err(|e| NotificationError::Http {
        transport: transport.to_string(),
        source: e,
    })?;
    if status.is_success() && body.success {
        Ok(())
    } else {
        Err(NotificationError::Rejected {
            transport: transport.to_string(),
            message: body.message.unwrap_or_else(|| format!("HTTP {}", status)),
        })
    }
}

/// JSON POST to the site's own contact endpoint.
pub struct ContactApiTransport {
    client: Client,
    url: String,
}

impl ContactApiTransport {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        ContactApiTransport { client, url: url.into() }
    }
}

#[async_trait]
impl LeadTransport for ContactApiTransport {
    fn name(&self) -> &str {
        "contact-api"
    }

    async fn deliver(&self, lead: &LeadSubmission) -> Result<(), NotificationError> {
        info!("Submitting lead to {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .json(lead)
            .send()
            .await
            .map_err(|e| NotificationError::Http {
                transport: self.name().to_string(),
                source: e,
            })?;
        read_outcome(self.name(), response).await
    }
}

/// Multipart POST to a public form relay, authenticated by an access key.
pub struct FormRelayTransport {
    client: Client,
    url: String,
    access_key: String,
}

impl FormRelayTransport {
    pub fn new(client: Client, url: impl Into<String>, access_key: impl Into<String>) -> Self {
        FormRelayTransport {
            client,
            url: url.into(),
            access_key: access_key.into(),
        }
    }

    fn form(&self, lead: &LeadSubmission) -> Form {
        Form::new()
            .text("access_key", self.access_key.clone())
            .text("firstName", lead.first_name.clone())
            .text("lastName", lead.last_name.clone())
            .text("email", lead.email.clone())
            .text("phone", lead.phone.clone())
            .text("company", lead.company.clone())
            .text("subject", lead.subject.clone())
            .text("message", lead.message.clone())
            .text("serviceInterest", lead.service_interest.clone())
            .text("formType", lead.form_type.clone())
    }
}

#[async_trait]
impl LeadTransport for FormRelayTransport {
    fn name(&self) -> &str {
        "form-relay"
    }

    async fn deliver(&self, lead: &LeadSubmission) -> Result<(), NotificationError> {
        info!("Submitting lead to form relay {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .multipart(self.form(lead))
            .send()
            .await
            .map_err(|e| NotificationError::Http {
                transport: self.name().to_string(),
                source: e,
            })?;
        read_outcome(self.name(), response).await
    }
}

/// Ordered list of transports; first success wins.
#[derive(Clone, Default)]
pub struct FallbackNotifier {
    transports: Vec<Arc<dyn LeadTransport>>,
}

impl FallbackNotifier {
    pub fn new(transports: Vec<Arc<dyn LeadTransport>>) -> Self {
        FallbackNotifier { transports }
    }

    /// Contact API first, then the form relay when an access key is configured.
    pub fn from_config(config: &LeadConfig) -> Self {
        let client = build_client(config);
        let mut transports: Vec<Arc<dyn LeadTransport>> =
            vec![Arc::new(ContactApiTransport::new(client.clone(), config.primary_url.clone()))];
        if let Some(key) = &config.relay_access_key {
            transports.push(Arc::new(FormRelayTransport::new(client, config.relay_url.clone(), key.clone())));
        }
        FallbackNotifier::new(transports)
    }

    pub fn transport_names(&self) -> Vec<&str> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    /// Returns the name of the transport that accepted the lead.
    pub async fn notify(&self, lead: &LeadSubmission) -> Result<String, NotificationError> {
        if self.transports.is_empty() {
            return Err(NotificationError::NoTransports);
        }
        let mut failures = Vec::new();
        for transport in &self.transports {
            match transport.deliver(lead).await {
                Ok(()) => {
                    info!("Lead from {} delivered via {}", lead.email, transport.name());
                    return Ok(transport.name().to_string());
                }
                Err(e) => {
                    warn!("Lead transport {} failed: {}", transport.name(), e);
                    failures.push(e.to_string());
                }
            }
        }
        Err(NotificationError::AllFailed(failures))
    }

    /// Forwards `lead` on a background task. Failures are logged only.
    pub fn spawn_notify(self: &Arc<Self>, lead: LeadSubmission) -> JoinHandle<()> {
        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&lead).await {
                error!("Failed to forward lead from {}: {}", lead.email, e);
            }
        })
    }
}
