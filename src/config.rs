// src/config.rs
use anyhow::{Context, Result};
use log::{info, warn};
use std::env;
use std::time::Duration;

use crate::services::form::InputMode;
use crate::services::sessions::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};

const DEFAULT_PORT: u16 = 3030;
const DEFAULT_RELAY_URL: &str = "https://api.web3forms.com/submit";
const DEFAULT_LEAD_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct LeadConfig {
    pub primary_url: String,
    pub relay_url: String,
    /// The relay transport is only used when a key is configured.
    pub relay_access_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub lead: LeadConfig,
    pub input_mode: InputMode,
    pub calculation_delay: Duration,
    /// Idle calculator sessions are dropped after this long.
    pub session_ttl: Duration,
    pub max_sessions: usize,
    /// Mail credentials are only reported; outbound mail is not sent.
    pub mail_user: Option<String>,
    pub admin_email: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from the environment. Call `dotenv().ok()` first
    /// to pick up a local `.env`.
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().context("PORT must be a number")?,
            Err(_) => {
                warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        let primary_url = env::var("LEAD_PRIMARY_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{}/api/contact/submit", port));
        let relay_url = env::var("LEAD_RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());
        let relay_access_key = optional_var("LEAD_RELAY_ACCESS_KEY");
        if relay_access_key.is_none() {
            info!("LEAD_RELAY_ACCESS_KEY not set, form relay fallback disabled");
        }

        let timeout_secs = match env::var("LEAD_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().context("LEAD_TIMEOUT_SECS must be a whole number of seconds")?,
            Err(_) => DEFAULT_LEAD_TIMEOUT_SECS,
        };

        let input_mode = match env::var("CALCULATOR_INPUT_MODE") {
            Ok(raw) => raw
                .parse::<InputMode>()
                .map_err(anyhow::Error::msg)
                .context("CALCULATOR_INPUT_MODE must be 'lenient' or 'strict'")?,
            Err(_) => InputMode::default(),
        };

        let delay_ms = match env::var("CALCULATOR_DELAY_MS") {
            Ok(raw) => raw.parse::<u64>().context("CALCULATOR_DELAY_MS must be a number")?,
            Err(_) => 0,
        };

        let session_ttl = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse::<u64>().context("SESSION_TTL_SECS must be a whole number of seconds")?),
            Err(_) => DEFAULT_SESSION_TTL,
        };

        let max_sessions = match env::var("MAX_SESSIONS") {
            Ok(raw) => raw.parse::<usize>().context("MAX_SESSIONS must be a number")?,
            Err(_) => DEFAULT_MAX_SESSIONS,
        };

        Ok(AppConfig {
            port,
            lead: LeadConfig {
                primary_url,
                relay_url,
                relay_access_key,
                timeout: Duration::from_secs(timeout_secs),
            },
            input_mode,
            calculation_delay: Duration::from_millis(delay_ms),
            session_ttl,
            max_sessions,
            mail_user: optional_var("EMAIL_USER"),
            admin_email: optional_var("ADMIN_EMAIL"),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: DEFAULT_PORT,
            lead: LeadConfig {
                primary_url: format!("http://127.0.0.1:{}/api/contact/submit", DEFAULT_PORT),
                relay_url: DEFAULT_RELAY_URL.to_string(),
                relay_access_key: None,
                timeout: Duration::from_secs(DEFAULT_LEAD_TIMEOUT_SECS),
            },
            input_mode: InputMode::Lenient,
            calculation_delay: Duration::ZERO,
            session_ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
            mail_user: None,
            admin_email: None,
        }
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
