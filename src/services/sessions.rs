// src/services/sessions.rs
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::calculator::{CalculatorConfig, CalculatorController};
use super::reference_data::ReferenceData;
use super::valuation::{RandomVariation, VariationSource};

pub type SharedController = Arc<Mutex<CalculatorController>>;

type VariationFactory = dyn Fn() -> Box<dyn VariationSource> + Send + Sync;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Entry {
    controller: SharedController,
    last_seen: Instant,
}

/// In-memory calculator sessions. Nothing outlives the process.
///
/// Sessions idle for longer than the TTL are dropped on the next `create` or
/// `get`. When the store is full the least recently used session goes.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Entry>>,
    reference: Arc<dyn ReferenceData>,
    variation: Box<VariationFactory>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(reference: Arc<dyn ReferenceData>) -> Self {
        Self::with_variation(reference, || {
            Box::new(RandomVariation::from_entropy()) as Box<dyn VariationSource>
        })
    }

    /// Every new session gets its variation source from `factory`.
    pub fn with_variation<F>(reference: Arc<dyn ReferenceData>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn VariationSource> + Send + Sync + 'static,
    {
        SessionStore {
            sessions: Mutex::new(HashMap::new()),
            reference,
            variation: Box::new(factory),
            ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Idle timeout and capacity. A capacity of 0 is treated as 1.
    pub fn with_limits(mut self, ttl: Duration, max_sessions: usize) -> Self {
        self.ttl = ttl;
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn reference(&self) -> &Arc<dyn ReferenceData> {
        &self.reference
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) >= self.ttl
    }

    pub async fn create(&self, config: CalculatorConfig) -> (Uuid, SharedController) {
        let id = Uuid::new_v4();
        let controller = Arc::new(Mutex::new(CalculatorController::new(
            config,
            Arc::clone(&self.reference),
            (self.variation)(),
        )));

        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        if sessions.len() < before {
            debug!("Evicted {} idle calculator session(s)", before - sessions.len());
        }
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    debug!("Calculator session store full, dropping {}", oldest);
                    sessions.remove(&oldest);
                }
                None => break,
            }
        }
        sessions.insert(
            id,
            Entry {
                controller: Arc::clone(&controller),
                last_seen: now,
            },
        );
        info!("Created calculator session {} ({})", id, config.initial_mode);
        (id, controller)
    }

    /// Looks up a live session and marks it as used.
    pub async fn get(&self, id: &Uuid) -> Option<SharedController> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(id) {
            Some(entry) if !self.is_expired(entry, now) => {
                entry.last_seen = now;
                Some(Arc::clone(&entry.controller))
            }
            Some(_) => {
                debug!("Calculator session {} expired", id);
                sessions.remove(id);
                None
            }
            None => None,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
