//! Scripted in-memory transport for unit tests

use super::ProbeTransport;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// What the fake transport does for one call
#[derive(Debug, Clone, Copy)]
pub(crate) enum Outcome {
    /// Reply immediately, reporting this many milliseconds
    Reply(u64),
    /// Fail with a connection error
    Refuse,
    /// Fail with a transport timeout
    TimedOut,
    /// Never answer within any reasonable timeout
    Hang,
}

/// Transport that replays per-endpoint scripts, then falls back to a default
pub(crate) struct FakeTransport {
    scripts: Mutex<HashMap<String, VecDeque<Outcome>>>,
    defaults: HashMap<String, Outcome>,
    fallback: Outcome,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub(crate) fn new(fallback: Outcome) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            defaults: HashMap::new(),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Outcomes consumed in order for `endpoint`
    pub(crate) fn script(self, endpoint: &str, outcomes: Vec<Outcome>) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.insert(endpoint.to_string(), outcomes.into());
        }
        self
    }

    /// Outcome for every call to `endpoint` once its script is exhausted
    pub(crate) fn always(mut self, endpoint: &str, outcome: Outcome) -> Self {
        self.defaults.insert(endpoint.to_string(), outcome);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn next_outcome(&self, endpoint: &str) -> Outcome {
        let scripted = self.scripts
            .lock()
            .ok()
            .and_then(|mut scripts| scripts.get_mut(endpoint).and_then(VecDeque::pop_front));

        scripted
            .or_else(|| self.defaults.get(endpoint).copied())
            .unwrap_or(self.fallback)
    }
}

#[async_trait]
impl ProbeTransport for FakeTransport {
    async fn send(&self, endpoint: &str, timeout: Duration) -> Result<Duration> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(endpoint.to_string());
        }

        match self.next_outcome(endpoint) {
            Outcome::Reply(ms) => Ok(Duration::from_millis(ms)),
            Outcome::Refuse => Err(AppError::network(format!("connection refused: {}", endpoint))),
            Outcome::TimedOut => Err(AppError::timeout(format!("{}ms elapsed", timeout.as_millis()))),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Duration::from_secs(3600))
            }
        }
    }
}
