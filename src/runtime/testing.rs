//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a terminal.

use super::traits::PresentationSink;
use crate::state_machine::{CapturedField, OutputEvent};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::Notify;

// ============================================================================
// Recording Sink
// ============================================================================

/// Sink that keeps everything it is given
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<OutputEvent>>,
    forms: Mutex<Vec<(String, Vec<CapturedField>)>>,
    /// Notified on every recorded event
    changed: Notify,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OutputEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.text).collect()
    }

    pub fn forms(&self) -> Vec<(String, Vec<CapturedField>)> {
        self.forms.lock().unwrap().clone()
    }

    /// Wait until at least `count` events were recorded
    pub async fn wait_for(&self, count: usize) -> Vec<OutputEvent> {
        loop {
            let changed = self.changed.notified();
            {
                let events = self.events.lock().unwrap();
                if events.len() >= count {
                    return events.clone();
                }
            }
            changed.await;
        }
    }
}

#[async_trait]
impl PresentationSink for RecordingSink {
    async fn present(&self, event: &OutputEvent) -> Result<(), String> {
        self.events.lock().unwrap().push(event.clone());
        self.changed.notify_waiters();
        Ok(())
    }

    async fn form_completed(&self, node: &str, fields: &[CapturedField]) -> Result<(), String> {
        self.forms
            .lock()
            .unwrap()
            .push((node.to_string(), fields.to_vec()));
        Ok(())
    }
}

// ============================================================================
// Failing Sink
// ============================================================================

/// Sink whose every call fails; the runtime must keep going
#[derive(Default)]
pub struct FailingSink {
    pub attempts: Mutex<usize>,
}

#[async_trait]
impl PresentationSink for FailingSink {
    async fn present(&self, _event: &OutputEvent) -> Result<(), String> {
        *self.attempts.lock().unwrap() += 1;
        Err("sink unavailable".to_string())
    }
}
