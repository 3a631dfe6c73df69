//! Trait abstractions for runtime I/O
//!
//! The presentation sink is the only thing the runtime talks to; tests swap in a
//! recording mock.

use crate::render::{format_message, to_terminal};
use crate::state_machine::{CapturedField, OutputEvent, Speaker};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{broadcast, Mutex};

/// Consumer of output events
#[async_trait]
pub trait PresentationSink: Send + Sync {
    /// Show one message
    async fn present(&self, event: &OutputEvent) -> Result<(), String>;

    /// A form finished with these values
    async fn form_completed(&self, _node: &str, _fields: &[CapturedField]) -> Result<(), String> {
        Ok(())
    }
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: PresentationSink + ?Sized> PresentationSink for Arc<T> {
    async fn present(&self, event: &OutputEvent) -> Result<(), String> {
        (**self).present(event).await
    }

    async fn form_completed(&self, node: &str, fields: &[CapturedField]) -> Result<(), String> {
        (**self).form_completed(node, fields).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Notification fanned out by [`BroadcastSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Output(OutputEvent),
    FormCompleted {
        node: String,
        fields: Vec<CapturedField>,
    },
}

/// Fans events out to any number of subscribers (UI bridges, transcripts)
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<SinkEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SinkEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl PresentationSink for BroadcastSink {
    async fn present(&self, event: &OutputEvent) -> Result<(), String> {
        // No subscribers is not an error; the message is simply unseen
        let _ = self.tx.send(SinkEvent::Output(event.clone()));
        Ok(())
    }

    async fn form_completed(&self, node: &str, fields: &[CapturedField]) -> Result<(), String> {
        let _ = self.tx.send(SinkEvent::FormCompleted {
            node: node.to_string(),
            fields: fields.to_vec(),
        });
        Ok(())
    }
}

/// Writes formatted messages to stdout
pub struct TerminalSink {
    out: Mutex<tokio::io::Stdout>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresentationSink for TerminalSink {
    async fn present(&self, event: &OutputEvent) -> Result<(), String> {
        // The user's own line is already on screen
        if event.speaker == Speaker::User {
            return Ok(());
        }

        let mut text = to_terminal(&format_message(&event.text));
        for image in &event.images {
            text.push_str(&format!("[imagen] {image}\n"));
        }
        for button in &event.buttons {
            text.push_str(&format!("[{}] {}\n", button.text, button.url));
        }
        text.push('\n');

        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes())
            .await
            .map_err(|e| format!("Failed to write to stdout: {e}"))?;
        out.flush()
            .await
            .map_err(|e| format!("Failed to flush stdout: {e}"))
    }
}
