//! Effects produced by state transitions

use super::state::CapturedField;
use crate::flow::{Button, FlowNode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Bot,
    User,
}

/// One message for the presentation sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEvent {
    pub speaker: Speaker,
    pub text: String,
    pub images: Vec<String>,
    pub buttons: Vec<Button>,
}

impl OutputEvent {
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
            images: Vec::new(),
            buttons: Vec::new(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            images: Vec::new(),
            buttons: Vec::new(),
        }
    }

    /// A node's message with its images and buttons
    pub fn node_content(node: &FlowNode) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: node.message.clone(),
            images: node.images.clone(),
            buttons: node.buttons.clone(),
        }
    }
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand a message to the presentation sink
    Emit { event: OutputEvent },

    /// Emit `text` as a bot message after `delay`. Fire-and-forget.
    ScheduleFollowUp { delay: Duration, text: String },

    /// A form finished; `fields` are in field order
    FormCompleted {
        node: String,
        fields: Vec<CapturedField>,
    },
}

impl Effect {
    pub fn bot_message(text: impl Into<String>) -> Self {
        Effect::Emit {
            event: OutputEvent::bot(text),
        }
    }

    pub fn user_echo(text: impl Into<String>) -> Self {
        Effect::Emit {
            event: OutputEvent::user(text),
        }
    }

    pub fn node_content(node: &FlowNode) -> Self {
        Effect::Emit {
            event: OutputEvent::node_content(node),
        }
    }

    /// The emitted event, if this is an emit effect
    pub fn as_output(&self) -> Option<&OutputEvent> {
        match self {
            Effect::Emit { event } => Some(event),
            _ => None,
        }
    }
}
