//! Session state types

use crate::config::EngineConfig;
use crate::flow::FlowGraph;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A value collected by a form step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedField {
    pub name: String,
    pub value: String,
}

/// An in-progress form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCapture {
    /// Node that owns the form
    pub node: String,
    /// Index of the field the next input fills
    pub step: usize,
    /// Values collected so far, in field order
    pub fields: Vec<CapturedField>,
}

impl FormCapture {
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            step: 0,
            fields: Vec::new(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// The engine's only mutable memory for one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_node: String,
    #[serde(default)]
    pub form_capture: Option<FormCapture>,
}

impl SessionState {
    /// Positioned on `node` with no form in progress
    pub fn at(node: impl Into<String>) -> Self {
        Self {
            current_node: node.into(),
            form_capture: None,
        }
    }

    /// Check if a form belonging to the current node is in progress
    pub fn is_capturing(&self) -> bool {
        self.form_capture
            .as_ref()
            .is_some_and(|c| c.node == self.current_node)
    }
}

/// Context for a session (immutable configuration)
#[derive(Debug, Clone)]
pub struct FlowContext {
    pub session_id: String,
    pub graph: Arc<FlowGraph>,
    pub config: Arc<EngineConfig>,
}

impl FlowContext {
    pub fn new(
        session_id: impl Into<String>,
        graph: Arc<FlowGraph>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            graph,
            config,
        }
    }

    pub fn root(&self) -> &str {
        &self.config.root
    }
}
