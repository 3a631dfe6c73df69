//! Flow node types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Option token that makes any non-empty input advance to its target
pub const AUTO_TOKEN: &str = "__AUTO__";

/// A link button shown under a bot message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub url: String,
}

/// One field collected by a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    /// Shown when the form reaches this field. The node message already asks for
    /// the first field, so a prompt there is optional extra text.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Multi-step capture attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub fields: Vec<FormField>,
    /// May reference captured values as `{field_name}`
    #[serde(default)]
    pub completion_message: Option<String>,
    pub completion_target: String,
    /// Where the back token leads; the root when unset
    #[serde(default)]
    pub back_target: Option<String>,
}

/// A node as written in a flow document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub message: String,
    #[serde(default)]
    pub options: Option<HashMap<String, String>>,
    #[serde(default)]
    pub dynamic_input: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub buttons: Vec<Button>,
    #[serde(default)]
    pub follow_up: Option<String>,
    #[serde(default)]
    pub form: Option<FormDefinition>,
}

impl FlowNode {
    /// Case-insensitive option lookup against an already upper-cased token
    pub fn option_target(&self, folded: &str) -> Option<&str> {
        self.options.as_ref()?.iter().find_map(|(token, target)| {
            (token.to_uppercase() == folded).then_some(target.as_str())
        })
    }

    /// Every node key this node points at, with the attribute it came from
    pub fn references(&self) -> Vec<(&'static str, &str)> {
        let mut refs = Vec::new();
        if let Some(options) = &self.options {
            refs.extend(options.values().map(|t| ("options", t.as_str())));
        }
        if let Some(target) = &self.dynamic_input {
            refs.push(("dynamicInput", target.as_str()));
        }
        if let Some(form) = &self.form {
            refs.push(("form.completionTarget", form.completion_target.as_str()));
            if let Some(back) = &form.back_target {
                refs.push(("form.backTarget", back.as_str()));
            }
        }
        refs
    }
}

/// Guard kind of a node, resolved once when the graph is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Plain option lookup
    Standard,
    /// `__AUTO__` option: any input advances
    AutoTransition { target: String },
    /// Numeric identifiers go to `target`, anything else falls back to options
    DynamicClassifier { target: String },
    /// Date-collection point with its own late target
    DateBranch { late_target: String },
    FormStep { form: FormDefinition },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Standard => "standard",
            NodeKind::AutoTransition { .. } => "auto_transition",
            NodeKind::DynamicClassifier { .. } => "dynamic_classifier",
            NodeKind::DateBranch { .. } => "date_branch",
            NodeKind::FormStep { .. } => "form_step",
        }
    }
}
