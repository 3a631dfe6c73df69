//! Merged flow graph

use super::node::{FlowNode, NodeKind, AUTO_TOKEN};
use crate::config::EngineConfig;
use std::collections::HashMap;

/// One parsed flow document: node key -> node, plus where it came from
#[derive(Debug, Clone, Default)]
pub struct FlowDocument {
    pub origin: String,
    pub nodes: HashMap<String, FlowNode>,
}

/// A node together with its resolved guard kind
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub node: FlowNode,
    pub kind: NodeKind,
}

/// A configured target key that does not exist in the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub from: String,
    pub attribute: &'static str,
    pub target: String,
}

/// Immutable node map built from all documents
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: HashMap<String, GraphNode>,
}

impl FlowGraph {
    /// Merge documents in order (later keys replace earlier ones) and resolve node kinds
    pub fn build(
        documents: impl IntoIterator<Item = FlowDocument>,
        config: &EngineConfig,
    ) -> Self {
        let merged = documents
            .into_iter()
            .fold(HashMap::new(), |mut acc, doc| {
                for (key, node) in doc.nodes {
                    if acc.insert(key.clone(), node).is_some() {
                        tracing::debug!(node = %key, origin = %doc.origin, "Node overridden by later document");
                    }
                }
                acc
            });

        let nodes = merged
            .into_iter()
            .map(|(key, node)| {
                let kind = resolve_kind(&key, &node, config);
                (key, GraphNode { node, kind })
            })
            .collect();

        Self { nodes }
    }

    pub fn get(&self, key: &str) -> Option<&GraphNode> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All references (node attributes and config) that point outside the graph
    pub fn dangling_references(&self, config: &EngineConfig) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        let mut check = |from: &str, attribute: &'static str, target: &str| {
            if !self.contains(target) {
                dangling.push(DanglingReference {
                    from: from.to_string(),
                    attribute,
                    target: target.to_string(),
                });
            }
        };

        for (key, entry) in &self.nodes {
            for (attribute, target) in entry.node.references() {
                check(key, attribute, target);
            }
            match &entry.kind {
                NodeKind::DateBranch { late_target } => {
                    check(key, "dateBranches.nodes", late_target);
                    check(key, "dateBranches.earlyTarget", &config.date_branches.early_target);
                }
                NodeKind::FormStep { form } if entry.node.form.is_none() => {
                    check(key, "forms.completionTarget", &form.completion_target);
                    if let Some(back) = &form.back_target {
                        check(key, "forms.backTarget", back);
                    }
                }
                _ => {}
            }
        }

        dangling.sort_by(|a, b| (&a.from, &a.target).cmp(&(&b.from, &b.target)));
        dangling
    }
}

fn resolve_kind(key: &str, node: &FlowNode, config: &EngineConfig) -> NodeKind {
    if let Some(form) = node.form.as_ref().or_else(|| config.forms.get(key)) {
        return NodeKind::FormStep { form: form.clone() };
    }
    if let Some(late_target) = config.date_branches.nodes.get(key) {
        return NodeKind::DateBranch {
            late_target: late_target.clone(),
        };
    }
    if let Some(target) = node.option_target(AUTO_TOKEN) {
        return NodeKind::AutoTransition {
            target: target.to_string(),
        };
    }
    if let Some(target) = &node.dynamic_input {
        return NodeKind::DynamicClassifier {
            target: target.clone(),
        };
    }
    NodeKind::Standard
}
