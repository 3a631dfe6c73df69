//! Flow definitions: node documents, the merged graph, and where documents come from

mod graph;
mod loader;
mod node;

pub use graph::{DanglingReference, FlowDocument, FlowGraph, GraphNode};
pub use loader::{load_graph, parse_document, FileFlowSource, FlowSource, LoadError, StaticFlowSource};
pub use node::{Button, FlowNode, FormField, FormDefinition, NodeKind, AUTO_TOKEN};
