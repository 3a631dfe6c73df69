//! Flow document sources
//!
//! Loading is all-or-nothing: one unreadable or malformed document fails the
//! whole load and no graph is produced.

use super::graph::{FlowDocument, FlowGraph};
use crate::config::EngineConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors loading flow documents
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No flow documents configured")]
    NoDocuments,
    #[error("Failed to read flow document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse flow document {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Somewhere flow documents come from, in merge order
#[async_trait]
pub trait FlowSource: Send + Sync {
    async fn load_documents(&self) -> Result<Vec<FlowDocument>, LoadError>;
}

/// Parse one JSON document body
pub fn parse_document(origin: impl Into<String>, raw: &str) -> Result<FlowDocument, LoadError> {
    let origin = origin.into();
    let nodes: HashMap<_, _> = match serde_json::from_str(raw) {
        Ok(nodes) => nodes,
        Err(source) => return Err(LoadError::Parse { origin, source }),
    };
    Ok(FlowDocument { origin, nodes })
}

/// Load every document from `source` and merge them into a graph
pub async fn load_graph(
    source: &dyn FlowSource,
    config: &EngineConfig,
) -> Result<FlowGraph, LoadError> {
    let documents = source.load_documents().await?;
    if documents.is_empty() {
        return Err(LoadError::NoDocuments);
    }

    let count = documents.len();
    let graph = FlowGraph::build(documents, config);

    for dangling in graph.dangling_references(config) {
        tracing::warn!(
            from = %dangling.from,
            attribute = dangling.attribute,
            target = %dangling.target,
            "Flow references a node that does not exist"
        );
    }
    tracing::info!(documents = count, nodes = graph.len(), "Flow graph loaded");

    Ok(graph)
}

/// JSON files on disk
#[derive(Debug, Clone)]
pub struct FileFlowSource {
    paths: Vec<PathBuf>,
}

impl FileFlowSource {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl FlowSource for FileFlowSource {
    async fn load_documents(&self) -> Result<Vec<FlowDocument>, LoadError> {
        let mut documents = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let raw = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| LoadError::Read {
                    path: path.clone(),
                    source,
                })?;
            documents.push(parse_document(path.display().to_string(), &raw)?);
        }
        Ok(documents)
    }
}

/// In-memory JSON bodies
#[derive(Debug, Clone, Default)]
pub struct StaticFlowSource {
    documents: Vec<(String, String)>,
}

impl StaticFlowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, origin: impl Into<String>, raw: impl Into<String>) -> Self {
        self.documents.push((origin.into(), raw.into()));
        self
    }
}

#[async_trait]
impl FlowSource for StaticFlowSource {
    async fn load_documents(&self) -> Result<Vec<FlowDocument>, LoadError> {
        self.documents
            .iter()
            .map(|(origin, raw)| parse_document(origin.as_str(), raw))
            .collect()
    }
}
