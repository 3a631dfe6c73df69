//! Runtime for executing sessions
//!
//! A [`FlowEngine`] owns the loaded graph and configuration. Each session it
//! starts runs as its own tokio task with its own [`SessionState`], so sessions
//! never share mutable state.
//!
//! [`SessionState`]: crate::state_machine::SessionState

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::FlowRuntime;
pub use traits::*;

use crate::config::EngineConfig;
use crate::flow::{load_graph, FlowGraph, FlowSource, LoadError};
use crate::state_machine::{Event, FlowContext, OutputEvent, TransitionError};
use chrono::NaiveDateTime;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Errors that keep a session from starting
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Config(#[from] TransitionError),
}

/// Errors talking to a running session
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session {0} is no longer running")]
    Closed(String),
}

/// Loaded graph plus configuration, shared by every session
#[derive(Debug, Clone)]
pub struct FlowEngine {
    graph: Arc<FlowGraph>,
    config: Arc<EngineConfig>,
}

impl FlowEngine {
    /// Fails if the root node is missing: no session could ever start
    pub fn new(graph: FlowGraph, config: EngineConfig) -> Result<Self, TransitionError> {
        if !graph.contains(&config.root) {
            return Err(TransitionError::MissingRoot(config.root.clone()));
        }
        Ok(Self {
            graph: Arc::new(graph),
            config: Arc::new(config),
        })
    }

    pub async fn load(source: &dyn FlowSource, config: EngineConfig) -> Result<Self, StartupError> {
        let graph = load_graph(source, &config).await?;
        Ok(Self::new(graph, config)?)
    }

    /// Spawn a session; the root's content is presented right away
    pub fn start_session<K>(&self, sink: K) -> SessionHandle
    where
        K: PresentationSink + 'static,
    {
        let session_id = uuid::Uuid::new_v4().to_string();
        let context = FlowContext::new(&session_id, self.graph.clone(), self.config.clone());
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let runtime = FlowRuntime::new(context, Arc::new(sink), event_rx);
        let task = tokio::spawn(runtime.run());

        SessionHandle {
            session_id,
            event_tx,
            task,
        }
    }
}

/// Load the graph and start one session on it.
///
/// A load failure is shown to the user as a single apology message through `sink`.
pub async fn launch<K>(
    source: &dyn FlowSource,
    config: EngineConfig,
    sink: K,
) -> Result<SessionHandle, StartupError>
where
    K: PresentationSink + 'static,
{
    let apology = config.messages.load_failure.clone();
    match FlowEngine::load(source, config).await {
        Ok(engine) => Ok(engine.start_session(sink)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load conversation flow");
            if let StartupError::Load(_) = e {
                if let Err(sink_err) = sink.present(&OutputEvent::bot(apology)).await {
                    tracing::error!(error = %sink_err, "Failed to present load failure");
                }
            }
            Err(e)
        }
    }
}

/// Handle to interact with a running session
#[derive(Debug)]
pub struct SessionHandle {
    session_id: String,
    event_tx: mpsc::Sender<Event>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Submit user text stamped with the local wall-clock time
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.submit_at(text, chrono::Local::now().naive_local()).await
    }

    pub async fn submit_at(
        &self,
        text: impl Into<String>,
        received_at: NaiveDateTime,
    ) -> Result<(), SessionError> {
        self.event_tx
            .send(Event::user_input(text, received_at))
            .await
            .map_err(|_| SessionError::Closed(self.session_id.clone()))
    }

    /// Stop accepting input and wait for the session to drain, including
    /// follow-ups that are still scheduled
    pub async fn shutdown(self) {
        let Self {
            session_id,
            event_tx,
            task,
        } = self;
        drop(event_tx);
        if let Err(e) = task.await {
            tracing::error!(session_id = %session_id, error = %e, "Session task failed");
        }
    }
}
