//! Flow Navigator - declarative conversational flows
//!
//! A chat front-end driven by externally supplied JSON node graphs. The core is a
//! pure navigation state machine; a tokio runtime executes its effects and
//! schedules follow-up messages.

pub mod config;
pub mod flow;
pub mod render;
pub mod runtime;
pub mod state_machine;

pub use config::{EngineConfig, Settings};
pub use flow::{FileFlowSource, FlowGraph, FlowSource, LoadError, StaticFlowSource};
pub use runtime::{launch, FlowEngine, PresentationSink, SessionHandle, StartupError};
pub use state_machine::{Effect, Event, OutputEvent, SessionState, Speaker};
