//! Flow navigation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! runtime feeds events in and executes the effects that come out.

pub mod date;
mod effect;
pub mod event;
pub mod guard;
pub mod input;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, OutputEvent, Speaker};
pub use event::Event;
pub use guard::{GuardFailure, Resolution};
pub use input::NormalizedInput;
pub use state::{CapturedField, FlowContext, FormCapture, SessionState};
pub use transition::{initialize, transition, TransitionError, TransitionResult};
