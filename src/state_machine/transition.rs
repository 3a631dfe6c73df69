//! Pure state transition function
//!
//! Given the session state, the immutable flow context, and one event, decide the
//! next state and the effects to run. No I/O happens here; timers and the sink
//! live in the runtime.

use super::guard::{self, Resolution};
use super::input::NormalizedInput;
use super::{Effect, Event, FlowContext, FormCapture, SessionState};
use crate::flow::{GraphNode, NodeKind};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// Just the presentation events, in order
    pub fn outputs(&self) -> impl Iterator<Item = &super::OutputEvent> {
        self.effects.iter().filter_map(Effect::as_output)
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The root is the fallback for every other failure, so nothing can recover this
    #[error("Root node '{0}' is not defined in the flow graph")]
    MissingRoot(String),
}

/// Start a session on the root node
pub fn initialize(context: &FlowContext) -> Result<TransitionResult, TransitionError> {
    let root = context.root();
    let entry = context
        .graph
        .get(root)
        .ok_or_else(|| TransitionError::MissingRoot(root.to_string()))?;
    // Session start presents the root content and nothing else
    Ok(arrive(context, root, entry, Vec::new()))
}

/// Pure transition function
pub fn transition(
    state: &SessionState,
    context: &FlowContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::FollowUpElapsed { text } => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::bot_message(text)))
        }
        Event::UserInput { text, received_at } => match NormalizedInput::new(&text) {
            None => Ok(TransitionResult::new(state.clone())),
            Some(input) => handle_input(state, context, &input, received_at),
        },
    }
}

fn handle_input(
    state: &SessionState,
    context: &FlowContext,
    input: &NormalizedInput,
    received_at: NaiveDateTime,
) -> Result<TransitionResult, TransitionError> {
    let config = context.config.as_ref();
    let mut effects = vec![Effect::user_echo(&input.literal)];

    let current = state.current_node.as_str();
    let Some(entry) = context.graph.get(current) else {
        return recover_to_root(context, current, effects);
    };

    let active_capture = state
        .is_capturing()
        .then(|| state.form_capture.clone())
        .flatten();
    if active_capture.is_none() && state.form_capture.is_some() {
        tracing::warn!(node = %current, "Discarding form capture that belongs to another node");
    }

    let resolution = match &entry.kind {
        NodeKind::FormStep { form } => {
            let capture = active_capture
                .clone()
                .unwrap_or_else(|| FormCapture::new(current));
            guard::resolve_form(&capture, form, input, config)
        }
        NodeKind::DateBranch { late_target } => {
            guard::resolve_date(late_target, input, received_at, config)
        }
        NodeKind::AutoTransition { target } => guard::resolve_auto(target),
        NodeKind::DynamicClassifier { target } => {
            guard::resolve_dynamic(target, &entry.node, input, config)
        }
        NodeKind::Standard => guard::resolve_options(&entry.node, input, config),
    };

    tracing::debug!(
        session_id = %context.session_id,
        node = %current,
        kind = entry.kind.name(),
        ?resolution,
        "Input resolved"
    );

    match resolution {
        Resolution::Transition { target, preface } => {
            effects.extend(preface.map(Effect::bot_message));
            land(context, &target, effects)
        }
        Resolution::Retry(failure) => {
            effects.push(Effect::bot_message(failure.message(&config.messages)));
            let new_state = SessionState {
                current_node: current.to_string(),
                form_capture: active_capture,
            };
            Ok(TransitionResult::new(new_state).with_effects(effects))
        }
        Resolution::FormProgress { capture, prompt } => {
            effects.extend(prompt.map(Effect::bot_message));
            let new_state = SessionState {
                current_node: current.to_string(),
                form_capture: Some(capture),
            };
            Ok(TransitionResult::new(new_state).with_effects(effects))
        }
        Resolution::FormComplete {
            message,
            target,
            fields,
        } => {
            tracing::info!(
                session_id = %context.session_id,
                node = %current,
                fields = fields.len(),
                "Form completed"
            );
            effects.push(Effect::bot_message(message));
            effects.push(Effect::FormCompleted {
                node: current.to_string(),
                fields,
            });
            land(context, &target, effects)
        }
    }
}

/// Move to `target`, or back to the root if the graph does not have it
fn land(
    context: &FlowContext,
    target: &str,
    effects: Vec<Effect>,
) -> Result<TransitionResult, TransitionError> {
    match context.graph.get(target) {
        Some(entry) => Ok(enter(context, target, entry, effects)),
        None => recover_to_root(context, target, effects),
    }
}

fn recover_to_root(
    context: &FlowContext,
    missing: &str,
    mut effects: Vec<Effect>,
) -> Result<TransitionResult, TransitionError> {
    tracing::warn!(
        session_id = %context.session_id,
        target = %missing,
        "Flow not found, returning to root"
    );
    effects.push(Effect::bot_message(&context.config.messages.flow_not_found));

    let root = context.root();
    let entry = context
        .graph
        .get(root)
        .ok_or_else(|| TransitionError::MissingRoot(root.to_string()))?;
    Ok(enter(context, root, entry, effects))
}

/// Navigate onto a node: its content, then the first form prompt if it has one
fn enter(
    context: &FlowContext,
    key: &str,
    entry: &GraphNode,
    effects: Vec<Effect>,
) -> TransitionResult {
    let mut result = arrive(context, key, entry, effects);
    if let NodeKind::FormStep { form } = &entry.kind {
        let prompt = form.fields.first().and_then(|f| f.prompt.clone());
        result.effects.extend(prompt.map(Effect::bot_message));
    }
    result
}

/// Emit a node's content and set up the state and timers it needs
fn arrive(
    context: &FlowContext,
    key: &str,
    entry: &GraphNode,
    mut effects: Vec<Effect>,
) -> TransitionResult {
    effects.push(Effect::node_content(&entry.node));

    let form_capture = match &entry.kind {
        NodeKind::FormStep { .. } => Some(FormCapture::new(key)),
        _ => None,
    };

    if let Some(text) = &entry.node.follow_up {
        effects.push(Effect::ScheduleFollowUp {
            delay: context.config.follow_up_delay(),
            text: text.clone(),
        });
    }

    TransitionResult::new(SessionState {
        current_node: key.to_string(),
        form_capture,
    })
    .with_effects(effects)
}
