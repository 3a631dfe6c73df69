//! Session runtime executor

use super::traits::PresentationSink;
use crate::state_machine::{
    initialize, transition, Effect, Event, FlowContext, SessionState, TransitionResult,
};
use std::sync::Arc;
use tokio::sync::mpsc;

const FOLLOW_UP_CHANNEL_CAPACITY: usize = 32;

/// Drives one session: applies transitions and executes their effects
pub struct FlowRuntime<K>
where
    K: PresentationSink + 'static,
{
    context: FlowContext,
    state: SessionState,
    sink: Arc<K>,
    /// User input; closed once every handle is gone
    event_rx: mpsc::Receiver<Event>,
    /// Fired follow-ups. The runtime keeps its own sender so timers can always
    /// deliver, even after input has closed.
    follow_up_tx: mpsc::Sender<Event>,
    follow_up_rx: mpsc::Receiver<Event>,
    /// Timers spawned but not yet delivered
    pending_follow_ups: usize,
}

impl<K> FlowRuntime<K>
where
    K: PresentationSink + 'static,
{
    pub fn new(context: FlowContext, sink: Arc<K>, event_rx: mpsc::Receiver<Event>) -> Self {
        let state = SessionState::at(context.root());
        let (follow_up_tx, follow_up_rx) = mpsc::channel(FOLLOW_UP_CHANNEL_CAPACITY);
        Self {
            context,
            state,
            sink,
            event_rx,
            follow_up_tx,
            follow_up_rx,
            pending_follow_ups: 0,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting session runtime");

        match initialize(&self.context) {
            Ok(result) => self.apply(result).await,
            Err(e) => {
                tracing::error!(session_id = %self.context.session_id, error = %e, "Cannot start session");
                return;
            }
        }

        // Process events one at a time - no recursion. The session ends when
        // input is closed and no follow-up is still waiting to fire.
        let mut input_open = true;
        while input_open || self.pending_follow_ups > 0 {
            tokio::select! {
                event = self.event_rx.recv(), if input_open => match event {
                    Some(event) => self.process_event(event).await,
                    None => {
                        tracing::debug!(
                            session_id = %self.context.session_id,
                            pending_follow_ups = self.pending_follow_ups,
                            "Input closed"
                        );
                        input_open = false;
                    }
                },
                Some(event) = self.follow_up_rx.recv() => {
                    self.pending_follow_ups -= 1;
                    self.process_event(event).await;
                }
                else => break,
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Session runtime stopped");
    }

    async fn process_event(&mut self, event: Event) {
        match transition(&self.state, &self.context, event) {
            Ok(result) => self.apply(result).await,
            Err(e) => {
                tracing::error!(session_id = %self.context.session_id, error = %e, "Transition failed");
            }
        }
    }

    async fn apply(&mut self, result: TransitionResult) {
        if result.new_state.current_node != self.state.current_node {
            tracing::debug!(
                session_id = %self.context.session_id,
                from = %self.state.current_node,
                to = %result.new_state.current_node,
                "Node changed"
            );
        }
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect).await;
        }
    }

    /// Execute an effect. Sink failures are logged and never stop the session.
    async fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Emit { event } => {
                if let Err(e) = self.sink.present(&event).await {
                    tracing::error!(session_id = %self.context.session_id, error = %e, "Failed to present message");
                }
            }

            Effect::ScheduleFollowUp { delay, text } => {
                // Never cancelled, and delivered whatever node the session is on by then
                let event_tx = self.follow_up_tx.clone();
                self.pending_follow_ups += 1;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = event_tx.send(Event::FollowUpElapsed { text }).await;
                });
            }

            Effect::FormCompleted { node, fields } => {
                if let Err(e) = self.sink.form_completed(&node, &fields).await {
                    tracing::error!(session_id = %self.context.session_id, node = %node, error = %e, "Failed to deliver form");
                }
            }
        }
    }
}
