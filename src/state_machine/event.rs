//! Events that can occur in a session

use chrono::NaiveDateTime;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Raw text submitted by the user
    UserInput {
        text: String,
        /// Local wall-clock time the input arrived; date branches measure from here
        received_at: NaiveDateTime,
    },

    /// A scheduled follow-up is due. Carries its own text, so it never looks at
    /// the node the session is on when it fires.
    FollowUpElapsed { text: String },
}

impl Event {
    pub fn user_input(text: impl Into<String>, received_at: NaiveDateTime) -> Self {
        Event::UserInput {
            text: text.into(),
            received_at,
        }
    }
}
