//! Helpful/unhelpful ratings for transcript steps.
//!
//! A [`FeedbackRecorder`] owns the rating of one rendered step. Rating a step
//! fans the value out to every prompt log attached to the turn, one
//! [`TelemetrySink::log`] call per log, and never waits on the sink.

mod sinks;

use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;
use transcript_protocol::ChatTurn;
use transcript_protocol::PromptLogEntry;
use transcript_protocol::SessionId;

pub use sinks::DevDataSink;
pub use sinks::RecordedEvent;
pub use sinks::RecordingSink;
pub use sinks::TracingSink;

/// Table that step ratings are written to.
pub const CHAT_TABLE: &str = "chat";

/// Destination for dev-data records.
///
/// Implementations must not block: anything that does I/O should queue the
/// record and report failures through its own logging.
pub trait TelemetrySink: Send + Sync {
    fn log(&self, table_name: &str, payload: Value);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedbackState {
    #[default]
    Unrated,
    Helpful,
    Unhelpful,
}

impl FeedbackState {
    pub fn from_rating(helpful: bool) -> Self {
        if helpful {
            Self::Helpful
        } else {
            Self::Unhelpful
        }
    }

    pub fn is_rated(self) -> bool {
        self != Self::Unrated
    }

    pub fn rating(self) -> Option<bool> {
        match self {
            Self::Unrated => None,
            Self::Helpful => Some(true),
            Self::Unhelpful => Some(false),
        }
    }
}

pub struct FeedbackRecorder {
    state: FeedbackState,
    sink: Arc<dyn TelemetrySink>,
}

impl std::fmt::Debug for FeedbackRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackRecorder")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl FeedbackRecorder {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            state: FeedbackState::Unrated,
            sink,
        }
    }

    pub fn state(&self) -> FeedbackState {
        self.state
    }

    /// Records `helpful` for `turn`. Repeated calls overwrite the state and
    /// emit a fresh batch each time.
    pub fn rate(&mut self, turn: &ChatTurn, helpful: bool, session_id: &SessionId) {
        self.state = FeedbackState::from_rating(helpful);
        tracing::debug!(
            helpful,
            prompt_logs = turn.prompt_logs.len(),
            "recording step feedback"
        );
        for prompt_log in &turn.prompt_logs {
            self.sink
                .log(CHAT_TABLE, feedback_payload(prompt_log, helpful, session_id));
        }
    }
}

/// `prompt_log` with `feedback` and `sessionId` added.
pub fn feedback_payload(
    prompt_log: &PromptLogEntry,
    helpful: bool,
    session_id: &SessionId,
) -> Value {
    let extra = Map::from_iter([
        ("feedback".to_string(), Value::Bool(helpful)),
        (
            "sessionId".to_string(),
            Value::String(session_id.to_string()),
        ),
    ]);
    Value::Object(prompt_log.merged_with(extra))
}
