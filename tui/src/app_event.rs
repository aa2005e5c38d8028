//! Application-level events used to coordinate UI actions.
//!
//! `AppEvent` is the message bus between the step views and the top-level
//! `App` loop. A step never edits the transcript itself; it asks the app to do
//! so by sending one of these.

use crate::step_container::StepId;

/// The five things a step can ask its owner to do.
///
/// Delivered verbatim; the app decides what each one means for the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    Retry,
    Delete,
    ContinueGeneration,
    UserInput(String),
    Reverse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AppEvent {
    /// Addressed by id, not position: earlier queued actions may have moved
    /// the step by the time this one is handled.
    Step { id: StepId, action: StepAction },

    /// Put `text` on the system clipboard.
    CopyToClipboard(String),

    Exit,
}
