use transcript_feedback::FeedbackState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Hidden,
    Visible,
}

/// Decides whether a step's action bar is shown.
///
/// The bar appears while the pointer is over the step and stays up after the
/// pointer leaves once the step has been rated, so the rating remains
/// visible. Nothing is shown while a response is being generated.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverVisibilityController {
    state: HoverState,
}

impl HoverVisibilityController {
    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn pointer_enter(&mut self) {
        self.state = HoverState::Visible;
    }

    pub fn pointer_leave(&mut self, feedback: FeedbackState) {
        self.state = if feedback.is_rated() {
            HoverState::Visible
        } else {
            HoverState::Hidden
        };
    }

    pub fn is_action_bar_visible(&self, feedback: FeedbackState, generation_active: bool) -> bool {
        !generation_active && (self.state == HoverState::Visible || feedback.is_rated())
    }
}
