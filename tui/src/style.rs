use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Span;

use transcript_feedback::FeedbackState;

pub fn user_message_style() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn subtext_style() -> Style {
    Style::default().dim()
}

pub fn action_label_style() -> Style {
    Style::default().dim()
}

pub fn selected_step_style() -> Style {
    Style::default().bold()
}

/// Style for the rating buttons. The chosen rating is highlighted; the other
/// one is hidden by the layout, not styled here.
pub fn rating_style(feedback: FeedbackState, helpful_button: bool) -> Style {
    match (feedback, helpful_button) {
        (FeedbackState::Helpful, true) => Style::default().fg(Color::Green).bold(),
        (FeedbackState::Unhelpful, false) => Style::default().fg(Color::Red).bold(),
        _ => action_label_style(),
    }
}

pub fn user_prefix() -> Span<'static> {
    "› ".bold().dim()
}

pub fn agent_prefix() -> Span<'static> {
    "• ".dim()
}
