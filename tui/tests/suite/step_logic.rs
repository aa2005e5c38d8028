use pretty_assertions::assert_eq;
use transcript_feedback::FeedbackState;
use transcript_protocol::ChatTurn;
use transcript_protocol::MessageContent;
use transcript_protocol::Role;
use transcript_tui::step::HoverState;
use transcript_tui::step::HoverVisibilityController;
use transcript_tui::step::is_truncated;
use transcript_tui::step::normalize_for_truncation;
use transcript_tui::step::strip_images;
use transcript_tui::step_container::ActionButton;
use transcript_tui::step_container::action_bar_buttons;

fn parse_turn(json: &str) -> ChatTurn {
    serde_json::from_str(json).expect("valid turn")
}

#[test]
fn code_fence_ending_counts_as_complete() {
    let turn = parse_turn(
        r#"{"role": "assistant", "content": "Here is some code:\n```python\nprint(1)```"}"#,
    );
    let normalized = normalize_for_truncation(&turn.content);
    assert!(!is_truncated(&normalized, false));
}

#[test]
fn mixed_content_is_checked_on_its_text_only() {
    let turn = parse_turn(
        r#"{"role": "assistant", "content": [
            {"type": "text", "text": "  See the chart"},
            {"type": "image_url", "image_url": {"url": "https://example.com/chart.png"}}
        ]}"#,
    );
    assert_eq!(strip_images(&turn.content), "  See the chart");
    assert_eq!(normalize_for_truncation(&turn.content), "See the chart");
    assert!(is_truncated(&normalize_for_truncation(&turn.content), false));
}

#[test]
fn malformed_content_renders_empty_and_is_not_truncated() {
    let turn = parse_turn(r#"{"role": "assistant", "content": {"unexpected": true}}"#);
    assert!(matches!(turn.content, MessageContent::Unsupported(_)));
    assert_eq!(strip_images(&turn.content), "");
    assert!(!is_truncated(&normalize_for_truncation(&turn.content), false));
}

#[test]
fn hover_and_rating_drive_the_visible_buttons() {
    let mut hover = HoverVisibilityController::default();
    hover.pointer_enter();
    hover.pointer_leave(FeedbackState::Helpful);
    assert_eq!(hover.state(), HoverState::Visible);
    assert!(hover.is_action_bar_visible(FeedbackState::Helpful, false));
    assert!(!hover.is_action_bar_visible(FeedbackState::Helpful, true));

    let turn = ChatTurn::new(Role::Assistant, "The answer is 4");
    let truncated = is_truncated(&normalize_for_truncation(&turn.content), false);
    assert_eq!(
        action_bar_buttons(truncated, FeedbackState::Helpful),
        vec![
            ActionButton::ContinueGeneration,
            ActionButton::Copy,
            ActionButton::Regenerate,
            ActionButton::Helpful,
            ActionButton::Delete,
        ]
    );
}
