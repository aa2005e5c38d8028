//! One transcript step: the message body plus its hover action bar.
//!
//! The view owns the presentation state of a single step (hover, rating,
//! truncation flag) but never the transcript. Anything that changes the
//! transcript is sent to the app as an [`AppEvent::Step`].

use std::cell::RefCell;
use std::sync::Arc;

use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use transcript_config::UiConfig;
use transcript_feedback::FeedbackRecorder;
use transcript_feedback::FeedbackState;
use transcript_feedback::TelemetrySink;
use transcript_protocol::ChatTurn;
use transcript_protocol::SessionId;
use unicode_width::UnicodeWidthStr;

use crate::app_event::AppEvent;
use crate::app_event::StepAction;
use crate::app_event_sender::AppEventSender;
use crate::markdown_render::render_markdown_lines;
use crate::markdown_render::render_raw_lines;
use crate::render::renderable::Renderable;
use crate::step::HoverState;
use crate::step::HoverVisibilityController;
use crate::step::TruncationTracker;
use crate::step::normalize_for_truncation;
use crate::step::strip_images;
use crate::style::action_label_style;
use crate::style::agent_prefix;
use crate::style::rating_style;
use crate::style::subtext_style;
use crate::style::user_message_style;
use crate::style::user_prefix;

const PREFIX_COLS: u16 = 2;
const BUTTON_GAP: u16 = 2;
const COLLAPSED_PLACEHOLDER: &str = "…";

/// Shared state every step needs, handed in by the app on each change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepContext {
    /// A response is currently being generated.
    pub active: bool,
    pub session_id: SessionId,
    pub ui: UiConfig,
}

/// Per-step inputs owned by the transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepProps {
    pub index: usize,
    pub is_first: bool,
    pub is_last: bool,
    /// `false` hides the message body.
    pub open: bool,
    /// Left-aligned note in the action row.
    pub subtext: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionButton {
    ContinueGeneration,
    Copy,
    Regenerate,
    Helpful,
    Unhelpful,
    Delete,
}

impl ActionButton {
    pub fn label(self) -> &'static str {
        match self {
            ActionButton::ContinueGeneration => "Continue generation",
            ActionButton::Copy => "Copy",
            ActionButton::Regenerate => "Regenerate",
            ActionButton::Helpful => "Helpful",
            ActionButton::Unhelpful => "Unhelpful",
            ActionButton::Delete => "Delete",
        }
    }
}

/// Buttons offered for a step, left to right.
///
/// "Continue generation" only appears for truncated responses. Choosing one
/// rating hides the opposite one.
pub fn action_bar_buttons(truncated: bool, feedback: FeedbackState) -> Vec<ActionButton> {
    let mut buttons = Vec::with_capacity(6);
    if truncated {
        buttons.push(ActionButton::ContinueGeneration);
    }
    buttons.push(ActionButton::Copy);
    buttons.push(ActionButton::Regenerate);
    if feedback != FeedbackState::Unhelpful {
        buttons.push(ActionButton::Helpful);
    }
    if feedback != FeedbackState::Helpful {
        buttons.push(ActionButton::Unhelpful);
    }
    buttons.push(ActionButton::Delete);
    buttons
}

/// Right-aligns `buttons` inside `row`. Buttons that do not fit are dropped
/// from the left.
pub fn action_bar_layout(row: Rect, buttons: &[ActionButton]) -> Vec<(ActionButton, Rect)> {
    let mut placed = Vec::with_capacity(buttons.len());
    let mut right = row.right();
    for button in buttons.iter().rev() {
        let width = u16::try_from(button.label().width()).unwrap_or(u16::MAX);
        let gap = if placed.is_empty() { 0 } else { BUTTON_GAP };
        let Some(x) = right
            .checked_sub(gap)
            .and_then(|r| r.checked_sub(width))
            .filter(|x| *x >= row.x)
        else {
            break;
        };
        placed.push((*button, Rect::new(x, row.y, width, 1)));
        right = x;
    }
    placed.reverse();
    placed
}

/// Identity of a step for the lifetime of the app, independent of its
/// position in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepId(pub usize);

#[derive(Debug, Default)]
struct StepLayout {
    area: Rect,
    buttons: Vec<(ActionButton, Rect)>,
}

#[derive(Debug)]
pub struct StepContainerView {
    id: StepId,
    turn: ChatTurn,
    props: StepProps,
    context: StepContext,
    display_text: String,
    hover: HoverVisibilityController,
    pointer_inside: bool,
    feedback: FeedbackRecorder,
    truncation: TruncationTracker,
    app_event_tx: AppEventSender,
    /// Geometry of the last render, used for mouse hit-testing.
    layout: RefCell<StepLayout>,
}

impl StepContainerView {
    pub(crate) fn new(
        id: StepId,
        turn: ChatTurn,
        props: StepProps,
        context: &StepContext,
        sink: Arc<dyn TelemetrySink>,
        app_event_tx: AppEventSender,
    ) -> Self {
        let mut view = Self {
            id,
            display_text: strip_images(&turn.content),
            turn,
            props,
            context: context.clone(),
            hover: HoverVisibilityController::default(),
            pointer_inside: false,
            feedback: FeedbackRecorder::new(sink),
            truncation: TruncationTracker::default(),
            app_event_tx,
            layout: RefCell::new(StepLayout::default()),
        };
        view.sync(context);
        view
    }

    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn turn(&self) -> &ChatTurn {
        &self.turn
    }

    pub fn props(&self) -> &StepProps {
        &self.props
    }

    pub fn set_props(&mut self, props: StepProps) {
        self.props = props;
    }

    pub fn set_open(&mut self, open: bool) {
        self.props.open = open;
    }

    /// Replaces the message, e.g. while a response streams in.
    pub fn set_turn(&mut self, turn: ChatTurn) {
        self.display_text = strip_images(&turn.content);
        self.turn = turn;
        self.refresh_truncation();
    }

    /// Applies a new shared context and recomputes derived state.
    pub fn sync(&mut self, context: &StepContext) {
        if self.context != *context {
            self.context = context.clone();
        }
        self.refresh_truncation();
    }

    fn refresh_truncation(&mut self) {
        let normalized = normalize_for_truncation(&self.turn.content);
        self.truncation.update(&normalized, self.context.active);
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_truncated()
    }

    pub fn hover_state(&self) -> HoverState {
        self.hover.state()
    }

    pub fn feedback_state(&self) -> FeedbackState {
        self.feedback.state()
    }

    pub fn is_action_bar_visible(&self) -> bool {
        self.hover
            .is_action_bar_visible(self.feedback.state(), self.context.active)
    }

    /// Text shown on screen and copied by "Copy".
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn available_buttons(&self) -> Vec<ActionButton> {
        action_bar_buttons(self.truncation.is_truncated(), self.feedback.state())
    }

    /// Whether `position` fell inside this step when it was last rendered.
    pub fn contains(&self, position: Position) -> bool {
        self.layout.borrow().area.contains(position)
    }

    /// Forgets the last render's geometry, for steps scrolled off screen.
    pub(crate) fn clear_layout(&self) {
        *self.layout.borrow_mut() = StepLayout::default();
    }

    pub fn pointer_enter(&mut self) {
        self.pointer_inside = true;
        self.hover.pointer_enter();
    }

    pub fn pointer_leave(&mut self) {
        self.pointer_inside = false;
        self.hover.pointer_leave(self.feedback.state());
    }

    /// Routes a mouse event using the geometry of the last render. Returns
    /// `true` when the view changed and needs a redraw.
    pub fn handle_mouse(&mut self, event: MouseEvent) -> bool {
        let position = Position::new(event.column, event.row);
        let inside = self.contains(position);
        let mut changed = false;
        if inside != self.pointer_inside {
            if inside {
                self.pointer_enter();
            } else {
                self.pointer_leave();
            }
            changed = true;
        }
        if let MouseEventKind::Down(MouseButton::Left) = event.kind {
            let clicked = self
                .layout
                .borrow()
                .buttons
                .iter()
                .find(|(_, rect)| rect.contains(position))
                .map(|(button, _)| *button);
            if let Some(button) = clicked {
                self.activate(button);
                changed = true;
            }
        }
        changed
    }

    /// Triggers `button` as if it was clicked. Whether the button is on offer
    /// is up to the caller.
    pub fn activate(&mut self, button: ActionButton) {
        tracing::debug!(id = self.id.0, ?button, "step button activated");
        match button {
            ActionButton::ContinueGeneration => self.send_action(StepAction::ContinueGeneration),
            ActionButton::Copy => self
                .app_event_tx
                .send(AppEvent::CopyToClipboard(self.display_text.clone())),
            ActionButton::Regenerate => self.send_action(StepAction::Retry),
            ActionButton::Helpful => self.rate(true),
            ActionButton::Unhelpful => self.rate(false),
            ActionButton::Delete => self.send_action(StepAction::Delete),
        }
    }

    pub fn reverse(&self) {
        self.send_action(StepAction::Reverse);
    }

    pub fn submit_user_input(&self, input: String) {
        self.send_action(StepAction::UserInput(input));
    }

    fn rate(&mut self, helpful: bool) {
        self.feedback
            .rate(&self.turn, helpful, &self.context.session_id);
    }

    fn send_action(&self, action: StepAction) {
        self.app_event_tx.send(AppEvent::Step {
            id: self.id,
            action,
        });
    }

    fn body_lines(&self, width: u16) -> Vec<Line<'static>> {
        let is_user = self.turn.is_user_input();
        let prefix = if is_user { user_prefix() } else { agent_prefix() };
        if !self.props.open {
            return vec![Line::from(vec![prefix, COLLAPSED_PLACEHOLDER.dim()])];
        }

        let wrap_width = usize::from(width.saturating_sub(PREFIX_COLS + 1).max(1));
        let body = if self.context.ui.display_raw_markdown {
            render_raw_lines(&self.display_text, wrap_width)
        } else {
            render_markdown_lines(&self.display_text, Some(wrap_width))
        };

        let mut lines = Vec::with_capacity(body.len().max(1));
        let mut rows = body.into_iter();
        let first = rows.next().unwrap_or_default();
        lines.push(prefixed(prefix, first));
        lines.extend(rows.map(|row| prefixed(Span::raw("  "), row)));
        if is_user {
            lines = lines
                .into_iter()
                .map(|line| line.patch_style(user_message_style()))
                .collect();
        }
        lines
    }

    fn top_padding(&self) -> u16 {
        u16::from(!self.props.is_first)
    }

    fn bottom_padding(&self) -> u16 {
        u16::from(!self.props.is_last)
    }

    fn render_action_row(&self, row: Rect, buf: &mut Buffer) -> Vec<(ActionButton, Rect)> {
        let buttons = action_bar_layout(row, &self.available_buttons());
        let feedback = self.feedback.state();
        for (button, rect) in &buttons {
            let style = match button {
                ActionButton::Helpful => rating_style(feedback, true),
                ActionButton::Unhelpful => rating_style(feedback, false),
                _ => action_label_style(),
            };
            buf.set_stringn(rect.x, rect.y, button.label(), usize::from(rect.width), style);
        }
        if let Some(subtext) = self.props.subtext.as_deref() {
            let limit = buttons
                .first()
                .map_or(row.right(), |(_, rect)| rect.x.saturating_sub(BUTTON_GAP))
                .saturating_sub(row.x + PREFIX_COLS);
            buf.set_stringn(
                row.x + PREFIX_COLS,
                row.y,
                subtext,
                usize::from(limit),
                subtext_style(),
            );
        }
        buttons
    }
}

fn prefixed(prefix: Span<'static>, line: Line<'static>) -> Line<'static> {
    let mut spans = Vec::with_capacity(line.spans.len() + 1);
    spans.push(prefix);
    spans.extend(line.spans);
    Line::from(spans).style(line.style)
}

impl Renderable for StepContainerView {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let mut layout = StepLayout {
            area,
            buttons: Vec::new(),
        };
        let mut y = area.y.saturating_add(self.top_padding());
        for line in self.body_lines(area.width) {
            if y >= area.bottom() {
                break;
            }
            buf.set_line(area.x, y, &line, area.width);
            y += 1;
        }
        // The action row is reserved even when hidden so hovering does not
        // shift the steps below.
        if y < area.bottom() && self.is_action_bar_visible() {
            let row = Rect::new(area.x, y, area.width, 1);
            layout.buttons = self.render_action_row(row, buf);
        }
        *self.layout.borrow_mut() = layout;
    }

    fn desired_height(&self, width: u16) -> u16 {
        let body = u16::try_from(self.body_lines(width).len()).unwrap_or(u16::MAX);
        body.saturating_add(1)
            .saturating_add(self.top_padding())
            .saturating_add(self.bottom_padding())
    }
}
